//! Escrow contract store
//!
//! Remembers the last deployed escrow contract across runs. The store file is a
//! JSON object; the contract address lives under [`ESCROW_CONTRACT_KEY`]. Every
//! [`EscrowStore::save`] is broadcast so open views can pick up the new
//! contract without polling the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::Error;

/// Key of the escrow contract address in the store file
pub const ESCROW_CONTRACT_KEY: &str = "escrow contract";

/// Default store file name inside the work directory
pub const DEFAULT_STORE_FILE: &str = "escrow-store.json";

const EVENT_CAPACITY: usize = 16;

/// Escrow contract address changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowUpdated {
    /// New escrow contract address
    pub address: String,
}

/// File backed key value store holding the escrow contract
#[derive(Debug, Clone)]
pub struct EscrowStore {
    path: PathBuf,
    events: broadcast::Sender<EscrowUpdated>,
}

impl EscrowStore {
    /// Open the store at `path`; the file is created on the first save
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            path: path.as_ref().to_path_buf(),
            events,
        }
    }

    /// Open the default store file inside `work_dir`
    pub fn in_work_dir<P: AsRef<Path>>(work_dir: P) -> Self {
        Self::open(work_dir.as_ref().join(DEFAULT_STORE_FILE))
    }

    /// Store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored escrow contract address
    ///
    /// A missing or unreadable store, or a non-string entry, reads as no contract.
    pub fn get(&self) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => match entries.remove(ESCROW_CONTRACT_KEY) {
                Some(Value::String(address)) if !address.is_empty() => Some(address),
                _ => None,
            },
            Err(err) => {
                tracing::warn!("Could not read escrow store {}: {}", self.path.display(), err);
                None
            }
        }
    }

    /// Persist the escrow contract address and notify subscribers
    ///
    /// Subscribers are notified even when writing the file fails.
    pub fn save(&self, address: &str) {
        if let Err(err) = self.write_entry(ESCROW_CONTRACT_KEY, address) {
            tracing::error!("Could not write escrow store {}: {}", self.path.display(), err);
        }

        tracing::debug!("Escrow contract updated: {}", address);

        // No receiver is not an error
        let _ = self.events.send(EscrowUpdated {
            address: address.to_string(),
        });
    }

    /// Subscribe to escrow contract updates
    pub fn subscribe(&self) -> broadcast::Receiver<EscrowUpdated> {
        self.events.subscribe()
    }

    fn read_entries(&self) -> Result<Map<String, Value>, Error> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|err| Error::Store(err.to_string()))?;

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents).map_err(|err| Error::Store(err.to_string()))
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<(), Error> {
        // An unreadable file is overwritten rather than blocking every save
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::Store(err.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(&entries).map_err(|err| Error::Store(err.to_string()))?;
        fs::write(&self.path, json).map_err(|err| Error::Store(err.to_string()))?;

        Ok(())
    }
}
