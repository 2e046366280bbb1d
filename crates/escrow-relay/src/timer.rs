//! Owned background tasks
//!
//! A [`TaskHandle`] owns a tokio task and aborts it when dropped, so a view
//! never leaks a timer past its own lifetime.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Background task aborted on drop
#[derive(Debug)]
pub struct TaskHandle {
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Run `fut` on a new task
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(fut)),
        }
    }

    /// Run `fut` once `delay` has elapsed
    pub fn after<F>(delay: Duration, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            sleep(delay).await;
            fut.await;
        })
    }

    /// Run `f` every `period`, the first run one period from now
    ///
    /// A run that takes longer than the period delays the next one rather
    /// than bursting to catch up.
    pub fn every<F, Fut>(period: Duration, mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                f().await;
            }
        })
    }

    /// Whether the task ran to completion or was aborted
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Abort the task
    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Holds at most one [`TaskHandle`]
#[derive(Debug, Default)]
pub struct TaskSlot {
    current: Mutex<Option<TaskHandle>>,
}

impl TaskSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the held task, if any, and hold `handle` instead
    pub fn replace(&self, handle: TaskHandle) {
        let mut current = self.lock();
        if let Some(mut previous) = current.take() {
            previous.abort();
        }
        *current = Some(handle);
    }

    /// Abort the held task, if any
    pub fn clear(&self) {
        if let Some(mut previous) = self.lock().take() {
            previous.abort();
        }
    }

    /// Whether a task is held and still running
    pub fn is_active(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<TaskHandle>> {
        // A poisoned slot only ever holds a handle, which stays valid
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
