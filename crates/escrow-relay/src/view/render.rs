//! Rendering of the payment view

use super::state::ViewState;

/// Visible panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Nothing loaded
    Idle,
    /// Loading spinner
    Loading,
    /// Wallet address and payment form
    Wallet,
    /// Payment relayed
    Success,
    /// Error message
    Error,
}

/// Submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    /// Button accepts clicks
    pub enabled: bool,
    /// Button text
    pub label: String,
}

/// Everything a front-end draws for one [`ViewState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The one visible panel
    pub panel: Panel,
    /// Submit button
    pub button: ButtonState,
    /// Panel text: wallet address, success text or error message
    pub message: String,
}

/// Texts of the payment view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLabels {
    /// Idle submit button
    pub submit: String,
    /// Button while the job is created
    pub creating_job: String,
    /// Button while the job is polled
    pub waiting: String,
    /// Prefix of error messages
    pub error_prefix: String,
    /// Text of the success panel
    pub success: String,
}

impl Default for ViewLabels {
    fn default() -> Self {
        Self {
            submit: "Submit".to_string(),
            creating_job: "Creating job...".to_string(),
            waiting: "Waiting for confirmation...".to_string(),
            error_prefix: "Error: ".to_string(),
            success: "Payment confirmed".to_string(),
        }
    }
}

/// Draws rendered view states
///
/// Called exactly once per state transition.
pub trait Renderer: Send + Sync {
    /// Draw `rendered`, produced from `state`
    fn render(&self, state: &ViewState, rendered: &Rendered);
}

/// Renderer that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&self, state: &ViewState, rendered: &Rendered) {
        tracing::debug!(
            "View {} [{}] {}",
            state.name(),
            rendered.button.label,
            rendered.message
        );
    }
}

/// Describe what to draw for `state`
pub fn render(state: &ViewState, labels: &ViewLabels) -> Rendered {
    let button = |enabled: bool, label: &str| ButtonState {
        enabled,
        label: label.to_string(),
    };

    match state {
        ViewState::Idle => Rendered {
            panel: Panel::Idle,
            button: button(false, &labels.submit),
            message: String::new(),
        },
        ViewState::Loading => Rendered {
            panel: Panel::Loading,
            button: button(false, &labels.submit),
            message: String::new(),
        },
        ViewState::WalletReady { address } => Rendered {
            panel: Panel::Wallet,
            button: button(true, &labels.submit),
            message: address.clone(),
        },
        ViewState::Submitting { address, .. } => Rendered {
            panel: Panel::Wallet,
            button: button(false, &labels.creating_job),
            message: address.clone(),
        },
        ViewState::Polling { address, .. } => Rendered {
            panel: Panel::Wallet,
            button: button(false, &labels.waiting),
            message: address.clone(),
        },
        ViewState::Success { .. } => Rendered {
            panel: Panel::Success,
            button: button(true, &labels.submit),
            message: labels.success.clone(),
        },
        ViewState::Error {
            message, address, ..
        } => Rendered {
            panel: Panel::Error,
            button: button(address.is_some(), &labels.submit),
            message: format!("{}{}", labels.error_prefix, message),
        },
    }
}
