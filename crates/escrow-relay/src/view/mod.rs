//! Payment and deployment views
//!
//! A view owns its workflows: it cancels them when a newer one starts and when
//! the view is torn down.

pub mod deploy;
pub mod payment;
pub mod render;
pub mod state;

pub use deploy::{BalanceDisplay, DeployState, DeployView, DeployViewConfig};
pub use payment::{PaymentView, PaymentViewConfig};
pub use render::{render, ButtonState, Panel, Rendered, Renderer, TracingRenderer, ViewLabels};
pub use state::{ViewEvent, ViewState};
