use escrow_relay::view::{Panel, Rendered, Renderer, ViewState};

/// Prints payment view changes to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    fn line(state: &ViewState, rendered: &Rendered) -> Option<String> {
        let line = match state {
            ViewState::Idle => return None,
            ViewState::Loading => "Loading relay wallet...".to_string(),
            ViewState::WalletReady { .. } => format!("Relay wallet: {}", rendered.message),
            ViewState::Submitting { intent, .. } => format!(
                "{} ({} to {})",
                rendered.button.label,
                intent.amount(),
                intent.destination()
            ),
            ViewState::Polling {
                job_id, attempt, ..
            } => format!(
                "{} job {} ({} pending)",
                rendered.button.label, job_id, attempt
            ),
            ViewState::Success { job_id, .. } => format!("{} (job {})", rendered.message, job_id),
            ViewState::Error { .. } => rendered.message.clone(),
        };

        Some(line)
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, state: &ViewState, rendered: &Rendered) {
        if let Some(line) = Self::line(state, rendered) {
            if rendered.panel == Panel::Error {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
    }
}
