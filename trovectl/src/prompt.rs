use dialoguer::console::Term;
use tracing::warn;
use trove_contracts::confirm::{Confirm, ConfirmRequest};

/// Terminal confirmation on stderr. `--yes` answers every request.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        if self.assume_yes {
            return true;
        }
        match dialoguer::Confirm::new()
            .with_prompt(request.prompt())
            .default(false)
            .interact_on(&Term::stderr())
        {
            Ok(answer) => answer,
            Err(err) => {
                // No terminal to ask on counts as a "no".
                warn!("confirmation prompt failed: {err}");
                false
            }
        }
    }
}
