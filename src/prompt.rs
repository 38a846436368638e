use calsheet_core::store::UserPrompt;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;

/// Alerts and confirmations on the terminal, drawn around the pass spinner.
pub struct TerminalPrompt {
    assume_yes: bool,
    spinner: ProgressBar,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool, spinner: ProgressBar) -> Self {
        TerminalPrompt {
            assume_yes,
            spinner,
        }
    }
}

impl UserPrompt for TerminalPrompt {
    fn alert(&self, message: &str) {
        self.spinner
            .suspend(|| eprintln!("{} {}", "!".yellow().bold(), message.yellow()));
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.spinner.suspend(|| {
            Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
    }
}
