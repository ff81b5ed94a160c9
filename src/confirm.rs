use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::debug;

/// Decision point between previewing a notice and handing it to the mail
/// transport. Injected into the batch runner so tests can script answers
/// instead of reading a terminal.
pub trait ConfirmationGate {
    /// Shows the preview and blocks until a yes/no decision is made.
    fn confirm(&mut self, preview: &str) -> anyhow::Result<bool>;
}

/// Interactive gate: prints the preview, asks on stdout, reads one line from
/// stdin. Anything that is not an explicit yes declines, including an empty
/// line or EOF.
pub struct ConsolePrompt;

impl ConfirmationGate for ConsolePrompt {
    fn confirm(&mut self, preview: &str) -> anyhow::Result<bool> {
        println!("{preview}");
        print!("Send this email? (y/n): ");
        io::stdout()
            .flush()
            .context("Failed to flush confirmation prompt")?;

        let mut line = String::new();
        let bytes_read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read confirmation input")?;
        if bytes_read == 0 {
            debug!("EOF on confirmation input, declining");
        }
        Ok(is_affirmative(&line))
    }
}

/// Only an explicit yes sends. Sending a legal notice by accident is the
/// failure mode to avoid, so every other input declines.
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
