mod batch;
mod cli;
mod confirm;
mod mailer;
mod request;
mod settings;
mod template;

pub use batch::{process_file, run_batch, BatchSummary, FailureKind, FileReport, Outcome};
pub use cli::Cli;
pub use confirm::{is_affirmative, ConfirmationGate, ConsolePrompt};
pub use mailer::{Mailer, SendError, SmtpMailer};
pub use request::{ContentSource, FieldError, RequestError, TakedownRequest, YesNo};
pub use settings::{Addressing, MailSettings, Security, Smtp};
pub use template::{preview, render, EmailContent};

/// Processes every request file from the command line in order and returns
/// the exit code for the run: 0 only if every notice was sent.
///
/// Mail settings problems abort here, before any request file is touched;
/// everything per-file is absorbed into the summary.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let settings = MailSettings::load_from(&cli.mail_config_path())?;
    let mailer = SmtpMailer::new(&settings)?;
    let mut gate = ConsolePrompt;

    let summary = run_batch(&cli.request_files, &mut gate, &mailer, &settings.addressing);
    println!("\n{summary}");
    Ok(summary.exit_code())
}
