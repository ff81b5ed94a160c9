use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{
    confirm::ConfirmationGate,
    mailer::Mailer,
    request::{RequestError, TakedownRequest},
    settings::Addressing,
    template::{preview, render},
};

/// Stage at which a file failed to become a sent notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    Parse,
    Validation,
    /// The user said no at the confirmation prompt. Deliberate, not an
    /// error, but still "not sent".
    Declined,
    Send,
}

impl FailureKind {
    /// All kinds, in pipeline order, for the summary breakdown.
    pub const ALL: [FailureKind; 5] = [
        FailureKind::Io,
        FailureKind::Parse,
        FailureKind::Validation,
        FailureKind::Declined,
        FailureKind::Send,
    ];
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Io => "I/O error",
            FailureKind::Parse => "parse error",
            FailureKind::Validation => "validation error",
            FailureKind::Declined => "declined",
            FailureKind::Send => "send error",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Failed { kind: FailureKind, reason: String },
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl Display for FileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            Outcome::Sent => write!(f, "[SENT] {}", self.path.display()),
            Outcome::Failed {
                kind: FailureKind::Declined,
                ..
            } => write!(f, "[DECLINED] {}", self.path.display()),
            Outcome::Failed { reason, .. } => {
                write!(f, "[FAILED] {} - {}", self.path.display(), reason)
            }
        }
    }
}

/// Per-file outcomes in input order plus the derived counts. Owned by the
/// batch runner and only appended to between files.
#[derive(Debug, Default)]
pub struct BatchSummary {
    reports: Vec<FileReport>,
}

impl BatchSummary {
    fn record(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn sent(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == Outcome::Sent)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.sent()
    }

    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(&r.outcome, Outcome::Failed { kind: k, .. } if *k == kind))
            .count()
    }

    /// Zero only when every file in the batch was sent. A decline keeps the
    /// exit code non-zero: nothing went wrong, but the batch did not fully
    /// go out.
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "DMCA REQUEST PROCESSING SUMMARY")?;
        writeln!(f, "{rule}")?;
        for report in &self.reports {
            writeln!(f, "{report}")?;
        }
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, "Total requests:      {}", self.total())?;
        writeln!(f, "Sent:                {}", self.sent())?;
        writeln!(f, "Not sent:            {}", self.failed())?;
        for kind in FailureKind::ALL {
            writeln!(f, "  {:<18} {}", format!("{kind}:"), self.count_of(kind))?;
        }
        write!(f, "{rule}")
    }
}

/// Runs the whole pipeline for one file: load and validate, render, preview,
/// confirm, send. Every failure is absorbed into the returned outcome so the
/// caller can move on to the next file.
pub fn process_file(
    path: &Path,
    gate: &mut dyn ConfirmationGate,
    mailer: &dyn Mailer,
    addressing: &Addressing,
) -> Outcome {
    info!("Processing request file: {path:?}");

    let request = match TakedownRequest::load(path) {
        Ok(request) => request,
        Err(e) => {
            let kind = match &e {
                RequestError::Io { .. } => FailureKind::Io,
                RequestError::Parse { .. } => FailureKind::Parse,
                RequestError::Validation { .. } => FailureKind::Validation,
            };
            return Outcome::Failed {
                kind,
                reason: e.to_string(),
            };
        }
    };

    let content = render(&request);
    let preview_text = preview(&content, addressing);

    match gate.confirm(&preview_text) {
        Ok(true) => (),
        Ok(false) => {
            return Outcome::Failed {
                kind: FailureKind::Declined,
                reason: "cancelled by user".to_string(),
            }
        }
        Err(e) => {
            return Outcome::Failed {
                kind: FailureKind::Io,
                reason: format!("{e:#}"),
            }
        }
    }

    match mailer.send(&content) {
        Ok(()) => Outcome::Sent,
        Err(e) => Outcome::Failed {
            kind: FailureKind::Send,
            reason: e.to_string(),
        },
    }
}

/// Processes the files strictly in the order given. One file per iteration,
/// no overlap: each notice waits for its own confirmation.
pub fn run_batch(
    paths: &[PathBuf],
    gate: &mut dyn ConfirmationGate,
    mailer: &dyn Mailer,
    addressing: &Addressing,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for path in paths {
        let outcome = process_file(path, gate, mailer, addressing);
        match &outcome {
            Outcome::Sent => info!("Sent takedown notice for {path:?}"),
            Outcome::Failed {
                kind: FailureKind::Declined,
                ..
            } => warn!("Sending cancelled by user for {path:?}"),
            Outcome::Failed { kind, reason } => error!("{kind} for {path:?}: {reason}"),
        }
        let report = FileReport {
            path: path.clone(),
            outcome,
        };
        println!("{report}");
        summary.record(report);
    }
    summary
}
