use std::{fs, path::Path};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

/// Mail account and addressing used for every notice in a run.
///
/// Loaded once at startup; a problem here aborts the run before any request
/// file is touched.
#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub smtp: Smtp,
    pub addressing: Addressing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Smtp {
    /// SMTP server hostname
    pub server: String,

    /// Common ports: 25 (SMTP), 465 (SMTPS), 587 (Submission)
    pub port: u16,

    pub username: String,
    pub password: String,

    /// Must match what the server offers on `port`
    pub security: Security,
}

/// Connection security for the SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Security {
    /// TLS from the first byte, typically port 465
    #[serde(rename = "SSL")]
    Ssl,
    /// Plaintext upgraded via STARTTLS, typically port 587
    #[serde(rename = "STARTTLS")]
    Starttls,
    /// No encryption at all, typically port 25
    #[serde(rename = "NONE")]
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Addressing {
    pub from_email: String,
    pub from_name: String,

    /// Where notices are submitted, e.g. GitHub's copyright agent address
    pub to_email: String,

    pub reply_to: Option<String>,
    pub cc_email: Option<String>,
}

impl MailSettings {
    pub fn load_from(path: &Path) -> anyhow::Result<MailSettings> {
        debug!("Loading mail settings from: {path:?}");
        let file_contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read contents of {path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {path:?}"))?;
        Ok(result)
    }
}
