use std::ffi::OsString;
use std::io;
use std::process::Stdio;

use log::{debug, warn};
use serde_json::Value;
use tokio::process::Command;

use crate::range::Week;

/// Substring the `myges` probe prints once a week has been fetched.
pub const CONFIRMATION_MARKER: &str = "Loading agenda";

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("agenda for {0} was not confirmed by the source")]
    NotConfirmed(Week),
    #[error("raw agenda output for {0} has no payload line")]
    MissingPayload(Week),
    #[error("invalid JSON payload for {week}: {source}")]
    Decode {
        week: Week,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything able to hand out the raw agenda of one week.
///
/// Every `Err` is read by the caller as "no data for this week".
#[allow(async_fn_in_trait)]
pub trait AgendaSource {
    async fn fetch_week(&self, week: Week) -> Result<Value, SourceError>;
}

/// Runs the `myges` command-line client.
///
/// Each week costs two invocations: `agenda DD-MM-YYYY` to check that the
/// week loads, then `agenda DD-MM-YYYY --raw` whose second output line is
/// the JSON payload.
#[derive(Debug, Clone)]
pub struct MygesCli {
    program: OsString,
}

impl MygesCli {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn agenda(&self, week: Week, raw: bool) -> Result<String, SourceError> {
        let mut command = Command::new(&self.program);
        command.arg("agenda").arg(week.to_string());
        if raw {
            command.arg("--raw");
        }

        debug!("Running {command:?}");

        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("myges stderr for {week}: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for MygesCli {
    fn default() -> Self {
        Self::new("myges")
    }
}

impl AgendaSource for MygesCli {
    async fn fetch_week(&self, week: Week) -> Result<Value, SourceError> {
        let probe = self.agenda(week, false).await?;
        debug!(
            "myges output for {week}: {}...",
            probe.chars().take(PREVIEW_CHARS).collect::<String>()
        );

        if !is_confirmed(&probe) {
            return Err(SourceError::NotConfirmed(week));
        }

        let raw = self.agenda(week, true).await?;
        decode_payload(week, &raw)
    }
}

pub fn is_confirmed(output: &str) -> bool {
    output.contains(CONFIRMATION_MARKER)
}

/// Decodes the second line of a `--raw` run.
pub fn decode_payload(week: Week, output: &str) -> Result<Value, SourceError> {
    let line = output
        .split('\n')
        .nth(1)
        .ok_or(SourceError::MissingPayload(week))?;

    serde_json::from_str(line).map_err(|source| SourceError::Decode { week, source })
}
