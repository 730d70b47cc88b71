use std::io::{self, Write};

use log::{error, info, warn};
use serde_json::Value;
use tokio::time::{self, Duration};

use crate::audit::AuditLog;
use crate::range::{DateRange, Week};
use crate::source::AgendaSource;
use crate::structs::Calendar;
use crate::transform::transform;

/// Courtesy delay between two weeks, so the portal is not hammered.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write run log: {0}")]
    Log(#[from] io::Error),
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub calendar: Calendar,
    pub weeks: usize,
    pub empty_weeks: usize,
    pub skipped_records: usize,
}

impl ExportReport {
    pub fn events_added(&self) -> usize {
        self.calendar.len()
    }
}

/// Walks a date range week by week, turning whatever the source returns into
/// calendar events.
pub struct Exporter<S, W: Write> {
    source: S,
    log: AuditLog<W>,
    pause: Duration,
}

impl<S: AgendaSource, W: Write> Exporter<S, W> {
    pub fn new(source: S, log: AuditLog<W>) -> Self {
        Self {
            source,
            log,
            pause: DEFAULT_PAUSE,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Fetches every week of `range` in order. Only a failure to write the
    /// run log stops the export; unavailable weeks and broken records are
    /// logged and skipped.
    pub async fn run(mut self, range: DateRange) -> Result<ExportReport, ExportError> {
        let mut report = ExportReport::default();

        for (idx, week) in range.weeks().enumerate() {
            if idx > 0 && !self.pause.is_zero() {
                time::sleep(self.pause).await;
            }

            self.process_week(week, &mut report).await?;
        }

        Ok(report)
    }

    async fn process_week(&mut self, week: Week, report: &mut ExportReport) -> Result<(), ExportError> {
        info!("Processing week of {week}");
        report.weeks += 1;

        let payload = match self.source.fetch_week(week).await {
            Ok(payload) if has_data(&payload) => payload,
            Ok(_) => {
                info!("No events found for the week of {week}");
                report.empty_weeks += 1;
                return Ok(());
            }
            Err(err) => {
                warn!("{err}");
                info!("No events found for the week of {week}");
                report.empty_weeks += 1;
                return Ok(());
            }
        };

        self.log.record_week(week, &payload)?;

        let Value::Array(records) = payload else {
            warn!("Agenda payload for {week} is not a list, ignoring it");
            return Ok(());
        };

        for record in records {
            match transform(record) {
                Ok(event) => {
                    info!("Added event `{}` for the week of {week}", event.title);
                    report.calendar.push(event);
                }
                Err(err) => {
                    error!("Skipping record for the week of {week}: {err}");
                    report.skipped_records += 1;
                }
            }
        }

        Ok(())
    }
}

fn has_data(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => true,
    }
}
