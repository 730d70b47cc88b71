use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::range::Week;

/// Append-only record of every week's raw payload.
pub struct AuditLog<W: Write> {
    writer: W,
}

impl AuditLog<BufWriter<File>> {
    /// Creates the file, truncating whatever a previous run left there.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> AuditLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn record_week(&mut self, week: Week, payload: &Value) -> io::Result<()> {
        writeln!(self.writer, "=== Week starting {week} ===")?;
        serde_json::to_writer_pretty(&mut self.writer, payload)?;
        write!(self.writer, "\n\n")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
