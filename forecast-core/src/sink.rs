//! Optional destinations for flattened records, e.g. a JSON dump for debugging.

use anyhow::{Context, Result};
use std::{
    fmt::Debug,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::model::HourlyRecord;

/// Receives the records of every successful forecast call.
///
/// Failures are logged by the client and never fail the forecast call itself.
pub trait RecordSink: Send + Sync + Debug {
    fn write(&self, records: &[HourlyRecord]) -> Result<()>;
}

/// Overwrites a file with the records as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn write(&self, records: &[HourlyRecord]) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create dump file: {}", self.path.display()))?;

        serde_json::to_writer_pretty(BufWriter::new(file), records)
            .with_context(|| format!("Failed to write dump file: {}", self.path.display()))?;

        Ok(())
    }
}
