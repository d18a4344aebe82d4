//! Per-tick reporting. The simulation hands a [`TickCounts`] row to a [`MetricsSink`] at the end
//! of every tick. This is not to be confused with _logging_ (see [`crate::log`]), which records
//! messages about the program's behavior rather than model output.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::{error, trace};
use serde::{Deserialize, Serialize};

use crate::error::GridSpreadError;

/// Counters as they stand at the end of a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCounts {
    pub tick: usize,
    pub interaction_infections: usize,
    pub location_infections: usize,
    pub infected: usize,
    pub susceptible: usize,
}

pub trait MetricsSink {
    fn record(&mut self, counts: &TickCounts);
}

/// Discards everything it is sent.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record(&mut self, _counts: &TickCounts) {}
}

/// Keeps every row in memory, e.g. for plotting after a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickHistory {
    rows: Vec<TickCounts>,
}

impl TickHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rows(&self) -> &[TickCounts] {
        &self.rows
    }

    #[must_use]
    pub fn last(&self) -> Option<&TickCounts> {
        self.rows.last()
    }
}

impl MetricsSink for TickHistory {
    fn record(&mut self, counts: &TickCounts) {
        self.rows.push(*counts);
    }
}

// Checks that the path is valid. Creates all parent directories if they do not exist, then
// creates the file. Refuses to clobber an existing file unless `overwrite` is set.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, GridSpreadError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            if path.exists() && !overwrite {
                return Err(GridSpreadError::ReportError(format!(
                    "{} already exists; pass overwrite to replace it",
                    path.display()
                )));
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(GridSpreadError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes one CSV row per tick. Write failures do not interrupt the simulation; the first one is
/// kept and returned by [`CsvReport::finish`].
pub struct CsvReport {
    writer: Writer<File>,
    error: Option<GridSpreadError>,
}

impl CsvReport {
    /// Creates the report file at `path`, which must have a `.csv` extension.
    ///
    /// # Errors
    /// Returns a `GridSpreadError` if the path is not a CSV, already exists and `overwrite` is
    /// false, or cannot be created.
    pub fn create(path: &Path, overwrite: bool) -> Result<CsvReport, GridSpreadError> {
        trace!("creating report {}", path.display());
        let file = generate_validate_filepath(path, overwrite)?;
        Ok(CsvReport {
            writer: Writer::from_writer(file),
            error: None,
        })
    }

    /// Flushes the file and returns the first error seen while writing, if any.
    ///
    /// # Errors
    /// Returns the first serialization or I/O error encountered.
    pub fn finish(mut self) -> Result<(), GridSpreadError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl MetricsSink for CsvReport {
    fn record(&mut self, counts: &TickCounts) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.writer.serialize(counts) {
            error!("failed to write report row for tick {}: {e}", counts.tick);
            self.error = Some(e.into());
        }
    }
}
