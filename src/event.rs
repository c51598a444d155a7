//! Event sink: the passive, append-only collaborator that receives hit/miss records.
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::SchedulerError;

/// Which branch an invocation took. Capacity misses are never recorded here -- the spec
/// only has the sink observe `hit`/`miss`, capacity misses produce no row at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Served from a warm container.
    Hit,
    /// Served from a newly created container.
    Miss,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Hit => "hit",
            EventKind::Miss => "miss",
        })
    }
}

/// One row of the performance log: `lambda,time,meta`.
#[derive(Debug, Clone, Serialize)]
pub struct PerfLogRow {
    /// The invoked function's kind.
    pub lambda: String,
    /// Invocation time.
    pub time: f64,
    /// `"hit"` or `"miss"`.
    pub meta: String,
}

/// Passive, write-only channel for hit/miss records. The core never reads back through
/// this trait; replay (e.g. [`crate::stats::miss_stats`]) is an external, CSV-level
/// concern.
pub trait EventSink {
    /// Appends one record. Errors are surfaced to the caller of
    /// [`crate::scheduler::Scheduler::invoke`] as `LogIoError`/`LogCsvError`; the core
    /// does not retry.
    fn record(&mut self, kind: &str, time: f64, outcome: EventKind) -> Result<(), SchedulerError>;
}

/// Writes the performance log described in the spec to a CSV file, one row per call,
/// flushing after every write so a crash mid-run leaves a valid prefix (the spec allows
/// line buffering; this is the stricter, simpler option).
pub struct CsvEventSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvEventSink<File> {
    /// Creates the log file at `path` and writes the `lambda,time,meta` header.
    pub fn create(path: &Path) -> Result<Self, SchedulerError> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> CsvEventSink<W> {
    /// Wraps an already-open writer, writing the header immediately.
    pub fn new(writer: W) -> Result<Self, SchedulerError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(["lambda", "time", "meta"])?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl<W: Write> EventSink for CsvEventSink<W> {
    fn record(&mut self, kind: &str, time: f64, outcome: EventKind) -> Result<(), SchedulerError> {
        self.writer.serialize(PerfLogRow {
            lambda: kind.to_string(),
            time,
            meta: outcome.to_string(),
        })?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory; used by tests that want to assert on emitted events
/// without touching the filesystem.
#[derive(Default)]
pub struct InMemoryEventSink {
    /// Rows recorded so far, in call order.
    pub rows: Vec<PerfLogRow>,
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, kind: &str, time: f64, outcome: EventKind) -> Result<(), SchedulerError> {
        self.rows.push(PerfLogRow {
            lambda: kind.to_string(),
            time,
            meta: outcome.to_string(),
        });
        Ok(())
    }
}
