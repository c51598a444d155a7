//! Trace loading: turns a CSV file into the ordered `(FunctionSpec, time)` sequence the
//! scheduler consumes. Trace *generation* and *characterization* are out of scope; this
//! is the thin ambient collaborator needed to make the crate runnable end to end.
use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::SchedulerError;
use crate::function::FunctionSpec;

/// One row of a trace CSV file: `kind,mem_size,run_time,warm_time,time`.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceRow {
    kind: String,
    mem_size: u64,
    run_time: f64,
    warm_time: f64,
    time: f64,
}

impl From<TraceRow> for (FunctionSpec, f64) {
    fn from(row: TraceRow) -> Self {
        (FunctionSpec::new(row.kind, row.mem_size, row.run_time, row.warm_time), row.time)
    }
}

/// An ordered sequence of `(FunctionSpec, time)` pairs, as consumed by
/// [`crate::scheduler::Scheduler::invoke`]. The loader does not sort or validate
/// ordering: the caller is responsible for supplying a chronologically ordered trace.
pub trait Trace {
    /// Iterates over the trace's invocations in file order.
    fn iter(&self) -> Box<dyn Iterator<Item = (FunctionSpec, f64)> + '_>;
}

/// A trace fully loaded into memory from a CSV file.
#[derive(Default, Clone)]
pub struct CsvTrace {
    rows: Vec<(FunctionSpec, f64)>,
}

impl CsvTrace {
    /// Reads every row of `path` into memory.
    pub fn load(path: &Path) -> Result<Self, SchedulerError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: TraceRow = result?;
            rows.push(row.into());
        }
        Ok(Self { rows })
    }

    /// Number of invocations in the trace.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True iff the trace has no invocations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Trace for CsvTrace {
    fn iter(&self) -> Box<dyn Iterator<Item = (FunctionSpec, f64)> + '_> {
        Box::new(self.rows.iter().map(|(spec, time)| (spec.clone(), *time)))
    }
}
