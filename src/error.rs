//! Crate-level error type.
//!
//! Only the two genuinely external, recoverable failure modes live here:
//! construction-time policy name resolution and event-sink I/O. Structural invariant
//! faults ([`crate::pool::Pool::assert_memory`], [`crate::pool::Pool::remove`]) remain
//! panics -- they indicate a bug in this crate, not a caller mistake, so there is nothing
//! a caller could usefully recover from.
use thiserror::Error;

/// Failure modes a caller of [`crate::scheduler::Scheduler`] or
/// [`crate::config::SchedulerConfig`] can actually recover from.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Construction-time: the requested policy name isn't one of
    /// `RAND`/`LEAST_USED`/`MAX_MEM`/`CLOUD21`.
    #[error("unknown eviction policy: {0}")]
    UnknownPolicy(String),
    /// A read from a trace file or a write to the event sink failed.
    #[error("I/O error: {0}")]
    LogIoError(#[from] std::io::Error),
    /// A CSV parse or write error, from either the trace loader or the event sink.
    #[error("CSV error: {0}")]
    LogCsvError(#[from] csv::Error),
    /// A YAML parse error while loading a [`crate::config::SchedulerConfig`].
    #[error("YAML error: {0}")]
    ConfigYamlError(#[from] serde_yaml::Error),
}
