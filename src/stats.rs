//! Post-run, side-effect-free accessors over a performance log.
//!
//! The core never reads back through the [`crate::event::EventSink`] channel itself;
//! replaying it into aggregate counts is an external concern that happens after a run
//! completes, given only the log's file path.
use std::path::Path;

use csv::ReaderBuilder;
use log::warn;
use serde::Deserialize;

use crate::error::SchedulerError;
use crate::util::FxHashMap;

/// Hit/miss counts for one function kind, as recovered by replaying a performance log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitMissCounts {
    /// Number of `hit` rows for this kind.
    pub hits: u64,
    /// Number of `miss` rows for this kind.
    pub misses: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct LogRow {
    lambda: String,
    #[allow(dead_code)]
    time: f64,
    meta: String,
}

/// Replays the performance log at `path` (the `lambda,time,meta` CSV format described in
/// the external interface section) into a `kind -> {hits, misses}` map.
///
/// Capacity misses never appear in the log, so they are not and cannot be reflected here;
/// callers that need them should consult [`crate::scheduler::Scheduler::capacity_misses`]
/// directly instead.
pub fn miss_stats(path: &Path) -> Result<FxHashMap<String, HitMissCounts>, SchedulerError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out: FxHashMap<String, HitMissCounts> = FxHashMap::default();
    for result in reader.deserialize() {
        let row: LogRow = result?;
        let entry = out.entry(row.lambda.clone()).or_default();
        match row.meta.as_str() {
            "hit" => entry.hits += 1,
            "miss" => entry.misses += 1,
            other => warn!("miss_stats: unrecognized meta {:?} for {}, ignoring row", other, row.lambda),
        }
    }
    Ok(out)
}
