//! Turns the external construction parameters of the simulator (policy name, memory
//! capacity, label triple) into a running [`Scheduler`], including the policy-name
//! resolver and the log filename builder.
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::event::{CsvEventSink, InMemoryEventSink};
use crate::policy::EvictionPolicy;
use crate::scheduler::Scheduler;

/// Resolves a policy name into an [`EvictionPolicy`]. `"RAND"`, `"LEAST_USED"`,
/// `"MAX_MEM"` and `"CLOUD21"` (which selects GREEDY_DUAL) are the only recognized
/// values; anything else is a construction-time error.
///
/// `seed` is only consulted for `"RAND"`; it is the caller's responsibility to inject a
/// fixed seed for deterministic tests rather than relying on a process-global RNG.
pub fn resolve_policy(name: &str, seed: u64) -> Result<EvictionPolicy, SchedulerError> {
    match name {
        "RAND" => Ok(EvictionPolicy::rand_seeded(seed)),
        "LEAST_USED" => Ok(EvictionPolicy::LeastUsed),
        "MAX_MEM" => Ok(EvictionPolicy::MaxMem),
        "CLOUD21" => Ok(EvictionPolicy::GreedyDual),
        other => Err(SchedulerError::UnknownPolicy(other.to_string())),
    }
}

/// Label triple identifying one simulation run, used only to build the performance-log
/// filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLabel {
    /// Number of distinct functions in the trace being replayed.
    pub num_funcs: u64,
    /// Identifier distinguishing repeated runs of the same `(policy, mem_capacity)` pair.
    pub run_id: String,
}

impl RunLabel {
    /// Creates a new label.
    pub fn new(num_funcs: u64, run_id: impl Into<String>) -> Self {
        Self {
            num_funcs,
            run_id: run_id.into(),
        }
    }
}

/// Construction parameters for a [`Scheduler`], mirroring the external interface the
/// simulator exposes to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// One of `"RAND"`, `"LEAST_USED"`, `"MAX_MEM"`, `"CLOUD21"`.
    pub policy: String,
    /// Memory budget of the container pool, in memory units.
    pub mem_capacity: u64,
    /// Seed for the RAND policy's PRNG; ignored by the other three policies.
    pub seed: u64,
    /// Identifies this run for the purposes of the log filename.
    pub label: RunLabel,
}

impl SchedulerConfig {
    /// Creates a new config with the default seed (0).
    pub fn new(policy: impl Into<String>, mem_capacity: u64, label: RunLabel) -> Self {
        Self {
            policy: policy.into(),
            mem_capacity,
            seed: 0,
            label,
        }
    }

    /// Overrides the RAND policy's seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the performance-log filename:
    /// `{policy}-{num_funcs}-{mem_capacity}-{run_id}-performancelog.csv`.
    pub fn log_filename(&self) -> String {
        format!(
            "{}-{}-{}-{}-performancelog.csv",
            self.policy, self.label.num_funcs, self.mem_capacity, self.label.run_id
        )
    }

    /// Builds the full log path under `dir`.
    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.log_filename())
    }

    /// Resolves [`Self::policy`] into an [`EvictionPolicy`].
    pub fn resolve_policy(&self) -> Result<EvictionPolicy, SchedulerError> {
        resolve_policy(&self.policy, self.seed)
    }

    /// Builds a [`Scheduler`] that logs to a CSV file at `{dir}/{log_filename()}`.
    pub fn build_csv(&self, dir: &Path) -> Result<Scheduler, SchedulerError> {
        let policy = self.resolve_policy()?;
        let path = self.log_path(dir);
        let sink = CsvEventSink::<File>::create(&path)?;
        Ok(Scheduler::new(self.mem_capacity, policy, Box::new(sink)))
    }

    /// Builds a [`Scheduler`] with an in-memory sink, for tests that do not want to touch
    /// the filesystem.
    pub fn build_in_memory(&self) -> Result<Scheduler, SchedulerError> {
        let policy = self.resolve_policy()?;
        Ok(Scheduler::new(self.mem_capacity, policy, Box::<InMemoryEventSink>::default()))
    }

    /// Loads a config from a YAML experiment file, the same ambient shape used
    /// throughout this crate's sibling example configs.
    pub fn from_yaml(path: &Path) -> Result<Self, SchedulerError> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}
