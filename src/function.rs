//! Function specification model.

/// Immutable description of a function kind: its memory footprint and its cold/warm
/// invocation durations.
///
/// Two specs are considered the same function iff their `kind` fields are equal --
/// `mem_size`/`run_time`/`warm_time` are not part of identity, only of cost.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    /// Opaque identifier for the function.
    pub kind: String,
    /// Memory footprint of one container running this function, in memory units (MB).
    pub mem_size: u64,
    /// Duration of a cold invocation.
    pub run_time: f64,
    /// Duration of a warm invocation. Always `<= run_time`.
    pub warm_time: f64,
}

impl FunctionSpec {
    /// Creates a new function spec.
    ///
    /// # Panics
    ///
    /// Panics if `mem_size == 0` or `warm_time > run_time`, both of which are invariants
    /// the rest of the crate relies on (the priority function divides by `mem_size`, and
    /// a function that is slower warm than cold makes no sense).
    pub fn new(kind: impl Into<String>, mem_size: u64, run_time: f64, warm_time: f64) -> Self {
        assert!(mem_size > 0, "FunctionSpec::mem_size must be positive");
        assert!(
            warm_time <= run_time,
            "FunctionSpec::warm_time must not exceed run_time"
        );
        Self {
            kind: kind.into(),
            mem_size,
            run_time,
            warm_time,
        }
    }
}

impl PartialEq for FunctionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for FunctionSpec {}
