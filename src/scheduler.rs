//! The simulator's sole entry point: `Scheduler::invoke`.
//!
//! Single-threaded and synchronous -- an invocation runs to completion before the next
//! one begins, and wall time only ever advances via the caller-supplied `time` argument.
//! Nothing here suspends; there is no event queue to drive.
use log::{debug, info, warn};

use crate::container::{Container, ContainerId};
use crate::error::SchedulerError;
use crate::event::{EventKind, EventSink};
use crate::function::FunctionSpec;
use crate::policy::{priority, EvictionPolicy};
use crate::pool::Pool;
use crate::util::{FxHashMap, FxIndexMap};

/// Default constant term of the cold-start cost model (see [`Scheduler::cold_proc_time`]).
pub const DEFAULT_PROVIDER_OVERHEAD_BASE: f64 = 3000.0;
/// Default proportional term of the cold-start cost model.
pub const DEFAULT_PROVIDER_OVERHEAD_PCT: f64 = 0.2;

/// Which branch [`Scheduler::invoke`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// Served from an already-warm container.
    Hit,
    /// Served from a newly created container.
    Miss,
    /// Could not be served even after eviction; not an error, just an accounted outcome.
    CapacityMiss,
}

/// Orchestrator that consumes `(FunctionSpec, time)` events, classifies each as a
/// hit/miss/capacity-miss, drives eviction, and keeps the container pool and statistics
/// in sync.
///
/// Owns its [`Pool`], running set, counters and event sink outright; nothing is shared
/// between `Scheduler` instances (see the crate's concurrency model), so running many
/// experiments in parallel just means constructing one `Scheduler` per thread.
pub struct Scheduler {
    pool: Pool,
    policy: EvictionPolicy,
    sink: Box<dyn EventSink>,
    /// Containers currently executing, keyed by id, mapping to `(start_time, finish_time)`.
    running: FxIndexMap<ContainerId, (f64, f64)>,
    wall_time: f64,
    eviction_clock: f64,
    function_freq: FxHashMap<String, u64>,
    evictions: FxHashMap<String, u64>,
    capacity_misses: FxHashMap<String, u64>,
    history: Vec<(FunctionSpec, f64)>,
    provider_overhead_base: f64,
    provider_overhead_pct: f64,
}

impl Scheduler {
    /// Creates a new scheduler with an empty pool bounded by `mem_capacity`.
    pub fn new(mem_capacity: u64, policy: EvictionPolicy, sink: Box<dyn EventSink>) -> Self {
        Self {
            pool: Pool::new(mem_capacity),
            policy,
            sink,
            running: FxIndexMap::default(),
            wall_time: 0.0,
            eviction_clock: 0.0,
            function_freq: FxHashMap::default(),
            evictions: FxHashMap::default(),
            capacity_misses: FxHashMap::default(),
            history: Vec::new(),
            provider_overhead_base: DEFAULT_PROVIDER_OVERHEAD_BASE,
            provider_overhead_pct: DEFAULT_PROVIDER_OVERHEAD_PCT,
        }
    }

    /// Overrides the default cold-start cost model constants. Exposed for tests and
    /// experiments that need to match a specific provider's overhead figures.
    pub fn with_provider_overhead(mut self, base: f64, pct: f64) -> Self {
        self.provider_overhead_base = base;
        self.provider_overhead_pct = pct;
        self
    }

    /// Read-only view of the container pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Per-kind invocation counts observed so far.
    pub fn function_freq(&self) -> &FxHashMap<String, u64> {
        &self.function_freq
    }

    /// Per-kind counts of containers evicted so far.
    pub fn evictions(&self) -> &FxHashMap<String, u64> {
        &self.evictions
    }

    /// Per-kind counts of invocations that could not be served at all.
    pub fn capacity_misses(&self) -> &FxHashMap<String, u64> {
        &self.capacity_misses
    }

    /// Every `(spec, time)` pair appended on a successful invocation, in call order.
    pub fn history(&self) -> &[(FunctionSpec, f64)] {
        &self.history
    }

    /// The eviction clock, advanced only by GREEDY_DUAL evictions.
    pub fn eviction_clock(&self) -> f64 {
        self.eviction_clock
    }

    /// `provider_overhead_base + run_time * (1 + provider_overhead_pct)`.
    fn cold_proc_time(&self, spec: &FunctionSpec) -> f64 {
        self.provider_overhead_base + spec.run_time * (1.0 + self.provider_overhead_pct)
    }

    /// Removes every container whose finish time has passed from the running set. The
    /// containers themselves stay in the pool, just idle again -- still occupying memory,
    /// but selectable by [`Pool::find_idle`] and eviction candidates.
    ///
    /// Idempotent: calling this twice at the same `wall_time` is a no-op the second time,
    /// since nothing in `running` will have `finish_time <= wall_time` left to remove.
    fn cleanup_finished(&mut self) {
        let finished: Vec<_> = self
            .running
            .iter()
            .filter(|(_, (_, finish))| *finish <= self.wall_time)
            .map(|(id, _)| *id)
            .collect();
        for id in finished {
            self.running.shift_remove(&id);
            if let Some(container) = self.pool.get_mut(id) {
                container.prewarm();
                debug!("container {:?} finished, returned to idle pool", id);
            }
        }
    }

    /// Recomputes and assigns the priority of every container sharing `kind`, using each
    /// container's own last-refreshed `clock` and the freshly updated frequency. Siblings
    /// of the invoked instance inherit the new demand weight even though only one of them
    /// actually ran.
    fn refresh_priorities(&mut self, kind: &str) {
        let freq = *self.function_freq.get(kind).unwrap_or(&0);
        for id in self.pool.container_clones(kind).collect::<Vec<_>>() {
            let container = self.pool.get_mut(id).unwrap();
            container.priority = priority(container.clock, freq, &container.metadata);
        }
    }

    /// Attempts to free `to_free` memory units by evicting idle containers, applying the
    /// configured [`EvictionPolicy`]. May free nothing if every candidate is running.
    fn evict(&mut self, to_free: u64, spec_kind: &str) {
        let candidates = self.pool.idle_containers(&self.running);
        if candidates.is_empty() {
            return;
        }
        let pick = self.policy.pick(to_free, &candidates, &self.pool, &self.function_freq);
        for id in &pick.victims {
            let container = self.pool.remove(*id, self.running.contains_key(id));
            *self.evictions.entry(container.metadata.kind.clone()).or_insert(0) += 1;
            debug!(
                "evicted container {:?} (kind {}) to admit {}",
                id, container.metadata.kind, spec_kind
            );
        }
        if let Some(new_clock) = pick.new_eviction_clock {
            debug_assert!(
                new_clock >= self.eviction_clock,
                "eviction_clock must not move backwards"
            );
            self.eviction_clock = new_clock;
        }
    }

    /// Classifies one invocation as a hit, a miss, or a capacity miss; updates pool state,
    /// counters and the event sink accordingly.
    ///
    /// # Panics
    ///
    /// Panics if `time < wall_time` (the precondition every caller must uphold: traces are
    /// chronologically ordered) or if a structural pool invariant is violated afterwards.
    pub fn invoke(&mut self, spec: FunctionSpec, time: f64) -> Result<InvokeOutcome, SchedulerError> {
        assert!(
            time >= self.wall_time,
            "invoke called with time {} before wall_time {}",
            time,
            self.wall_time
        );
        self.wall_time = time;
        self.cleanup_finished();

        *self.function_freq.entry(spec.kind.clone()).or_insert(0) += 1;

        let outcome = if let Some(id) = self.pool.find_idle(&spec, &self.running) {
            let freq = *self.function_freq.get(&spec.kind).unwrap_or(&0);
            let container = self.pool.get_mut(id).unwrap();
            container.clock = self.eviction_clock;
            container.priority = priority(container.clock, freq, &spec);
            container.run();
            self.running.insert(id, (time, time + spec.warm_time));
            self.sink.record(&spec.kind, time, EventKind::Hit)?;
            info!("{} hit at {}", spec.kind, time);
            InvokeOutcome::Hit
        } else {
            match self.cache_miss(&spec, time)? {
                Some(id) => {
                    self.pool.get_mut(id).unwrap().run();
                    self.sink.record(&spec.kind, time, EventKind::Miss)?;
                    info!("{} miss at {}", spec.kind, time);
                    InvokeOutcome::Miss
                }
                None => {
                    *self.capacity_misses.entry(spec.kind.clone()).or_insert(0) += 1;
                    warn!("{} capacity miss at {}", spec.kind, time);
                    InvokeOutcome::CapacityMiss
                }
            }
        };

        if !matches!(outcome, InvokeOutcome::CapacityMiss) {
            self.refresh_priorities(&spec.kind);
            self.history.push((spec, time));
        }
        self.pool.assert_memory();
        Ok(outcome)
    }

    /// Attempts to admit a freshly created container for `spec`, evicting first if
    /// necessary. Returns the new container's id on success, or `None` on a capacity
    /// miss. Schedules the container's finish time and inserts it into `running` on
    /// success; the caller is responsible for marking it `Running`.
    fn cache_miss(&mut self, spec: &FunctionSpec, time: f64) -> Result<Option<ContainerId>, SchedulerError> {
        if !self.pool.check_free(spec) {
            self.evict(spec.mem_size, &spec.kind);
        }
        let id = self.pool.next_id();
        let freq = *self.function_freq.get(&spec.kind).unwrap_or(&0);
        let clock = self.eviction_clock;
        let new_priority = priority(clock, freq, spec);
        let container = Container::new(id, spec.clone());
        if !self.pool.add(container, clock, new_priority) {
            return Ok(None);
        }
        let finish = time + self.cold_proc_time(spec);
        self.running.insert(id, (time, finish));
        Ok(Some(id))
    }
}
