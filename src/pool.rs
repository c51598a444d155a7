//! Bounded-memory container pool.
use crate::container::{Container, ContainerId};
use crate::function::FunctionSpec;
use crate::util::{Counter, FxIndexMap, FxIndexSet};

/// Bounded-memory collection of containers.
///
/// `Pool` owns every [`Container`]; the scheduler holds only [`ContainerId`] handles into
/// it (e.g. as keys of its running-set map). It never mutates pool state itself except
/// through the methods below, so all of `mem_used`/`mem_capacity`/membership bookkeeping
/// lives in one place.
pub struct Pool {
    containers: FxIndexMap<ContainerId, Container>,
    /// Containers grouped by `metadata.kind`, insertion-order preserved within each
    /// group. Keeps `find_idle` and the per-invocation priority-refresh fan-out from
    /// scanning the whole pool.
    by_kind: FxIndexMap<String, FxIndexSet<ContainerId>>,
    mem_used: u64,
    mem_capacity: u64,
    id_counter: Counter,
}

impl Pool {
    /// Creates an empty pool with the given memory budget.
    pub fn new(mem_capacity: u64) -> Self {
        Self {
            containers: FxIndexMap::default(),
            by_kind: FxIndexMap::default(),
            mem_used: 0,
            mem_capacity,
            id_counter: Counter::default(),
        }
    }

    /// Total memory currently occupied by containers in the pool.
    pub fn mem_used(&self) -> u64 {
        self.mem_used
    }

    /// Fixed memory budget of the pool.
    pub fn mem_capacity(&self) -> u64 {
        self.mem_capacity
    }

    /// Number of containers currently in the pool.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// True iff the pool holds no containers.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Mints a fresh, never-before-used container id.
    pub fn next_id(&mut self) -> ContainerId {
        ContainerId(self.id_counter.increment())
    }

    /// True iff `spec` would fit in the pool without evicting anything.
    pub fn check_free(&self, spec: &FunctionSpec) -> bool {
        spec.mem_size + self.mem_used <= self.mem_capacity
    }

    /// Reference to a container by id.
    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    /// Mutable reference to a container by id.
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(&id)
    }

    /// Every container sharing `kind`, in insertion order.
    pub fn container_clones(&self, kind: &str) -> impl Iterator<Item = ContainerId> + '_ {
        self.by_kind
            .get(kind)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// First (insertion-order) container matching `spec` that is not in `running`.
    pub fn find_idle(&self, spec: &FunctionSpec, running: &FxIndexMap<ContainerId, (f64, f64)>) -> Option<ContainerId> {
        self.container_clones(&spec.kind).find(|id| !running.contains_key(id))
    }

    /// Every container currently in the pool that is not in `running`, in insertion
    /// order. This is the candidate set eviction policies are handed.
    pub fn idle_containers(&self, running: &FxIndexMap<ContainerId, (f64, f64)>) -> Vec<ContainerId> {
        self.containers
            .keys()
            .copied()
            .filter(|id| !running.contains_key(id))
            .collect()
    }

    /// Adds `container` to the pool if it fits, stamping `clock`/`priority` as given by
    /// the caller (the priority function needs scheduler-level frequency data the pool
    /// does not own, see [`crate::policy::priority`]).
    ///
    /// Returns `true` and takes effect iff [`Self::check_free`] holds for the container's
    /// metadata; otherwise returns `false` and leaves the pool untouched.
    pub fn add(&mut self, mut container: Container, clock: f64, priority: f64) -> bool {
        if !self.check_free(&container.metadata) {
            return false;
        }
        container.clock = clock;
        container.priority = priority;
        self.mem_used += container.metadata.mem_size;
        let id = container.id;
        let kind = container.metadata.kind.clone();
        self.containers.insert(id, container);
        self.by_kind.entry(kind).or_default().insert(id);
        true
    }

    /// Detaches a container from the pool and returns it.
    ///
    /// # Panics
    ///
    /// Panics (the *RemovingRunning* invariant violation) if `in_running` is true. The
    /// pool does not own the running set, so callers must pass whether `id` is currently
    /// running.
    pub fn remove(&mut self, id: ContainerId, in_running: bool) -> Container {
        assert!(
            !in_running,
            "cannot remove container {:?}: it is currently running",
            id
        );
        let container = self
            .containers
            .shift_remove(&id)
            .unwrap_or_else(|| panic!("container {:?} is not in the pool", id));
        if let Some(set) = self.by_kind.get_mut(&container.metadata.kind) {
            set.shift_remove(&id);
        }
        self.mem_used -= container.metadata.mem_size;
        container
    }

    /// Recomputes `mem_used` from scratch and panics (the *InvariantViolation*) if it
    /// disagrees with the incrementally tracked value, or if it exceeds capacity.
    ///
    /// The capacity check is always on (an O(1) comparison); the full recomputation is
    /// only performed in debug builds, per the spec's allowance that release builds may
    /// skip the expensive check but must still hold the invariant.
    pub fn assert_memory(&self) {
        assert!(
            self.mem_used <= self.mem_capacity,
            "pool memory {} exceeds capacity {}",
            self.mem_used,
            self.mem_capacity
        );
        debug_assert_eq!(
            self.mem_used,
            self.containers.values().map(|c| c.metadata.mem_size).sum::<u64>(),
            "tracked mem_used does not match recomputed sum"
        );
    }
}
