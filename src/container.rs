//! Container model.
use crate::function::FunctionSpec;

/// Stable handle identifying a container, independent of its [`FunctionSpec`].
/// Never use `FunctionSpec` equality as a substitute for this: several containers may
/// legally share the same metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// Lifecycle state of a [`Container`]. Bookkeeping only: whether a container is actually
/// executing right now is determined by membership in the scheduler's running set, not
/// by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Just created, never run.
    Cold,
    /// Idle, already initialized at least once.
    Warm,
    /// Currently executing an invocation.
    Running,
    /// Evicted; retained only transiently before removal from the pool.
    Term,
}

/// One warm/cold/running/terminated instance of a [`FunctionSpec`].
pub struct Container {
    /// Stable id, used as the key of the pool's container table and the scheduler's
    /// running set.
    pub id: ContainerId,
    /// The function this container runs.
    pub metadata: FunctionSpec,
    /// Current lifecycle state.
    pub state: ContainerState,
    /// Snapshot of the pool's eviction clock at insertion or last priority refresh.
    pub clock: f64,
    /// Priority score used by the GREEDY_DUAL policy; lower is evicted first.
    pub priority: f64,
}

impl Container {
    /// Creates a new container in the `Cold` state.
    pub fn new(id: ContainerId, metadata: FunctionSpec) -> Self {
        Self {
            id,
            metadata,
            state: ContainerState::Cold,
            clock: 0.0,
            priority: 0.0,
        }
    }

    /// Cold -> Warm.
    pub fn prewarm(&mut self) {
        self.state = ContainerState::Warm;
    }

    /// -> Running.
    pub fn run(&mut self) {
        self.state = ContainerState::Running;
    }

    /// -> Term.
    pub fn terminate(&mut self) {
        self.state = ContainerState::Term;
    }

    /// True iff the container is not currently executing (advisory; the scheduler's
    /// running set is authoritative).
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ContainerState::Cold | ContainerState::Warm)
    }
}
