//! Eviction policies and the priority function that drives GREEDY_DUAL.
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::container::ContainerId;
use crate::function::FunctionSpec;
use crate::pool::Pool;
use crate::util::FxHashMap;

/// `priority(c) = c.clock + freq(c.kind) * (run_time - warm_time) / mem_size`.
///
/// `(run_time - warm_time)` is the cold-start cost avoided by keeping the container warm;
/// dividing by `mem_size` gives cost-per-byte; multiplying by `freq` weights by demand;
/// adding `clock` (the eviction-clock snapshot at last refresh) ages stale containers
/// towards eviction even if their kind goes quiet.
pub fn priority(clock: f64, freq: u64, spec: &FunctionSpec) -> f64 {
    clock + (freq as f64) * (spec.run_time - spec.warm_time) / (spec.mem_size as f64)
}

/// Result of one [`EvictionPolicy::pick`] call.
pub struct EvictionPick {
    /// Victims, in the order they should be evicted. A subset of the candidates passed
    /// in; may free more memory than requested (a lower bound, not an exact match).
    pub victims: Vec<ContainerId>,
    /// GREEDY_DUAL only: the new value for the scheduler's eviction clock, i.e. the
    /// priority of the last victim chosen. `None` if no victim was picked, or if the
    /// policy is not GREEDY_DUAL.
    pub new_eviction_clock: Option<f64>,
}

/// Strategy selecting which idle containers to evict to free up `to_free` memory units.
///
/// Modeled as a tagged variant rather than a trait-object hierarchy: there are exactly
/// four policies, they share one operation, and RAND is the only one that carries
/// mutable state (its PRNG stream) between calls.
pub enum EvictionPolicy {
    /// Uniform random choice without replacement from idle candidates.
    Rand(Pcg64),
    /// Evict the least-frequently-invoked kind first.
    LeastUsed,
    /// Evict the largest container first.
    MaxMem,
    /// GDSF-inspired priority eviction with a duplicate-kind preference.
    GreedyDual,
}

impl EvictionPolicy {
    /// RAND policy seeded for deterministic testing.
    pub fn rand_seeded(seed: u64) -> Self {
        EvictionPolicy::Rand(Pcg64::seed_from_u64(seed))
    }

    /// Picks victims from `candidates` (assumed to already be idle, i.e. not in the
    /// running set) sufficient to free `to_free` memory units, or as many as possible if
    /// candidates run out first. `freq` is the scheduler's per-kind invocation count,
    /// needed by LEAST_USED.
    pub fn pick(&mut self, to_free: u64, candidates: &[ContainerId], pool: &Pool, freq: &FxHashMap<String, u64>) -> EvictionPick {
        match self {
            EvictionPolicy::Rand(rng) => {
                let mut shuffled = candidates.to_vec();
                shuffled.shuffle(rng);
                EvictionPick {
                    victims: take_until_freed(to_free, shuffled, pool),
                    new_eviction_clock: None,
                }
            }
            EvictionPolicy::LeastUsed => {
                let mut sorted = candidates.to_vec();
                sorted.sort_by_key(|id| {
                    let kind = &pool.get(*id).unwrap().metadata.kind;
                    freq.get(kind).copied().unwrap_or(0)
                });
                EvictionPick {
                    victims: take_until_freed(to_free, sorted, pool),
                    new_eviction_clock: None,
                }
            }
            EvictionPolicy::MaxMem => {
                let mut sorted = candidates.to_vec();
                sorted.sort_by_key(|id| std::cmp::Reverse(pool.get(*id).unwrap().metadata.mem_size));
                EvictionPick {
                    victims: take_until_freed(to_free, sorted, pool),
                    new_eviction_clock: None,
                }
            }
            EvictionPolicy::GreedyDual => greedy_dual_pick(to_free, candidates, pool),
        }
    }
}

/// Shared termination logic for RAND/LEAST_USED/MAX_MEM: take victims off the front of an
/// already-ordered candidate list until `to_free` is met or the list is exhausted.
fn take_until_freed(mut to_free: u64, ordered: Vec<ContainerId>, pool: &Pool) -> Vec<ContainerId> {
    let mut victims = Vec::new();
    for id in ordered {
        if to_free == 0 {
            break;
        }
        let mem_size = pool.get(id).unwrap().metadata.mem_size;
        to_free = to_free.saturating_sub(mem_size);
        victims.push(id);
    }
    victims
}

/// GREEDY_DUAL: sort by ascending priority, then prefer evicting duplicate kinds (any
/// kind occurrence after its first in priority order) before falling back to the global
/// priority minimum. Always pops from the sorted list itself (removing the same element
/// from `duplicates` too, if present) so the two views never drift out of sync -- the
/// spec's fix for the source's ambiguous loop-termination behavior.
fn greedy_dual_pick(mut to_free: u64, candidates: &[ContainerId], pool: &Pool) -> EvictionPick {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        let pa = pool.get(*a).unwrap().priority;
        let pb = pool.get(*b).unwrap().priority;
        pa.partial_cmp(&pb).unwrap()
    });

    let mut seen = std::collections::HashSet::new();
    let mut duplicates: Vec<ContainerId> = Vec::new();
    for &id in &sorted {
        let kind = pool.get(id).unwrap().metadata.kind.clone();
        if !seen.insert(kind) {
            duplicates.push(id);
        }
    }

    let mut victims = Vec::new();
    let mut last_priority = None;
    while to_free > 0 && !sorted.is_empty() {
        let victim = *duplicates.first().unwrap_or(&sorted[0]);
        if let Some(pos) = duplicates.iter().position(|&x| x == victim) {
            duplicates.remove(pos);
        }
        let pos = sorted.iter().position(|&x| x == victim).unwrap();
        sorted.remove(pos);

        let container = pool.get(victim).unwrap();
        last_priority = Some(container.priority);
        to_free = to_free.saturating_sub(container.metadata.mem_size);
        victims.push(victim);
    }

    EvictionPick {
        victims,
        new_eviction_clock: last_priority,
    }
}
