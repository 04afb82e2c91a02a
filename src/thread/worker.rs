//! Worker thread body

use crate::{kernel::Kernel, partition::PartitionDescriptor};
use num_traits::{ToPrimitive, Zero};
use std::{
    num::NonZeroU64,
    time::{Duration, Instant},
};

/// When a worker gives up its time slice
///
/// Yielding is purely advisory: the worker never blocks or waits on anything,
/// it only lets the OS scheduler run someone else for a while.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct YieldPolicy {
    /// Yield cadence, or None to never yield
    every: Option<NonZeroU64>,
}
//
impl YieldPolicy {
    /// Never yield
    pub fn never() -> Self {
        Self { every: None }
    }

    /// Yield every `every` elements, or never if `every` is 0
    pub fn every(every: u64) -> Self {
        Self {
            every: NonZeroU64::new(every),
        }
    }

    /// Policy of the worker processing `block`
    pub fn for_block(block: &PartitionDescriptor, yield_every: u64) -> Self {
        if block.cooperative {
            Self::every(yield_every)
        } else {
            Self::never()
        }
    }

    /// Truth that the worker should yield before processing the element at
    /// block-local position `index`
    ///
    /// Position 0 is a multiple of every cadence, so a cooperative worker
    /// yields right as it starts.
    ///
    #[inline]
    pub fn should_yield(&self, index: u64) -> bool {
        self.every.is_some_and(|every| index % every.get() == 0)
    }
}

/// Outcome of one worker, handed back by value at join time
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkerResult {
    /// Worker id, same as the descriptor's
    pub id: u32,

    /// Partial sum or estimate produced by the worker
    pub value: f64,

    /// Raw accumulator before `Kernel::finish`, e.g. a hit count
    pub accumulated: f64,

    /// Number of elements processed
    pub work_units: u64,

    /// Truth that the worker was configured to yield
    pub cooperative: bool,

    /// Number of times the worker yielded
    pub yields: u64,

    /// Monotonic wall-clock time spent in the worker, yields included
    pub elapsed: Duration,
}
//
impl WorkerResult {
    /// Elapsed time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Label of the worker's scheduling behaviour
    pub fn mode_label(&self) -> &'static str {
        if self.cooperative {
            "cooperative"
        } else {
            "competitive"
        }
    }
}

/// Reduce `kernel` over `block`, yielding according to `policy`
pub fn run_worker<K: Kernel>(
    kernel: &K,
    block: &PartitionDescriptor,
    policy: YieldPolicy,
) -> WorkerResult {
    let start = Instant::now();
    tracing::debug!(
        worker = block.id,
        start = block.start,
        end = block.end,
        cooperative = block.cooperative,
        "worker started"
    );

    let mut state = kernel.init(block);
    let mut accumulator = K::Accumulator::zero();
    let mut yields = 0;
    for (index, n) in (0u64..).zip(block.range()) {
        accumulator += kernel.term(&mut state, n);
        if policy.should_yield(index) {
            std::thread::yield_now();
            yields += 1;
        }
    }
    let value = kernel.finish(block, accumulator);
    let elapsed = start.elapsed();

    tracing::debug!(
        worker = block.id,
        value,
        yields,
        elapsed_s = elapsed.as_secs_f64(),
        "worker finished"
    );
    WorkerResult {
        id: block.id,
        value,
        accumulated: accumulator.to_f64().unwrap_or(f64::NAN),
        work_units: block.len(),
        cooperative: block.cooperative,
        yields,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::{run_worker, YieldPolicy};
    use crate::{
        kernel::{basel::UnitTerms, monte_carlo::MonteCarloPi},
        partition::PartitionDescriptor,
    };

    fn block(len: u64, cooperative: bool) -> PartitionDescriptor {
        PartitionDescriptor {
            id: 4,
            start: 11,
            end: 10 + len,
            cooperative,
            seed: 99,
        }
    }

    #[test]
    fn yield_cadence_includes_first_element() {
        let policy = YieldPolicy::every(3);
        let hits: Vec<u64> = (0..10).filter(|&i| policy.should_yield(i)).collect();
        assert_eq!(hits, [0, 3, 6, 9]);
        assert!(!(0..10).any(|i| YieldPolicy::never().should_yield(i)));
        assert_eq!(YieldPolicy::every(0), YieldPolicy::never());
    }

    #[test]
    fn policy_follows_block() {
        assert_eq!(
            YieldPolicy::for_block(&block(1, true), 5),
            YieldPolicy::every(5)
        );
        assert_eq!(
            YieldPolicy::for_block(&block(1, false), 5),
            YieldPolicy::never()
        );
    }

    #[test]
    fn counts_every_element() {
        let result = run_worker(&UnitTerms, &block(1000, true), YieldPolicy::every(100));
        assert_eq!(result.id, 4);
        assert_eq!(result.value, 1000.0);
        assert_eq!(result.accumulated, 1000.0);
        assert_eq!(result.work_units, 1000);
        assert_eq!(result.yields, 10);
        assert_eq!(result.mode_label(), "cooperative");
        assert!(result.elapsed_seconds() >= 0.0);
    }

    #[test]
    fn yielding_does_not_change_the_value() {
        let b = block(50_000, true);
        let eager = run_worker(&MonteCarloPi, &b, YieldPolicy::never());
        let polite = run_worker(&MonteCarloPi, &b, YieldPolicy::every(1));
        assert_eq!(eager.value, polite.value);
        assert_eq!(eager.accumulated, polite.accumulated);
        assert_eq!(eager.yields, 0);
        assert_eq!(polite.yields, 50_000);
    }
}
