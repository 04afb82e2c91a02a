//! Per-element computations that worker threads reduce over their block

pub mod basel;
pub mod monte_carlo;

use crate::partition::PartitionDescriptor;
use num_traits::{ToPrimitive, Zero};
use std::ops::AddAssign;

/// How the per-worker values of a job are merged into the final value
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Combine {
    /// Partial sums that add up to the final result
    Sum,

    /// Independent estimates of the same quantity, averaged
    ///
    /// This is the arithmetic mean of the K estimates, which only matches a
    /// global hit-rate estimate when every worker processed the same number
    /// of elements.
    Mean,
}
//
impl Combine {
    /// Merge per-worker values
    pub fn apply(self, values: impl ExactSizeIterator<Item = f64>) -> f64 {
        let count = values.len();
        let sum: f64 = values.sum();
        match self {
            Self::Sum => sum,
            Self::Mean => sum / count as f64,
        }
    }
}

/// Pure reduction that a worker applies to every element of its block
///
/// Implementations must be shareable across worker threads. Anything that
/// must be mutated during the reduction, like a random generator, goes into
/// the per-worker `State`, which never leaves its thread.
pub trait Kernel: Sync {
    /// Human-readable name used in reports
    const NAME: &'static str;

    /// How per-worker values are merged
    const COMBINE: Combine;

    /// Private per-worker state
    type State;

    /// Type of the per-worker accumulator
    type Accumulator: Zero + AddAssign + ToPrimitive + Copy;

    /// Set up the private state of the worker processing `block`
    fn init(&self, block: &PartitionDescriptor) -> Self::State;

    /// Contribution of element `n` of the iteration space
    fn term(&self, state: &mut Self::State, n: u64) -> Self::Accumulator;

    /// Turn a block's accumulated terms into that worker's value
    fn finish(&self, block: &PartitionDescriptor, accumulated: Self::Accumulator) -> f64;

    /// Known exact value of the job's result, if any
    fn exact(&self) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Combine;

    #[test]
    fn combine() {
        let values = [1.0, 2.0, 3.0, 6.0];
        assert_eq!(Combine::Sum.apply(values.iter().copied()), 12.0);
        assert_eq!(Combine::Mean.apply(values.iter().copied()), 3.0);
    }
}
