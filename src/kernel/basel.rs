//! Partial sums of the Basel series, Σ 1/n² for n = 1..=N

use super::{Combine, Kernel};
use crate::partition::PartitionDescriptor;

/// Terms of the Basel series
#[derive(Copy, Clone, Debug, Default)]
pub struct BaselSeries;
//
impl Kernel for BaselSeries {
    const NAME: &'static str = "Basel series";
    const COMBINE: Combine = Combine::Sum;
    type State = ();
    type Accumulator = f64;

    fn init(&self, _block: &PartitionDescriptor) {}

    #[inline]
    fn term(&self, _state: &mut (), n: u64) -> f64 {
        let n = n as f64;
        1.0 / (n * n)
    }

    fn finish(&self, _block: &PartitionDescriptor, accumulated: f64) -> f64 {
        accumulated
    }

    fn exact(&self) -> Option<f64> {
        Some(BASEL_LIMIT)
    }
}

/// Limit of the Basel series, π²/6
pub const BASEL_LIMIT: f64 = std::f64::consts::PI * std::f64::consts::PI / 6.0;

/// Constant unit terms, for checking that a job visits every element once
///
/// The parallel sum of a job using this kernel must be exactly the number of
/// work units.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnitTerms;
//
impl Kernel for UnitTerms {
    const NAME: &'static str = "unit terms";
    const COMBINE: Combine = Combine::Sum;
    type State = ();
    type Accumulator = u64;

    fn init(&self, _block: &PartitionDescriptor) {}

    #[inline]
    fn term(&self, _state: &mut (), _n: u64) -> u64 {
        1
    }

    fn finish(&self, _block: &PartitionDescriptor, accumulated: u64) -> f64 {
        accumulated as f64
    }
}
