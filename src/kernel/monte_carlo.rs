//! Monte Carlo estimation of π
//!
//! Each worker draws points uniformly in the unit square and counts those
//! falling in the quarter disc. A block's estimate is `4 * hits / samples`,
//! and the job's result is the mean of the per-worker estimates.

use super::{Combine, Kernel};
use crate::partition::PartitionDescriptor;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Quarter-disc hit test on uniformly sampled points
#[derive(Copy, Clone, Debug, Default)]
pub struct MonteCarloPi;
//
impl Kernel for MonteCarloPi {
    const NAME: &'static str = "Monte Carlo pi";
    const COMBINE: Combine = Combine::Mean;

    // Each worker owns a generator seeded from its descriptor, never shared
    type State = StdRng;
    type Accumulator = u64;

    fn init(&self, block: &PartitionDescriptor) -> StdRng {
        StdRng::seed_from_u64(block.seed)
    }

    #[inline]
    fn term(&self, rng: &mut StdRng, _n: u64) -> u64 {
        let x: f64 = rng.gen();
        let y: f64 = rng.gen();
        u64::from(x * x + y * y <= 1.0)
    }

    fn finish(&self, block: &PartitionDescriptor, hits: u64) -> f64 {
        4.0 * hits as f64 / block.len() as f64
    }

    fn exact(&self) -> Option<f64> {
        Some(std::f64::consts::PI)
    }
}
