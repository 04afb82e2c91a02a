//! Static partitioning of the iteration space
//!
//! The iteration space of a job is `1..=N`. It is cut into `K` contiguous
//! blocks of `N / K` elements, and the `N % K` leftover elements all go to
//! block 0, so block 0 starts at 1 and every later block is shifted by the
//! remainder.

use crate::config::JobConfig;
use std::ops::RangeInclusive;

/// Work assignment of one worker thread
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PartitionDescriptor {
    /// Worker id, in `0..K`
    pub id: u32,

    /// First element of the block
    pub start: u64,

    /// Last element of the block (inclusive)
    pub end: u64,

    /// Truth that this worker periodically yields its time slice
    pub cooperative: bool,

    /// Seed of this worker's private generator
    pub seed: u64,
}
//
impl PartitionDescriptor {
    /// Elements of the block
    pub fn range(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }

    /// Number of elements in the block
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Bounds of block `index` when splitting `1..=total` into `blocks` parts
///
/// Pure function of its inputs. Callers must ensure `blocks >= 1`,
/// `total >= blocks` and `index < blocks`, which `JobConfig` guarantees.
///
pub(crate) fn block_bounds(total: u64, blocks: u32, index: u32) -> (u64, u64) {
    debug_assert!(blocks >= 1 && total >= u64::from(blocks) && index < blocks);
    let base_share = total / u64::from(blocks);
    let extra = total % u64::from(blocks);
    let index = u64::from(index);
    if index == 0 {
        (1, base_share + extra)
    } else {
        (base_share * index + extra + 1, base_share * (index + 1) + extra)
    }
}

/// Seed of worker `id`'s generator, derived from the job's base seed
pub fn worker_seed(base: u64, id: u32) -> u64 {
    base.wrapping_add(u64::from(id))
}

/// Build the descriptors of every worker of a job, in id order
pub fn partition(config: &JobConfig) -> Box<[PartitionDescriptor]> {
    let total = config.total_work_units();
    let blocks = config.thread_count();
    (0..blocks)
        .map(|id| {
            let (start, end) = block_bounds(total, blocks, id);
            PartitionDescriptor {
                id,
                start,
                end,
                cooperative: config.mode().cooperative_for(id),
                seed: worker_seed(config.seed(), id),
            }
        })
        .collect()
}
