//! Fork-join launcher
//!
//! One scoped OS thread per partition descriptor. The kernel, the config and
//! the descriptors are borrowed read-only by every thread, and each thread
//! hands its `WorkerResult` back by value when joined.

use super::worker::{run_worker, WorkerResult, YieldPolicy};
use crate::{
    config::JobConfig,
    error::{JobError, Result},
    kernel::Kernel,
    partition::PartitionDescriptor,
};

/// Run one worker per descriptor and wait for all of them
///
/// Results come back in descriptor order. If a thread cannot be spawned or a
/// worker panics, every thread that was started is still joined before the
/// error is returned, and no partial result is ever produced.
///
pub fn launch<K: Kernel>(
    config: &JobConfig,
    blocks: &[PartitionDescriptor],
    kernel: &K,
) -> Result<Box<[WorkerResult]>> {
    launch_with(config, blocks, kernel, |id| {
        std::thread::Builder::new().name(format!("worker-{id}"))
    })
}

/// `launch` with a caller-provided thread builder for each worker id
pub(crate) fn launch_with<K: Kernel>(
    config: &JobConfig,
    blocks: &[PartitionDescriptor],
    kernel: &K,
    make_builder: impl Fn(u32) -> std::thread::Builder,
) -> Result<Box<[WorkerResult]>> {
    std::thread::scope(|s| {
        let mut handles = Vec::with_capacity(blocks.len());
        let mut spawn_error = None;
        for block in blocks {
            let policy = YieldPolicy::for_block(block, config.yield_every());
            let spawned =
                make_builder(block.id).spawn_scoped(s, move || run_worker(kernel, block, policy));
            match spawned {
                Ok(handle) => handles.push((block.id, handle)),
                Err(source) => {
                    tracing::error!(worker = block.id, %source, "failed to spawn worker");
                    spawn_error = Some(JobError::ThreadSpawn {
                        id: block.id,
                        source,
                    });
                    break;
                }
            }
        }
        tracing::debug!(spawned = handles.len(), "waiting for workers");

        // Join everyone before looking at any failure
        let joined: Vec<Result<WorkerResult>> = handles
            .into_iter()
            .map(|(id, handle)| {
                handle.join().map_err(|payload| {
                    let error = JobError::worker_panicked(id, &*payload);
                    tracing::error!(worker = id, "{error}");
                    error
                })
            })
            .collect();
        if let Some(error) = spawn_error {
            return Err(error);
        }
        joined.into_iter().collect()
    })
}
