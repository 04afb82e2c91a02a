//! Reduction of per-worker results and text reporting

use crate::{
    config::JobConfig,
    kernel::{Combine, Kernel},
    partition::PartitionDescriptor,
    thread::worker::{run_worker, WorkerResult, YieldPolicy},
};
use std::{fmt, time::Duration};

/// Final value of a job, along with the per-worker results it came from
#[derive(Clone, Debug)]
pub struct Aggregate {
    /// Name of the kernel that produced the results
    pub kernel: &'static str,

    /// Merge rule that was applied
    pub combine: Combine,

    /// Final value
    pub value: f64,

    /// Known exact value, if the kernel has one
    pub exact: Option<f64>,

    /// Per-worker results, in worker id order
    pub results: Box<[WorkerResult]>,

    /// Wall-clock duration of the parallel phase, spawn to last join
    pub elapsed: Duration,
}
//
impl Aggregate {
    /// Merge the results of a job run with `kernel`
    pub fn new<K: Kernel>(kernel: &K, results: Box<[WorkerResult]>, elapsed: Duration) -> Self {
        let value = K::COMBINE.apply(results.iter().map(|r| r.value));
        Self {
            kernel: K::NAME,
            combine: K::COMBINE,
            value,
            exact: kernel.exact(),
            results,
            elapsed,
        }
    }

    /// Results sorted by elapsed time, fastest first
    ///
    /// Only meant for display, the final value does not depend on it.
    pub fn by_elapsed(&self) -> Vec<&WorkerResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.elapsed);
        sorted
    }

    /// Sum of the raw per-worker accumulators (hit counts, for π)
    pub fn total_accumulated(&self) -> f64 {
        self.results.iter().map(|r| r.accumulated).sum()
    }

    /// Total number of elements processed
    pub fn total_work_units(&self) -> u64 {
        self.results.iter().map(|r| r.work_units).sum()
    }

    /// Final value minus the exact value
    pub fn error_vs_exact(&self) -> Option<f64> {
        self.exact.map(|exact| self.value - exact)
    }

    /// Compare with a sequential run of the same kernel over the whole range
    pub fn cross_check<K: Kernel>(&self, kernel: &K, config: &JobConfig) -> CrossCheck {
        CrossCheck::new(self.value, &sequential(kernel, config))
    }
}

/// Comparison of a parallel result with its sequential counterpart
///
/// Summation order differs between the two paths, so they need not be equal.
/// The difference is reported, never asserted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CrossCheck {
    /// Sequential value
    pub sequential: f64,

    /// Parallel value minus sequential value
    pub difference: f64,

    /// Truth that both values have the same bit pattern
    pub bit_identical: bool,

    /// Wall-clock duration of the sequential run
    pub elapsed: Duration,
}
//
impl CrossCheck {
    /// Compare `parallel` with a sequential worker's output
    pub fn new(parallel: f64, sequential: &WorkerResult) -> Self {
        Self {
            sequential: sequential.value,
            difference: parallel - sequential.value,
            bit_identical: parallel.to_bits() == sequential.value.to_bits(),
            elapsed: sequential.elapsed,
        }
    }

    /// Difference relative to the sequential value
    pub fn relative_difference(&self) -> f64 {
        if self.sequential == 0.0 {
            self.difference.abs()
        } else {
            (self.difference / self.sequential).abs()
        }
    }
}

/// Single-threaded run of `kernel` over the full iteration space
///
/// Uses the job's base seed as a single-worker job would, and never yields.
pub fn sequential<K: Kernel>(kernel: &K, config: &JobConfig) -> WorkerResult {
    let block = PartitionDescriptor {
        id: 0,
        start: 1,
        end: config.total_work_units(),
        cooperative: false,
        seed: config.seed(),
    };
    tracing::info!(work_units = block.len(), "running sequential reference");
    run_worker(kernel, &block, YieldPolicy::never())
}

/// Human-readable report of a finished job
pub struct Report<'job> {
    config: &'job JobConfig,
    aggregate: &'job Aggregate,
    cross_check: Option<&'job CrossCheck>,
}
//
impl<'job> Report<'job> {
    /// Prepare a report
    pub fn new(
        config: &'job JobConfig,
        aggregate: &'job Aggregate,
        cross_check: Option<&'job CrossCheck>,
    ) -> Self {
        Self {
            config,
            aggregate,
            cross_check,
        }
    }
}
//
impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            config,
            aggregate,
            cross_check,
        } = self;
        let cooperative = aggregate.results.iter().filter(|r| r.cooperative).count();
        let competitive = aggregate.results.len() - cooperative;
        writeln!(
            f,
            "{}: {} work units across {} threads ({competitive} competitive, {cooperative} cooperative)",
            aggregate.kernel,
            config.total_work_units(),
            config.thread_count(),
        )?;
        if cooperative > 0 {
            match config.yield_every() {
                0 => writeln!(f, "cooperative workers never yield (yield cadence is 0)")?,
                every => writeln!(f, "cooperative workers yield every {every} elements")?,
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>6}  {:<11}  {:>12}  {:>10}  {:>20}",
            "worker", "mode", "work units", "time (s)", "value"
        )?;
        for result in aggregate.by_elapsed() {
            writeln!(
                f,
                "{:>6}  {:<11}  {:>12}  {:>10.3}  {:>20.15}",
                result.id,
                result.mode_label(),
                result.work_units,
                result.elapsed_seconds(),
                result.value,
            )?;
        }
        writeln!(f)?;

        let label = match aggregate.combine {
            Combine::Sum => "sum",
            Combine::Mean => "mean of estimates",
        };
        writeln!(f, "{label}: {:.15}", aggregate.value)?;
        if aggregate.combine == Combine::Mean {
            writeln!(
                f,
                "accumulated: {} over {} work units",
                aggregate.total_accumulated(),
                aggregate.total_work_units()
            )?;
        }
        if let (Some(exact), Some(error)) = (aggregate.exact, aggregate.error_vs_exact()) {
            writeln!(f, "exact: {exact:.15} (result - exact: {error:e})")?;
        }
        if let Some(check) = cross_check {
            writeln!(f, "sequential: {:.15}", check.sequential)?;
            writeln!(
                f,
                "parallel - sequential: {:e} (bit-identical: {})",
                check.difference, check.bit_identical
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "parallel time ({} threads): {:.6} s",
            config.thread_count(),
            aggregate.elapsed.as_secs_f64()
        )?;
        if let Some(check) = cross_check {
            writeln!(f, "sequential time: {:.6} s", check.elapsed.as_secs_f64())?;
        }
        Ok(())
    }
}
