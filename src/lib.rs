//! Fork-join numeric reductions
//!
//! A job splits the iteration space `1..=N` into one contiguous block per
//! worker thread, lets each worker reduce a [`Kernel`] over its block, joins
//! every worker and merges their values. Two kernels are provided: partial
//! sums of the Basel series and Monte Carlo estimation of π.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod job;
pub mod kernel;
pub mod partition;
pub mod thread;

pub use aggregate::{Aggregate, CrossCheck, Report};
pub use config::{JobConfig, Mode};
pub use error::{JobError, Result};
pub use job::{Job, JobOutcome, JobState};
pub use kernel::{
    basel::{BaselSeries, UnitTerms},
    monte_carlo::MonteCarloPi,
    Combine, Kernel,
};
pub use partition::PartitionDescriptor;
pub use thread::worker::WorkerResult;
