//! Job driver
//!
//! A job goes through CONFIGURED → PARTITIONED → RUNNING → JOINED →
//! AGGREGATED → REPORTED, without retries. Configuration is validated when
//! the `JobConfig` is built, so nothing can fail before RUNNING.

use crate::{
    aggregate::{Aggregate, CrossCheck, Report},
    config::{JobConfig, Mode},
    error::Result,
    kernel::{Combine, Kernel},
    partition::{partition, PartitionDescriptor},
    thread::launcher::launch,
};
use std::time::Instant;

/// Lifecycle stage of a job
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum JobState {
    Configured,
    Partitioned,
    Running,
    Joined,
    Aggregated,
    Reported,
}

/// One fork-join reduction of `kernel` over the iteration space of `config`
pub struct Job<K: Kernel> {
    config: JobConfig,
    kernel: K,
    blocks: Box<[PartitionDescriptor]>,
    state: JobState,
}
//
impl<K: Kernel> Job<K> {
    /// Partition a new job
    pub fn new(config: JobConfig, kernel: K) -> Self {
        tracing::info!(
            kernel = K::NAME,
            work_units = config.total_work_units(),
            threads = config.thread_count(),
            mode = ?config.mode(),
            yield_every = config.yield_every(),
            seed = config.seed(),
            "job configured"
        );
        if config.mode() != Mode::Competitive && config.yield_every() == 0 {
            tracing::warn!("cooperative workers configured with a yield cadence of 0 will never yield");
        }
        if K::COMBINE == Combine::Mean && !config.is_evenly_split() {
            tracing::warn!(
                remainder = config.total_work_units() % u64::from(config.thread_count()),
                "averaging estimates from unequal blocks, block 0 is weighted like the others"
            );
        }
        let mut job = Self {
            blocks: partition(&config),
            config,
            kernel,
            state: JobState::Configured,
        };
        job.transition(JobState::Partitioned);
        job
    }

    /// Current lifecycle stage
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Job parameters
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Work assignment of each worker
    pub fn blocks(&self) -> &[PartitionDescriptor] {
        &self.blocks
    }

    /// Run the workers, join them and merge their results
    ///
    /// If `cross_check` is set, the kernel is then run again sequentially
    /// over the whole iteration space for comparison.
    ///
    pub fn run(mut self, cross_check: bool) -> Result<JobOutcome> {
        self.transition(JobState::Running);
        let start = Instant::now();
        let results = launch(&self.config, &self.blocks, &self.kernel)?;
        let elapsed = start.elapsed();
        self.transition(JobState::Joined);

        let aggregate = Aggregate::new(&self.kernel, results, elapsed);
        self.transition(JobState::Aggregated);
        tracing::info!(
            value = aggregate.value,
            elapsed_s = elapsed.as_secs_f64(),
            "parallel phase done"
        );

        let cross_check = cross_check.then(|| aggregate.cross_check(&self.kernel, &self.config));
        if let Some(check) = &cross_check {
            tracing::info!(
                sequential = check.sequential,
                difference = check.difference,
                "sequential reference done"
            );
        }
        Ok(JobOutcome {
            config: self.config,
            aggregate,
            cross_check,
            state: self.state,
        })
    }

    fn transition(&mut self, next: JobState) {
        debug_assert!(next > self.state);
        tracing::info!(from = ?self.state, to = ?next, "job state change");
        self.state = next;
    }
}

/// Merged results of a job that ran to completion
#[derive(Clone, Debug)]
pub struct JobOutcome {
    config: JobConfig,
    aggregate: Aggregate,
    cross_check: Option<CrossCheck>,
    state: JobState,
}
//
impl JobOutcome {
    /// Merged results
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Comparison with the sequential reference, if requested
    pub fn cross_check(&self) -> Option<&CrossCheck> {
        self.cross_check.as_ref()
    }

    /// Final value of the job
    pub fn value(&self) -> f64 {
        self.aggregate.value
    }

    /// Current lifecycle stage
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Produce the text report, which completes the job
    pub fn report(&mut self) -> Report<'_> {
        if self.state != JobState::Reported {
            tracing::info!(from = ?self.state, to = ?JobState::Reported, "job state change");
            self.state = JobState::Reported;
        }
        Report::new(&self.config, &self.aggregate, self.cross_check.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::{Job, JobState};
    use crate::{
        config::{JobConfig, Mode},
        kernel::{
            basel::{BaselSeries, UnitTerms, BASEL_LIMIT},
            monte_carlo::MonteCarloPi,
        },
        test_utils,
    };
    use std::sync::{Arc, Mutex};

    /// In-memory sink for formatted log lines
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);
    //
    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn state_changes_are_logged_at_info() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let config = JobConfig::new(100, 2).unwrap();
            let mut outcome = Job::new(config, UnitTerms).run(false).unwrap();
            let _ = outcome.report().to_string();
        });
        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        for state in ["Partitioned", "Running", "Joined", "Aggregated", "Reported"] {
            assert!(logs.contains(&format!("to={state}")), "{logs}");
        }
    }

    #[test]
    fn lifecycle() {
        let job = Job::new(JobConfig::new(1000, 3).unwrap(), UnitTerms);
        assert_eq!(job.state(), JobState::Partitioned);
        assert_eq!(job.blocks().len(), 3);
        assert_eq!(job.config().thread_count(), 3);
        let mut outcome = job.run(false).unwrap();
        assert_eq!(outcome.state(), JobState::Aggregated);
        assert_eq!(outcome.value(), 1000.0);
        assert!(outcome.cross_check().is_none());
        let text = outcome.report().to_string();
        assert_eq!(outcome.state(), JobState::Reported);
        assert!(text.contains("sum: 1000.000000000000000"));
    }

    #[test]
    fn basel_matches_sequential() {
        let config = JobConfig::new(1_000_003, 7).unwrap();
        let outcome = Job::new(config, BaselSeries).run(true).unwrap();
        let check = outcome.cross_check().unwrap();
        assert!(check.relative_difference() < 1e-9, "{check:?}");
        // Tail of the series past N is about 1/N
        let error = outcome.aggregate().error_vs_exact().unwrap();
        assert!(error < 0.0 && error.abs() < 2e-6, "{error}");
    }

    #[test]
    fn pi_converges() {
        let config = JobConfig::new(10_000_000, 8).unwrap().with_seed(2024);
        assert!(config.is_evenly_split());
        let outcome = Job::new(config, MonteCarloPi).run(false).unwrap();
        let pi = outcome.value();
        assert!((pi - 3.14159).abs() < 0.01, "{pi}");
    }

    #[test]
    fn mean_equals_global_hit_rate_on_even_split() {
        let config = JobConfig::new(400_000, 4).unwrap();
        let outcome = Job::new(config, MonteCarloPi).run(false).unwrap();
        let aggregate = outcome.aggregate();
        let global = 4.0 * aggregate.total_accumulated() / aggregate.total_work_units() as f64;
        assert!((outcome.value() - global).abs() < 1e-12);
    }

    #[test]
    fn yielding_keeps_the_estimate() {
        let base = JobConfig::new(600_000, 6).unwrap().with_seed(77);
        let competitive = Job::new(base, MonteCarloPi).run(false).unwrap();
        for mode in [Mode::Cooperative, Mode::Mixed] {
            let config = base.with_mode(mode).with_yield_every(1000);
            let outcome = Job::new(config, MonteCarloPi).run(false).unwrap();
            assert_eq!(outcome.value(), competitive.value());
        }
    }

    #[test]
    fn twelve_mixed_workers_join() {
        let config = JobConfig::new(1_200_000, 12)
            .unwrap()
            .with_mode(Mode::Mixed)
            .with_yield_every(10_000);
        let outcome = Job::new(config, MonteCarloPi).run(false).unwrap();
        test_utils::check_ids(&outcome.aggregate().results, 12).unwrap();
        let cooperative = outcome
            .aggregate()
            .results
            .iter()
            .filter(|r| r.cooperative)
            .count();
        assert_eq!(cooperative, 6);
    }

    #[test]
    #[ignore = "a billion terms takes a while"]
    fn basel_billion_terms() {
        let config = JobConfig::new(1_000_000_000, 10).unwrap();
        let job = Job::new(config, BaselSeries);
        assert_eq!(job.blocks()[0].len(), 100_000_000);
        let outcome = job.run(true).unwrap();
        assert!((outcome.cross_check().unwrap().sequential - BASEL_LIMIT).abs() < 1e-6);
        assert!((outcome.value() - BASEL_LIMIT).abs() < 1e-6);
    }
}
