//! Job parameters
//!
//! A `JobConfig` is built and validated once, before any thread is created,
//! and is then only ever read. Worker threads borrow it for the duration of
//! the job.

use crate::error::{JobError, Result};

/// Scheduling behaviour of the worker threads
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    /// No worker ever yields
    #[default]
    Competitive,

    /// Every worker yields at the configured cadence
    Cooperative,

    /// Even worker ids yield, odd ones don't
    Mixed,
}
//
impl Mode {
    /// Truth that worker `id` should yield its time slice periodically
    pub fn cooperative_for(self, id: u32) -> bool {
        match self {
            Self::Competitive => false,
            Self::Cooperative => true,
            Self::Mixed => id % 2 == 0,
        }
    }
}

/// Immutable description of one fork-join job
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct JobConfig {
    total_work_units: u64,
    thread_count: u32,
    yield_every: u64,
    mode: Mode,
    seed: u64,
}
//
impl JobConfig {
    /// Base seed used when none is specified
    pub const DEFAULT_SEED: u64 = 12345;

    /// Set up a job over `total_work_units` elements split across
    /// `thread_count` threads
    ///
    /// Fails if there are no threads, or fewer work units than threads, since
    /// every thread must own a non-empty block.
    ///
    pub fn new(total_work_units: u64, thread_count: u32) -> Result<Self> {
        if thread_count == 0 {
            return Err(JobError::config("thread count must be at least 1"));
        }
        if total_work_units < u64::from(thread_count) {
            return Err(JobError::config(format!(
                "{total_work_units} work units cannot be split across {thread_count} threads"
            )));
        }
        Ok(Self {
            total_work_units,
            thread_count,
            yield_every: 0,
            mode: Mode::default(),
            seed: Self::DEFAULT_SEED,
        })
    }

    /// Yield every `yield_every` elements in cooperative workers (0 = never)
    pub fn with_yield_every(mut self, yield_every: u64) -> Self {
        self.yield_every = yield_every;
        self
    }

    /// Pick the scheduling mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Pick the base seed that per-worker generators derive from
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of elements in the whole iteration space
    pub fn total_work_units(&self) -> u64 {
        self.total_work_units
    }

    /// Number of worker threads
    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    /// Yield cadence of cooperative workers, 0 if they never yield
    pub fn yield_every(&self) -> u64 {
        self.yield_every
    }

    /// Scheduling mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Base seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Truth that every worker gets the same number of work units
    pub fn is_evenly_split(&self) -> bool {
        self.total_work_units % u64::from(self.thread_count) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{JobConfig, Mode};

    #[test]
    fn rejects_bad_shapes() {
        assert!(JobConfig::new(10, 0).unwrap_err().is_config());
        assert!(JobConfig::new(3, 4).unwrap_err().is_config());
        assert!(JobConfig::new(0, 1).unwrap_err().is_config());
        assert!(JobConfig::new(4, 4).is_ok());
    }

    #[test]
    fn builder_defaults() {
        let config = JobConfig::new(100, 7).unwrap();
        assert_eq!(config.yield_every(), 0);
        assert_eq!(config.mode(), Mode::Competitive);
        assert_eq!(config.seed(), JobConfig::DEFAULT_SEED);
        assert!(!config.is_evenly_split());

        let config = config
            .with_yield_every(10)
            .with_mode(Mode::Mixed)
            .with_seed(7);
        assert_eq!(config.yield_every(), 10);
        assert_eq!(config.mode(), Mode::Mixed);
        assert_eq!(config.seed(), 7);
    }

    #[test]
    fn mixed_alternates_by_parity() {
        let flags: Vec<bool> = (0..6).map(|id| Mode::Mixed.cooperative_for(id)).collect();
        assert_eq!(flags, [true, false, true, false, true, false]);
        assert!((0..6).all(|id| Mode::Cooperative.cooperative_for(id)));
        assert!((0..6).all(|id| !Mode::Competitive.cooperative_for(id)));
    }
}
