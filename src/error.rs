//! Error type shared by every stage of a job

use thiserror::Error;

/// Everything that can make a job fail
///
/// Configuration errors are raised before any thread exists. The other two
/// variants are only reported once every thread that did start has been
/// joined, so no worker is ever left running behind the caller's back.
#[derive(Error, Debug)]
pub enum JobError {
    /// Invalid combination of work units and thread count
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The OS refused to create a worker thread
    #[error("failed to spawn worker {id}: {source}")]
    ThreadSpawn {
        id: u32,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before returning its result
    #[error("worker {id} panicked: {message}")]
    WorkerPanicked { id: u32, message: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, JobError>;

impl JobError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a worker panic error from a `JoinHandle::join` payload
    pub(crate) fn worker_panicked(id: u32, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::WorkerPanicked { id, message }
    }

    /// Truth that this error was detected before any thread was created
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}
