use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open result log `{}`: {source}", .path.display())]
    OpenLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create result log `{}`: {source}", .path.display())]
    CreateLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write result log: {0}")]
    Write(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid threshold `{metric}`: {reason}")]
    InvalidThreshold { metric: String, reason: String },

    #[error("`workers` must be a positive integer")]
    InvalidWorkers,

    #[error("replay worker panicked")]
    WorkerPanicked,
}
