use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// The id does not name a cluster of the current load, usually because it
    /// was kept across a reload
    #[error("no cluster with id {0}")]
    ClusterNotFound(usize),
    #[error("invalid cluster options: {0}")]
    InvalidOptions(String),
    #[error("background clustering worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, ClusterError>;
