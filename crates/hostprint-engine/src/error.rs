//! Engine error types

use hostprint_sdk::HostError;

/// Failure while describing one node of an object graph
#[derive(Debug, thiserror::Error)]
pub enum ExplorationError {
    /// The host failed to read, invoke or describe something
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// No instance could be produced for a type
    #[error("Cannot instantiate {0}")]
    Instantiation(String),
}

/// Failure of a whole contributing source (type scan, commands, content)
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A pool job panicked or was dropped
    #[error("Job failed: {0}")]
    Job(#[from] crate::scheduler::JobError),

    /// A collaborator failed
    #[error("Collaborator failed: {0}")]
    Collaborator(#[from] crate::collab::CollaboratorError),
}

/// Result of exploring one node
pub type ExplorationResult<T> = Result<T, ExplorationError>;
