//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.

/// Base error for operations on the device model and rule descriptors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),
}

/// A domain invariant was violated while building or registering something.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("identifier {0:?} must not contain '/'")]
    InvalidIdentifier(String),

    #[error("cell {0:?} is declared more than once")]
    DuplicateCell(String),

    #[error("rule must declare at least one action")]
    NoActions,

    #[error("cell reference {0:?} must look like \"device/cell\"")]
    InvalidCellRef(String),

    #[error("topic filter {0:?} is not a valid MQTT filter")]
    InvalidTopicFilter(String),

    #[error("unknown status {0:?}")]
    UnknownStatusName(String),

    #[error("status code {0} is out of range")]
    UnknownStatusCode(u8),
}

/// A device or cell that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure to hand a message to the outbound transport.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The transport refused to enqueue the message (queue full or shut down).
    #[error("transport rejected the message")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A rule handler could not complete.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("failed to publish rule output")]
    Publish(#[from] PublishError),

    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error("handler failed")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}
