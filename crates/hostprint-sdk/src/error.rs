//! Error types for host introspection

/// Result type for introspection calls
pub type HostResult<T> = Result<T, HostError>;

/// Failures reported by a host introspection facility
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// No type with this name is known to the host
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The value has no reflectable type (primitive, string or container)
    #[error("No descriptor for value of kind {0}")]
    NoDescriptor(&'static str),

    /// Member lookup failed
    #[error("No member {member} on {type_name}")]
    NoSuchMember {
        /// Owning type name
        type_name: String,
        /// Member name
        member: String,
    },

    /// An instance member was accessed without a receiver
    #[error("Null receiver for {0}")]
    NullReceiver(String),

    /// The receiver is not an instance of the declaring type
    #[error("Receiver mismatch: expected {expected}, got {got}")]
    ReceiverMismatch {
        /// Declaring type name
        expected: String,
        /// Actual value kind or type name
        got: String,
    },

    /// Wrong number of arguments for a constructor or method
    #[error("Argument mismatch: expected {expected} arguments, got {got}")]
    ArgumentMismatch {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// The type cannot be instantiated (abstract, interface, no constructor)
    #[error("Type {0} is not instantiable")]
    NotInstantiable(String),

    /// The invoked constructor or method reported a failure
    #[error("Invocation failed: {0}")]
    InvocationFailed(String),

    /// The invoked constructor or method panicked
    #[error("Invocation panicked: {0}")]
    Panicked(String),
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::InvocationFailed(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::InvocationFailed(s.to_string())
    }
}
