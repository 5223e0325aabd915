//! Error types for the simulation library.

use crate::correlation::AgentId;

/// Errors that can occur while simulating repeated play.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error from the numeric kernels or the game model
    #[error("Core error: {0}")]
    Core(#[from] corral_core::Error),

    /// Agent was never registered with the correlation
    #[error("Unknown agent: {agent}")]
    UnknownAgent {
        /// The offending agent
        agent: AgentId,
    },

    /// Local operation with the wrong number of parameters
    #[error("Incorrect local operation for {agent}: expected {expected} parameters, got {actual}")]
    ParameterCount {
        /// Agent applying the operation
        agent: AgentId,
        /// Parameters required by the correlation
        expected: usize,
        /// Parameters supplied
        actual: usize,
    },

    /// A correlation or automaton was driven out of order
    #[error("Protocol violation: {message}")]
    Protocol {
        /// Which call came at the wrong time
        message: String,
    },

    /// Quantum register too large to simulate
    #[error(
        "Quantum state of {agents} agents over a register of size {register_size} is too large"
    )]
    StateTooLarge {
        /// Number of registered agents
        agents: usize,
        /// Register size per agent
        register_size: usize,
    },

    /// Settings validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type alias for simulation operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error indicates a bug in the calling code
    /// (driving the correlation protocol out of order or with foreign agents)
    /// rather than bad input or a failing environment.
    pub fn is_protocol_error(&self) -> bool {
        match self {
            Error::UnknownAgent { .. } => true,
            Error::ParameterCount { .. } => true,
            Error::Protocol { .. } => true,
            Error::Core(_) => false,
            Error::StateTooLarge { .. } => false,
            Error::Validation { .. } => false,
            Error::Csv(_) => false,
            Error::Io(_) => false,
        }
    }

    /// Creates a new protocol error.
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_display() {
        let err = Error::ParameterCount {
            agent: AgentId::new(1),
            expected: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Incorrect local operation for agent-1: expected 4 parameters, got 2"
        );
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_core_error_conversion() {
        let err: Error = corral_core::Error::EmptyWeights.into();
        assert_eq!(err.to_string(), "Core error: Empty sequence of weights");
        assert!(!err.is_protocol_error());
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("iterations", "must be at least 1");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("iterations".to_string()));
        assert_eq!(message, "must be at least 1");
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
