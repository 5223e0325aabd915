//! Error types for the Corral core library.

/// Errors raised by the numeric kernels and the game model.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A weight vector was empty where a distribution was expected.
    #[error("Empty sequence of weights")]
    EmptyWeights,

    /// Weights do not form a usable distribution (negative or non-finite total).
    #[error("Invalid weights: {message}")]
    InvalidWeights {
        /// What is wrong with the weights
        message: String,
    },

    /// Parameter vector of the wrong size for a unitary.
    #[error("Cannot build a unitary from {len} parameters: {message}")]
    UnitaryParameters {
        /// Number of parameters supplied
        len: usize,
        /// What was expected
        message: String,
    },

    /// Payoff tree or game dimensions do not describe a game.
    #[error("Misdefined game: {message}")]
    MisdefinedGame {
        /// Description of the defect
        message: String,
    },

    /// A type or choice profile does not fit the game.
    #[error("Invalid profile: {message}")]
    InvalidProfile {
        /// Description of the mismatch
        message: String,
    },

    /// Input validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },
}

/// Convenience `Result` type alias for Corral core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error stems from caller input rather than
    /// from the state of a running simulation.
    ///
    /// Every core error is an input error today; the method exists so that
    /// callers can classify errors uniformly across the workspace.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::EmptyWeights => true,
            Error::InvalidWeights { .. } => true,
            Error::UnitaryParameters { .. } => true,
            Error::MisdefinedGame { .. } => true,
            Error::InvalidProfile { .. } => true,
            Error::Validation { .. } => true,
        }
    }

    /// Creates a new invalid-weights error.
    pub fn invalid_weights<S: Into<String>>(message: S) -> Self {
        Error::InvalidWeights {
            message: message.into(),
        }
    }

    /// Creates a new unitary-parameters error.
    pub fn unitary_parameters<S: Into<String>>(len: usize, message: S) -> Self {
        Error::UnitaryParameters {
            len,
            message: message.into(),
        }
    }

    /// Creates a new misdefined-game error.
    pub fn misdefined_game<S: Into<String>>(message: S) -> Self {
        Error::MisdefinedGame {
            message: message.into(),
        }
    }

    /// Creates a new invalid-profile error.
    pub fn invalid_profile<S: Into<String>>(message: S) -> Self {
        Error::InvalidProfile {
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
