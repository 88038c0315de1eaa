//! Error types shared by the reasoning loop and its collaborators.
//!
//! Upstream failures (anything a [`TextGenerator`](crate::reasoning::generator::TextGenerator)
//! or [`MemoryReader`](crate::reasoning::memory::MemoryReader) returns) travel through the
//! loop as the very same boxed value they were created as, so callers can `downcast_ref`
//! them to their own error type. Only misuse of the loop itself is reported through
//! [`ReasoningError`].

use std::error::Error;
use std::fmt;

/// Boxed error carried through the loop. `Send + Sync` so it can cross tokio tasks.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Result alias used across the crate.
pub type ReasoningResult<T> = Result<T, BoxError>;

/// Errors raised by the reasoning loop itself (as opposed to its upstream collaborators).
///
/// # Examples
///
/// ```
/// use cloudllm_reasoning::ReasoningError;
///
/// let err = ReasoningError::InvalidConfig("max_rounds must be at least 2".into());
/// assert_eq!(err.to_string(), "Invalid config: max_rounds must be at least 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasoningError {
    /// [`configure`](crate::ReasoningLoop::configure) was called while a previous
    /// configuration had not been consumed and cleared yet.
    AlreadyConfigured,

    /// [`run`](crate::ReasoningLoop::run) was started without session parameters.
    NotConfigured,

    /// The [`ReasoningConfig`](crate::ReasoningConfig) failed validation.
    InvalidConfig(String),
}

impl fmt::Display for ReasoningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningError::AlreadyConfigured => {
                write!(f, "Session parameters are already configured")
            }
            ReasoningError::NotConfigured => {
                write!(f, "Session parameters must be configured before run()")
            }
            ReasoningError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl Error for ReasoningError {}

/// Error produced by the bundled provider adapters when the remote API fails.
///
/// The message is the provider's own error text prefixed with the failing operation.
#[derive(Debug, Clone)]
pub struct GenerationError(pub String);

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for GenerationError {}
