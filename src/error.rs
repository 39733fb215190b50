//! Error types used by the dispatcher.
//!
//! [`DispatchError`] is the only error surfaced by the public API. Everything else
//! the dispatcher encounters (raising a type nobody listens to, disposing a token
//! twice, sweeping an already-removed record) is a silent no-op by contract.
//!
//! Like the other error enums in this family, it provides `as_label` / `as_message`
//! helpers for logs and metrics.

use thiserror::Error;

/// # Errors produced by the subscription API.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A subscription was requested with an argument that cannot be honored,
    /// e.g. an owner handle whose allocation is already gone.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: &'static str,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// let err = DispatchError::InvalidArgument { reason: "owner is dangling" };
    /// assert_eq!(err.as_label(), "dispatch_invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidArgument { .. } => "dispatch_invalid_argument",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::InvalidArgument { reason } => format!("invalid argument: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = DispatchError::InvalidArgument {
            reason: "owner is dangling",
        };
        assert_eq!(err.to_string(), "invalid argument: owner is dangling");
        assert_eq!(err.as_message(), err.to_string());
    }
}
