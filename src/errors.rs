//! Error types for the noema substrate.
//!
//! Every failure the core can report is a recoverable, caller-local
//! condition. Nothing in this module crashes the process and nothing is
//! retried automatically; retry policy belongs to the calling agent.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, NoemaError>;

/// The dysfunctions the substrate can report.
///
/// The `Display` rendering of each variant is the human-readable error
/// message handed back to callers. Callers that wish to avoid errors can
/// check preconditions first (`concept_exists`, `is_alive`, ...), but the
/// core raises the correct kind unconditionally as a safety net.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoemaError {
    /// An object does not conform to the required Concept, Property, or
    /// Relationship class.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A structural invariant would be violated by an add or a duplicate
    /// registration.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A removal would orphan a reference and cascade was not requested.
    #[error("referential integrity: {message}")]
    ReferentialIntegrity { message: String },

    /// A subscribe or signal was issued against a concept that is not
    /// currently published.
    #[error("concept is not published: {concept}")]
    NotPublished { concept: String },

    /// An agent lifecycle operation was not legal in the current state.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl NoemaError {
    /// Build a [`NoemaError::TypeMismatch`].
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Build a [`NoemaError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a [`NoemaError::ReferentialIntegrity`].
    pub fn referential(message: impl Into<String>) -> Self {
        Self::ReferentialIntegrity {
            message: message.into(),
        }
    }

    /// Build a [`NoemaError::NotPublished`].
    pub fn not_published(concept: impl Into<String>) -> Self {
        Self::NotPublished {
            concept: concept.into(),
        }
    }

    /// Build a [`NoemaError::InvalidStateTransition`].
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The human-readable message describing the dysfunction.
    pub fn error_message(&self) -> String {
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_dysfunction() {
        let err = NoemaError::type_mismatch("Property", "Door");
        assert_eq!(err.error_message(), "type mismatch: expected Property, got Door");

        let err = NoemaError::not_published("DoorOpened");
        assert!(err.error_message().contains("DoorOpened"));
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(
            NoemaError::validation("concept already exists"),
            NoemaError::validation("concept already exists"),
        );
        assert_ne!(
            NoemaError::validation("a"),
            NoemaError::referential("a"),
        );
    }
}
