//! # Error Types
//!
//! Structured error types for beam_core. Every failure of the solving
//! pipeline is reported as a [`BeamError`] variant carrying enough context
//! to locate the offending input, and serializes to JSON like every other
//! public type of the crate.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{BeamError, BeamResult};
//!
//! fn check_span(start: f64, end: f64) -> BeamResult<()> {
//!     if end <= start {
//!         return Err(BeamError::geometry(format!(
//!             "span [{}, {}] is inverted or degenerate",
//!             start, end
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_span(1.0, 0.5).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbolic::ExpressionError;

/// Result type alias for beam_core operations
pub type BeamResult<T> = Result<T, BeamError>;

/// Which side of the equation/unknown balance a determinacy failure fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeterminacyKind {
    /// Fewer restraints than needed: the beam is a mechanism
    Understatic,
    /// More restraints than equilibrium alone can resolve
    Indeterminate,
}

impl DeterminacyKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeterminacyKind::Understatic => "understatic",
            DeterminacyKind::Indeterminate => "statically indeterminate",
        }
    }
}

impl fmt::Display for DeterminacyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Structured error type for beam operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BeamError {
    /// An input value is invalid (non-finite number, position variable in a property, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Beam geometry or a coordinate is inconsistent
    #[error("Geometry error: {reason}")]
    Geometry { reason: String },

    /// A property's spans do not partition the beam
    #[error("Property coverage error for {property}: {reason}")]
    PropertyCoverage { property: String, reason: String },

    /// Restraints and equilibrium equations do not balance
    #[error("Beam is {kind}: {reason}")]
    Determinacy {
        kind: DeterminacyKind,
        equations: usize,
        unknowns: usize,
        reason: String,
    },

    /// A spring was placed where a rigid restraint already acts
    #[error("Support conflict at x = {position}: {spring} spring on a {support}")]
    SupportConflict {
        position: String,
        spring: String,
        support: String,
    },

    /// Parsing, calculus or algebra failure in the symbolic layer
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Broken solver invariant (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BeamError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        BeamError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Geometry error
    pub fn geometry(reason: impl Into<String>) -> Self {
        BeamError::Geometry { reason: reason.into() }
    }

    /// Create a PropertyCoverage error
    pub fn property_coverage(property: impl Into<String>, reason: impl Into<String>) -> Self {
        BeamError::PropertyCoverage {
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Create a Determinacy error from mismatched counts
    pub fn determinacy(kind: DeterminacyKind, equations: usize, unknowns: usize) -> Self {
        BeamError::Determinacy {
            kind,
            equations,
            unknowns,
            reason: format!("{} equations for {} unknowns", equations, unknowns),
        }
    }

    /// Create a Determinacy error for a square system with dependent equations
    pub fn singular(unknowns: usize) -> Self {
        BeamError::Determinacy {
            kind: DeterminacyKind::Understatic,
            equations: unknowns,
            unknowns,
            reason: format!(
                "the {} equations are linearly dependent, so the supports allow a mechanism",
                unknowns
            ),
        }
    }

    /// Create a SupportConflict error
    pub fn support_conflict(position: impl ToString, spring: impl Into<String>, support: impl Into<String>) -> Self {
        BeamError::SupportConflict {
            position: position.to_string(),
            spring: spring.into(),
            support: support.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        BeamError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        BeamError::Internal {
            message: message.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BeamError::InvalidInput { .. } => "INVALID_INPUT",
            BeamError::Geometry { .. } => "GEOMETRY_ERROR",
            BeamError::PropertyCoverage { .. } => "PROPERTY_COVERAGE",
            BeamError::Determinacy { .. } => "DETERMINACY_ERROR",
            BeamError::SupportConflict { .. } => "SUPPORT_CONFLICT",
            BeamError::Expression(inner) => inner.error_code(),
            BeamError::FileError { .. } => "FILE_ERROR",
            BeamError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BeamError::VersionMismatch { .. } => "VERSION_MISMATCH",
            BeamError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BeamError::determinacy(DeterminacyKind::Indeterminate, 3, 4);
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: BeamError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("Determinacy"));
        assert_eq!(
            error.to_string(),
            "Beam is statically indeterminate: 3 equations for 4 unknowns"
        );
    }

    #[test]
    fn test_singular_message_names_dependence() {
        let error = BeamError::singular(3);
        assert!(matches!(
            error,
            BeamError::Determinacy {
                kind: DeterminacyKind::Understatic,
                equations: 3,
                unknowns: 3,
                ..
            }
        ));
        assert!(error.to_string().contains("linearly dependent"));
        assert_eq!(error.error_code(), "DETERMINACY_ERROR");
    }

    #[test]
    fn test_expression_errors_convert() {
        let error: BeamError = ExpressionError::UnboundSymbol { name: "P".into() }.into();
        assert_eq!(error.error_code(), "UNBOUND_SYMBOL");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: BeamError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BeamError::geometry("x").error_code(), "GEOMETRY_ERROR");
        assert_eq!(
            BeamError::support_conflict("L/2", "transverse", "Roller").error_code(),
            "SUPPORT_CONFLICT"
        );
        assert_eq!(
            BeamError::property_coverage("inertia", "gap").to_string(),
            "Property coverage error for inertia: gap"
        );
    }
}
