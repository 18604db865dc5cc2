//! # Exact Symbolic Arithmetic
//!
//! Every quantity the beam solver manipulates (coordinates, load magnitudes,
//! material properties, reactions, internal-load curves) is an
//! [`Expression`]: an exact rational function of multivariate Laurent
//! polynomials with arbitrary-precision rational coefficients.
//!
//! The variables of those polynomials are [`Atom`]s:
//!
//! - user symbols such as `L`, `P`, `E`, `I`, including the position
//!   variable `x` and the constant `pi`;
//! - internal unknowns (reactions and integration constants), whose names
//!   cannot be produced by the parser;
//! - `sin`, `cos` and `exp` applied to an argument that is linear in `x`.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::symbolic::Expression;
//!
//! let moment: Expression = "-L*P + P*x".parse().unwrap();
//! let curvature = moment.checked_div(&"E*I".parse().unwrap()).unwrap();
//! let rotation = curvature.integrate().unwrap();
//!
//! let expected: Expression = "-L*P*x/(E*I) + P*x**2/(2*E*I)".parse().unwrap();
//! assert_eq!(rotation, expected);
//! ```

mod atom;
mod calculus;
mod expression;
mod linear;
mod parser;
mod polynomial;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use atom::{Atom, Func, PI_SYMBOL, POSITION_SYMBOL};
pub use expression::{Expression, IntoExpression};
pub use linear::{solve_linear_system, Solution};
pub use polynomial::{Monomial, Polynomial};

/// Result type alias for symbolic operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Failures of the symbolic layer.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ExpressionError {
    /// The input text is not a valid expression
    #[error("Cannot parse '{input}' at position {position}: {reason}")]
    Parse {
        input: String,
        position: usize,
        reason: String,
    },

    /// The operation is outside the supported closed-form class
    #[error("Unsupported {operation}: {expression}")]
    Unsupported {
        operation: String,
        expression: String,
    },

    /// A denominator evaluated to exactly zero
    #[error("Division by zero in {expression}")]
    DivisionByZero { expression: String },

    /// Numeric evaluation met a symbol without a value
    #[error("No value bound for symbol '{name}'")]
    UnboundSymbol { name: String },

    /// An equation handed to the linear solver is not linear in its unknowns
    #[error("Equation is not linear in the unknowns: {equation}")]
    NonLinear { equation: String },

    /// The linear system has no unique solution
    #[error("Linear system in {unknowns} unknowns is singular")]
    Singular { unknowns: usize },

    /// Equations and unknowns do not pair up
    #[error("Linear system has {equations} equations for {unknowns} unknowns")]
    CountMismatch { equations: usize, unknowns: usize },
}

impl ExpressionError {
    /// Create a Parse error
    pub fn parse(input: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        ExpressionError::Parse {
            input: input.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Create an Unsupported error
    pub fn unsupported(operation: impl Into<String>, expression: impl ToString) -> Self {
        ExpressionError::Unsupported {
            operation: operation.into(),
            expression: expression.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ExpressionError::Parse { .. } => "PARSE_ERROR",
            ExpressionError::Unsupported { .. } => "UNSUPPORTED_EXPRESSION",
            ExpressionError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            ExpressionError::UnboundSymbol { .. } => "UNBOUND_SYMBOL",
            ExpressionError::NonLinear { .. } => "NON_LINEAR",
            ExpressionError::Singular { .. } => "SINGULAR_SYSTEM",
            ExpressionError::CountMismatch { .. } => "COUNT_MISMATCH",
        }
    }
}

/// Numeric values for symbols, used by [`Expression::evaluate`].
///
/// `pi` is always bound to π. A default value, when set, is used for every
/// symbol without an explicit binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    values: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<f64>,
}

impl Bindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: bind `name` to `value`
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Builder: value for every symbol not bound explicitly
    pub fn with_default(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    /// Bind `name` to `value`, replacing any previous binding
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up the value of a symbol
    pub fn get(&self, name: &str) -> ExpressionResult<f64> {
        if name == PI_SYMBOL {
            return Ok(std::f64::consts::PI);
        }
        self.values
            .get(name)
            .copied()
            .or(self.default)
            .ok_or_else(|| ExpressionError::UnboundSymbol {
                name: name.to_string(),
            })
    }

    /// Iterate over the explicit bindings
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_lookup() {
        let bindings = Bindings::new().with("L", 4.0);
        assert_eq!(bindings.get("L").unwrap(), 4.0);
        assert_eq!(bindings.get("pi").unwrap(), std::f64::consts::PI);
        assert!(matches!(
            bindings.get("P"),
            Err(ExpressionError::UnboundSymbol { .. })
        ));

        let bindings = bindings.with_default(1.0);
        assert_eq!(bindings.get("P").unwrap(), 1.0);
        assert_eq!(bindings.get("L").unwrap(), 4.0);
    }

    #[test]
    fn test_error_serialization() {
        let error = ExpressionError::parse("2*", 2, "unexpected end of input");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: ExpressionError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert_eq!(error.error_code(), "PARSE_ERROR");
    }
}
