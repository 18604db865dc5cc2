//! Distributed loads and their resultants

use serde::{Deserialize, Serialize};

use crate::errors::BeamResult;
use crate::symbolic::Expression;

/// Load intensity `expression(x)` over `[x_start, x_end]`, positive upward.
///
/// The resultant is computed once at construction. The first moment is
/// kept alongside the centroid so that moment equations never divide by a
/// symbolic magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    pub x_start: Expression,
    pub x_end: Expression,
    pub expression: Expression,
    magnitude: Expression,
    first_moment: Expression,
    centroid: Expression,
}

impl DistributedLoad {
    /// Build the load and integrate its resultant.
    ///
    /// Fails when the expression cannot be integrated in closed form.
    pub fn new(x_start: Expression, x_end: Expression, expression: Expression) -> BeamResult<Self> {
        let magnitude = expression.definite_integral(&x_start, &x_end)?;
        let lever = &Expression::position() * &expression;
        let first_moment = lever.definite_integral(&x_start, &x_end)?;
        let centroid = if magnitude.is_zero() {
            Expression::zero()
        } else {
            first_moment.checked_div(&magnitude)?
        };
        Ok(DistributedLoad {
            x_start,
            x_end,
            expression,
            magnitude,
            first_moment,
            centroid,
        })
    }

    /// A load of zero intensity over the span
    pub fn zero(x_start: Expression, x_end: Expression) -> Self {
        DistributedLoad {
            x_start,
            x_end,
            expression: Expression::zero(),
            magnitude: Expression::zero(),
            first_moment: Expression::zero(),
            centroid: Expression::zero(),
        }
    }

    /// Resultant force, `∫ q dx`
    pub fn magnitude(&self) -> &Expression {
        &self.magnitude
    }

    /// `∫ x q dx`
    pub fn first_moment(&self) -> &Expression {
        &self.first_moment
    }

    /// Point of application of the resultant (zero when the resultant vanishes)
    pub fn centroid(&self) -> &Expression {
        &self.centroid
    }

    /// Moment of the load about `reference`, counter-clockwise positive
    pub fn moment_about(&self, reference: &Expression) -> Expression {
        &self.first_moment - &(reference * &self.magnitude)
    }

    pub fn is_zero(&self) -> bool {
        self.expression.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(s: &str) -> Expression {
        s.parse().unwrap()
    }

    #[test]
    fn test_triangular_resultant() {
        let load = DistributedLoad::new(expr("0"), expr("2"), expr("-5*x")).unwrap();
        assert_eq!(load.magnitude(), &expr("-10"));
        assert_eq!(load.centroid(), &expr("4/3"));
        assert_eq!(load.moment_about(&expr("4")), expr("-40/3 + 40"));
    }

    #[test]
    fn test_sine_resultant() {
        let load = DistributedLoad::new(expr("0"), expr("L"), expr("sin(pi*x/L)")).unwrap();
        assert_eq!(load.magnitude(), &expr("2*L/pi"));
        assert_eq!(load.centroid(), &expr("L/2"));
    }

    #[test]
    fn test_self_cancelling_load_has_zero_centroid() {
        let load = DistributedLoad::new(expr("0"), expr("2"), expr("x - 1")).unwrap();
        assert!(load.magnitude().is_zero());
        assert!(load.centroid().is_zero());
        assert!(!load.first_moment().is_zero());
    }

    #[test]
    fn test_unsupported_expression() {
        assert!(DistributedLoad::new(expr("1"), expr("2"), expr("1/x")).is_err());
    }
}
