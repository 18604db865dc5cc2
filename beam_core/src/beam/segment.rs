//! Segments between consecutive points and their response curves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::BeamResult;
use crate::loads::DistributedLoad;
use crate::symbolic::{Bindings, Expression};

/// Response quantities carried by every solved segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    ShearForce,
    BendingMoment,
    Rotation,
    Deflection,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::ShearForce,
        Quantity::BendingMoment,
        Quantity::Rotation,
        Quantity::Deflection,
    ];

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Quantity::ShearForce => "Shear force",
            Quantity::BendingMoment => "Bending moment",
            Quantity::Rotation => "Rotation",
            Quantity::Deflection => "Deflection",
        }
    }

    /// Conventional short symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Quantity::ShearForce => "V",
            Quantity::BendingMoment => "M",
            Quantity::Rotation => "θ",
            Quantity::Deflection => "v",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Open interval between two consecutive points.
///
/// Properties and the net distributed load are uniform in form over a
/// segment, so every response quantity is a single closed-form expression
/// in `x` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x_start: Expression,
    pub x_end: Expression,
    pub young: Expression,
    pub inertia: Expression,
    pub distributed_load: DistributedLoad,
    pub shear_force: Expression,
    pub bending_moment: Expression,
    pub rotation: Expression,
    pub deflection: Expression,
}

impl Segment {
    pub fn new(
        x_start: Expression,
        x_end: Expression,
        young: Expression,
        inertia: Expression,
        distributed_load: DistributedLoad,
    ) -> Self {
        Segment {
            x_start,
            x_end,
            young,
            inertia,
            distributed_load,
            shear_force: Expression::zero(),
            bending_moment: Expression::zero(),
            rotation: Expression::zero(),
            deflection: Expression::zero(),
        }
    }

    /// Bending stiffness `E * I`
    pub fn flexural_rigidity(&self) -> Expression {
        &self.young * &self.inertia
    }

    pub fn quantity(&self, quantity: Quantity) -> &Expression {
        match quantity {
            Quantity::ShearForce => &self.shear_force,
            Quantity::BendingMoment => &self.bending_moment,
            Quantity::Rotation => &self.rotation,
            Quantity::Deflection => &self.deflection,
        }
    }

    /// Numeric value of `quantity` at position `x`
    pub fn evaluate(&self, quantity: Quantity, x: f64, bindings: &Bindings) -> BeamResult<f64> {
        Ok(self.quantity(quantity).evaluate_at(x, bindings)?)
    }

    /// Numeric bounds of the segment
    pub fn bounds(&self, bindings: &Bindings) -> BeamResult<(f64, f64)> {
        Ok((self.x_start.evaluate(bindings)?, self.x_end.evaluate(bindings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_quantity() {
        let mut segment = Segment::new(
            Expression::zero(),
            Expression::symbol("L"),
            Expression::symbol("E"),
            Expression::symbol("I"),
            DistributedLoad::zero(Expression::zero(), Expression::symbol("L")),
        );
        segment.bending_moment = "-L*P + P*x".parse().unwrap();
        let bindings = Bindings::new().with("L", 2.0).with("P", 3.0);
        assert_eq!(segment.evaluate(Quantity::BendingMoment, 0.5, &bindings).unwrap(), -4.5);
        assert_eq!(segment.bounds(&bindings).unwrap(), (0.0, 2.0));
        assert_eq!(segment.flexural_rigidity(), "E*I".parse::<Expression>().unwrap());
    }
}
