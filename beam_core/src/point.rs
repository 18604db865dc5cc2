//! # Points and Supports
//!
//! A [`Point`] marks a coordinate where something happens: a support, a
//! load, a spring, a property change, or a beam end. Its [`PointKind`]
//! decides which reactions it can develop and which kinematic conditions it
//! imposes on the neighbouring segments.
//!
//! | Kind       | Force | Moment | DOF | Deflection           | Rotation             |
//! |------------|-------|--------|-----|----------------------|----------------------|
//! | Continuity | no    | no     | 0   | continuous           | continuous           |
//! | Pin        | yes   | no     | 2   | zero (+ continuous)  | continuous           |
//! | Roller     | yes   | no     | 1   | zero (+ continuous)  | continuous           |
//! | Fixed      | yes   | yes    | 3   | zero (+ continuous)  | zero (+ continuous)  |
//! | Hinge      | no    | no     | 0   | continuous           | free                 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::beam::Segment;
use crate::errors::{BeamError, BeamResult};
use crate::loads::SpringKind;
use crate::symbolic::Expression;

// ============================================================================
// Support kinds
// ============================================================================

/// Supports a user can place on a beam.
///
/// Deserialization accepts the same case-insensitive keywords as `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportKind {
    Pin,
    Roller,
    Hinge,
    Fixed,
}

impl SupportKind {
    /// All support kinds, for listings
    pub const ALL: [SupportKind; 4] = [
        SupportKind::Pin,
        SupportKind::Roller,
        SupportKind::Hinge,
        SupportKind::Fixed,
    ];

    /// Keyword accepted by [`FromStr`]
    pub fn keyword(&self) -> &'static str {
        match self {
            SupportKind::Pin => "pin",
            SupportKind::Roller => "roller",
            SupportKind::Hinge => "hinge",
            SupportKind::Fixed => "fixed",
        }
    }
}

impl fmt::Display for SupportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PointKind::from(*self).name())
    }
}

impl FromStr for SupportKind {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_ascii_lowercase();
        SupportKind::ALL
            .into_iter()
            .find(|k| k.keyword() == keyword)
            .ok_or_else(|| {
                BeamError::invalid_input("support", s, "expected one of pin, roller, hinge, fixed")
            })
    }
}

impl<'de> Deserialize<'de> for SupportKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Point kinds
// ============================================================================

/// What a point is, once the beam has been segmented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    Continuity,
    Pin,
    Roller,
    Fixed,
    Hinge,
}

impl PointKind {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            PointKind::Continuity => "Continuity point",
            PointKind::Pin => "Pinned Support",
            PointKind::Roller => "Roller",
            PointKind::Fixed => "Fixed",
            PointKind::Hinge => "Hinge",
        }
    }

    /// Develops a vertical reaction force
    pub fn has_reaction_force(&self) -> bool {
        matches!(self, PointKind::Pin | PointKind::Roller | PointKind::Fixed)
    }

    /// Develops a reaction moment
    pub fn has_reaction_moment(&self) -> bool {
        matches!(self, PointKind::Fixed)
    }

    /// Planar degrees of freedom removed by the point (axial included)
    pub fn fixed_dof(&self) -> usize {
        match self {
            PointKind::Continuity | PointKind::Hinge => 0,
            PointKind::Roller => 1,
            PointKind::Pin => 2,
            PointKind::Fixed => 3,
        }
    }

    /// Whether a spring of `kind` can act alongside this point's restraint
    pub fn accepts_spring(&self, kind: SpringKind) -> bool {
        match kind {
            SpringKind::Transverse => !self.has_reaction_force(),
            SpringKind::Rotational => !matches!(self, PointKind::Fixed | PointKind::Hinge),
        }
    }
}

impl From<SupportKind> for PointKind {
    fn from(kind: SupportKind) -> Self {
        match kind {
            SupportKind::Pin => PointKind::Pin,
            SupportKind::Roller => PointKind::Roller,
            SupportKind::Hinge => PointKind::Hinge,
            SupportKind::Fixed => PointKind::Fixed,
        }
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Point
// ============================================================================

/// A critical coordinate of a segmented beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x_coord: Expression,
    pub kind: PointKind,
    /// Sum of applied point loads
    pub external_force: Expression,
    /// Sum of applied point moments
    pub external_moment: Expression,
    pub reaction_force: Expression,
    pub reaction_moment: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transverse_spring_stiffness: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational_spring_stiffness: Option<Expression>,
}

impl Point {
    pub fn new(x_coord: Expression, kind: PointKind) -> Self {
        Point {
            x_coord,
            kind,
            external_force: Expression::zero(),
            external_moment: Expression::zero(),
            reaction_force: Expression::zero(),
            reaction_moment: Expression::zero(),
            transverse_spring_stiffness: None,
            rotational_spring_stiffness: None,
        }
    }

    pub fn spring_stiffness(&self, kind: SpringKind) -> Option<&Expression> {
        match kind {
            SpringKind::Transverse => self.transverse_spring_stiffness.as_ref(),
            SpringKind::Rotational => self.rotational_spring_stiffness.as_ref(),
        }
    }

    /// Add a spring; springs of one kind at one point act in parallel.
    pub fn attach_spring(&mut self, kind: SpringKind, stiffness: &Expression) -> BeamResult<()> {
        if !self.kind.accepts_spring(kind) {
            return Err(BeamError::support_conflict(&self.x_coord, kind.display_name(), self.kind.name()));
        }
        let slot = match kind {
            SpringKind::Transverse => &mut self.transverse_spring_stiffness,
            SpringKind::Rotational => &mut self.rotational_spring_stiffness,
        };
        *slot = Some(match slot.take() {
            Some(existing) => existing + stiffness,
            None => stiffness.clone(),
        });
        Ok(())
    }

    pub fn has_springs(&self) -> bool {
        self.transverse_spring_stiffness.is_some() || self.rotational_spring_stiffness.is_some()
    }

    /// A reaction force is unknown here (rigid restraint or spring)
    pub fn has_force_unknown(&self) -> bool {
        self.kind.has_reaction_force() || self.transverse_spring_stiffness.is_some()
    }

    /// A reaction moment is unknown here (rigid restraint or spring)
    pub fn has_moment_unknown(&self) -> bool {
        self.kind.has_reaction_moment() || self.rotational_spring_stiffness.is_some()
    }

    /// Total vertical force acting at the point
    pub fn total_force(&self) -> Expression {
        &self.external_force + &self.reaction_force
    }

    /// Total moment acting at the point
    pub fn total_moment(&self) -> Expression {
        &self.external_moment + &self.reaction_moment
    }

    /// Kinematic conditions imposed on the adjacent segments.
    ///
    /// Each returned expression must vanish. `left` ends at this point and
    /// `right` starts at it; at least one of them must be present.
    pub fn boundary_conditions(&self, left: Option<&Segment>, right: Option<&Segment>) -> BeamResult<Vec<Expression>> {
        let x = &self.x_coord;
        let adjacent = left
            .or(right)
            .ok_or_else(|| BeamError::internal(format!("point at x = {} has no adjacent segment", x)))?;

        let mut conditions = Vec::new();
        let continuous_deflection = |conditions: &mut Vec<Expression>| -> BeamResult<()> {
            if let (Some(l), Some(r)) = (left, right) {
                conditions.push(l.deflection.subs_x(x)? - r.deflection.subs_x(x)?);
            }
            Ok(())
        };
        let continuous_rotation = |conditions: &mut Vec<Expression>| -> BeamResult<()> {
            if let (Some(l), Some(r)) = (left, right) {
                conditions.push(l.rotation.subs_x(x)? - r.rotation.subs_x(x)?);
            }
            Ok(())
        };

        match self.kind {
            PointKind::Continuity => {
                continuous_deflection(&mut conditions)?;
                continuous_rotation(&mut conditions)?;
            }
            PointKind::Pin | PointKind::Roller => {
                conditions.push(adjacent.deflection.subs_x(x)?);
                continuous_deflection(&mut conditions)?;
                continuous_rotation(&mut conditions)?;
            }
            PointKind::Fixed => {
                conditions.push(adjacent.deflection.subs_x(x)?);
                continuous_deflection(&mut conditions)?;
                conditions.push(adjacent.rotation.subs_x(x)?);
                continuous_rotation(&mut conditions)?;
            }
            PointKind::Hinge => {
                continuous_deflection(&mut conditions)?;
            }
        }
        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_kind_parsing() {
        assert_eq!("Pin".parse::<SupportKind>().unwrap(), SupportKind::Pin);
        assert_eq!(" FIXED ".parse::<SupportKind>().unwrap(), SupportKind::Fixed);
        assert_eq!(SupportKind::Pin.to_string(), "Pinned Support");
        let err = "clamp".parse::<SupportKind>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_point_kind_table() {
        let dof: usize = [PointKind::Pin, PointKind::Roller].iter().map(PointKind::fixed_dof).sum();
        assert_eq!(dof, 3);
        assert!(PointKind::Fixed.has_reaction_moment());
        assert!(!PointKind::Hinge.has_reaction_force());
        assert_eq!(PointKind::Continuity.name(), "Continuity point");
    }

    #[test]
    fn test_spring_conflicts() {
        let mut roller = Point::new(Expression::symbol("L"), PointKind::Roller);
        let err = roller
            .attach_spring(SpringKind::Transverse, &Expression::symbol("k"))
            .unwrap_err();
        assert!(matches!(err, BeamError::SupportConflict { .. }));
        roller
            .attach_spring(SpringKind::Rotational, &Expression::symbol("k"))
            .unwrap();

        let mut hinge = Point::new(Expression::symbol("L"), PointKind::Hinge);
        assert!(hinge
            .attach_spring(SpringKind::Rotational, &Expression::symbol("k"))
            .is_err());
        assert!(hinge
            .attach_spring(SpringKind::Transverse, &Expression::symbol("k"))
            .is_ok());
    }

    #[test]
    fn test_parallel_springs_add() {
        let mut point = Point::new(Expression::zero(), PointKind::Continuity);
        point.attach_spring(SpringKind::Transverse, &Expression::symbol("k")).unwrap();
        point.attach_spring(SpringKind::Transverse, &Expression::symbol("k")).unwrap();
        assert_eq!(
            point.transverse_spring_stiffness.as_ref().unwrap(),
            &"2*k".parse::<Expression>().unwrap()
        );
        assert!(point.has_force_unknown());
        assert!(!point.has_moment_unknown());
    }
}
