//! Concentrated actions and springs
//!
//! Point loads, point moments and springs all act at a single coordinate.
//! Several of them may share a coordinate; segmentation accumulates them
//! onto one point.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbolic::Expression;

// ============================================================================
// Point actions
// ============================================================================

/// Concentrated force, positive upward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub x_coord: Expression,
    pub magnitude: Expression,
}

impl PointLoad {
    pub fn new(x_coord: Expression, magnitude: Expression) -> Self {
        PointLoad { x_coord, magnitude }
    }
}

/// Concentrated moment, positive counter-clockwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMoment {
    pub x_coord: Expression,
    pub magnitude: Expression,
}

impl PointMoment {
    pub fn new(x_coord: Expression, magnitude: Expression) -> Self {
        PointMoment { x_coord, magnitude }
    }
}

// ============================================================================
// Springs
// ============================================================================

/// Which displacement a spring resists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringKind {
    /// Reaction force = -k * deflection
    Transverse,
    /// Reaction moment = -k * rotation
    Rotational,
}

impl SpringKind {
    /// Get display name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            SpringKind::Transverse => "transverse",
            SpringKind::Rotational => "rotational",
        }
    }
}

impl fmt::Display for SpringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Elastic restraint at a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub kind: SpringKind,
    pub x_coord: Expression,
    pub stiffness: Expression,
}

impl Spring {
    pub fn new(kind: SpringKind, x_coord: Expression, stiffness: Expression) -> Self {
        Spring {
            kind,
            x_coord,
            stiffness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_kind_serialization() {
        let json = serde_json::to_string(&SpringKind::Rotational).unwrap();
        assert_eq!(json, "\"rotational\"");
        assert_eq!(SpringKind::Transverse.to_string(), "transverse");
    }

    #[test]
    fn test_point_load_serializes_expressions_as_text() {
        let load = PointLoad::new("L/2".parse().unwrap(), "-P".parse().unwrap());
        let json = serde_json::to_string(&load).unwrap();
        assert_eq!(json, r#"{"x_coord":"L/2","magnitude":"-P"}"#);
        let back: PointLoad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, load);
    }
}
