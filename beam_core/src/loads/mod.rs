//! Load and property primitives
//!
//! Everything a beam carries before it is segmented: concentrated loads
//! and moments, distributed loads, elastic springs, and the spans over
//! which Young's modulus and the second moment of area are defined.
//!
//! # Overview
//!
//! - [`PointLoad`] / [`PointMoment`] - concentrated actions at a coordinate
//! - [`DistributedLoad`] - a load expression in `x` over a span, with its
//!   resultant magnitude and centroid
//! - [`Spring`] - elastic restraint of a given [`SpringKind`]
//! - [`PropertySpan`] - value of a material or section property over a span
//!
//! # Example
//!
//! ```
//! use beam_core::loads::DistributedLoad;
//! use beam_core::symbolic::Expression;
//!
//! let q = DistributedLoad::new("0".parse().unwrap(), "L".parse().unwrap(), "-q".parse().unwrap())
//!     .unwrap();
//! assert_eq!(q.magnitude(), &"-L*q".parse::<Expression>().unwrap());
//! assert_eq!(q.centroid(), &"L/2".parse::<Expression>().unwrap());
//! ```

pub mod discrete;
pub mod distributed;

pub use discrete::{PointLoad, PointMoment, Spring, SpringKind};
pub use distributed::DistributedLoad;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbolic::Expression;

/// Beam properties defined piecewise along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Young,
    Inertia,
}

impl Property {
    /// Get display name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Property::Young => "Young's modulus",
            Property::Inertia => "inertia",
        }
    }

    /// Symbol used when no span has been set explicitly
    pub fn default_symbol(&self) -> &'static str {
        match self {
            Property::Young => "E",
            Property::Inertia => "I",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Value of a property over `[x_start, x_end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpan {
    pub x_start: Expression,
    pub x_end: Expression,
    pub value: Expression,
}

impl PropertySpan {
    pub fn new(x_start: Expression, x_end: Expression, value: Expression) -> Self {
        PropertySpan { x_start, x_end, value }
    }
}
