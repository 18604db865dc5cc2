//! # Beam Model and Solver
//!
//! [`Beam`] collects supports, loads, springs and property spans through
//! builder calls, then [`Beam::solve`] runs the fixed pipeline:
//!
//! ```text
//! validation -> segmentation -> equilibrium -> internal loads -> deflection
//! ```
//!
//! Without springs the reactions follow from equilibrium alone and the
//! deflection stage only has to fix integration constants. With springs the
//! reactions depend on the deflections, so both are solved together in one
//! linear system (coupled mode).
//!
//! Coordinates, magnitudes and properties accept anything implementing
//! [`IntoExpression`]: text such as `"L/2"`, integers, floats or prebuilt
//! expressions. At most one free symbol may appear across the length,
//! origin and all coordinates.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::beam::Beam;
//! use beam_core::point::SupportKind;
//! use beam_core::symbolic::Expression;
//!
//! let mut beam = Beam::new("L").unwrap();
//! beam.add_support(0, SupportKind::Fixed)
//!     .unwrap()
//!     .add_point_load("L", "-P")
//!     .unwrap();
//! beam.solve().unwrap();
//!
//! let expected: Expression = "-L*P + P*x".parse().unwrap();
//! assert_eq!(beam.segments()[0].bending_moment, expected);
//! ```

mod deflection;
mod equilibrium;
mod geometry;
mod internal_loads;
mod segment;
mod segmentation;


pub use segment::{Quantity, Segment};

use log::{debug, info};

use crate::errors::{BeamError, BeamResult};
use crate::loads::{DistributedLoad, PointLoad, PointMoment, Property, PropertySpan, Spring, SpringKind};
use crate::point::{Point, PointKind, SupportKind};
use crate::symbolic::{Bindings, Expression, IntoExpression};

/// Coordinates closer than this (in normalized length units) coincide
pub const TOLERANCE: f64 = 1e-6;

/// A one-dimensional beam and, once solved, its response.
#[derive(Debug, Clone)]
pub struct Beam {
    length: Expression,
    origin: Expression,
    supports: Vec<(Expression, SupportKind)>,
    point_loads: Vec<PointLoad>,
    point_moments: Vec<PointMoment>,
    distributed_loads: Vec<DistributedLoad>,
    young: Vec<PropertySpan>,
    inertia: Vec<PropertySpan>,
    young_is_default: bool,
    inertia_is_default: bool,
    springs: Vec<Spring>,
    points: Vec<Point>,
    segments: Vec<Segment>,
    solved: bool,
}

impl Beam {
    /// Beam of the given length starting at `x = 0`
    pub fn new(length: impl IntoExpression) -> BeamResult<Self> {
        Self::with_origin(length, 0)
    }

    /// Beam of the given length starting at `origin`
    pub fn with_origin(length: impl IntoExpression, origin: impl IntoExpression) -> BeamResult<Self> {
        let length = coordinate("length", length)?;
        let origin = coordinate("origin", origin)?;
        if preliminary_value(&length)? <= TOLERANCE {
            return Err(BeamError::geometry(format!("beam length {} must be positive", length)));
        }

        let end = &origin + &length;
        let default_span = |property: Property| {
            PropertySpan::new(
                origin.clone(),
                end.clone(),
                Expression::symbol(property.default_symbol()),
            )
        };
        Ok(Beam {
            young: vec![default_span(Property::Young)],
            inertia: vec![default_span(Property::Inertia)],
            length,
            origin,
            supports: Vec::new(),
            point_loads: Vec::new(),
            point_moments: Vec::new(),
            distributed_loads: Vec::new(),
            young_is_default: true,
            inertia_is_default: true,
            springs: Vec::new(),
            points: Vec::new(),
            segments: Vec::new(),
            solved: false,
        })
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Place a support. Two supports cannot share a coordinate.
    pub fn add_support(&mut self, x: impl IntoExpression, kind: SupportKind) -> BeamResult<&mut Self> {
        let x = coordinate("support", x)?;
        let at = preliminary_value(&x)?;
        for (existing, existing_kind) in &self.supports {
            if (preliminary_value(existing)? - at).abs() < TOLERANCE {
                return Err(BeamError::geometry(format!(
                    "{} at x = {} coincides with the {} at x = {}",
                    kind, x, existing_kind, existing
                )));
            }
        }
        let point_kind = PointKind::from(kind);
        for spring in &self.springs {
            if (preliminary_value(&spring.x_coord)? - at).abs() < TOLERANCE && !point_kind.accepts_spring(spring.kind) {
                return Err(BeamError::support_conflict(&x, spring.kind.display_name(), point_kind.name()));
            }
        }
        self.supports.push((x, kind));
        self.invalidate();
        Ok(self)
    }

    pub fn add_point_load(&mut self, x: impl IntoExpression, magnitude: impl IntoExpression) -> BeamResult<&mut Self> {
        let x = coordinate("point load", x)?;
        let magnitude = magnitude.into_expression()?;
        self.point_loads.push(PointLoad::new(x, magnitude));
        self.invalidate();
        Ok(self)
    }

    pub fn add_point_moment(&mut self, x: impl IntoExpression, magnitude: impl IntoExpression) -> BeamResult<&mut Self> {
        let x = coordinate("point moment", x)?;
        let magnitude = magnitude.into_expression()?;
        self.point_moments.push(PointMoment::new(x, magnitude));
        self.invalidate();
        Ok(self)
    }

    /// Distributed load `expression(x)` over `[x_start, x_end]`
    pub fn add_distributed_load(
        &mut self,
        x_start: impl IntoExpression,
        x_end: impl IntoExpression,
        expression: impl IntoExpression,
    ) -> BeamResult<&mut Self> {
        let x_start = coordinate("distributed load start", x_start)?;
        let x_end = coordinate("distributed load end", x_end)?;
        check_span("distributed load", &x_start, &x_end)?;
        let load = DistributedLoad::new(x_start, x_end, expression.into_expression()?)?;
        debug!("distributed load {} has resultant {}", load.expression, load.magnitude());
        self.distributed_loads.push(load);
        self.invalidate();
        Ok(self)
    }

    /// Young's modulus over `[x_start, x_end]`; the first call drops the default `E`
    pub fn set_young(
        &mut self,
        x_start: impl IntoExpression,
        x_end: impl IntoExpression,
        value: impl IntoExpression,
    ) -> BeamResult<&mut Self> {
        self.set_property(Property::Young, x_start.into_expression()?, x_end.into_expression()?, value)
    }

    /// Second moment of area over `[x_start, x_end]`; the first call drops the default `I`
    pub fn set_inertia(
        &mut self,
        x_start: impl IntoExpression,
        x_end: impl IntoExpression,
        value: impl IntoExpression,
    ) -> BeamResult<&mut Self> {
        self.set_property(Property::Inertia, x_start.into_expression()?, x_end.into_expression()?, value)
    }

    fn set_property(
        &mut self,
        property: Property,
        x_start: Expression,
        x_end: Expression,
        value: impl IntoExpression,
    ) -> BeamResult<&mut Self> {
        let x_start = coordinate(property.display_name(), x_start)?;
        let x_end = coordinate(property.display_name(), x_end)?;
        check_span(property.display_name(), &x_start, &x_end)?;
        let value = value.into_expression()?;
        if value.depends_on_x() {
            return Err(BeamError::invalid_input(
                property.display_name(),
                value.to_string(),
                "properties are constant over each span",
            ));
        }

        let (spans, is_default) = match property {
            Property::Young => (&mut self.young, &mut self.young_is_default),
            Property::Inertia => (&mut self.inertia, &mut self.inertia_is_default),
        };
        if *is_default {
            spans.clear();
            *is_default = false;
        }
        spans.push(PropertySpan::new(x_start, x_end, value));
        self.invalidate();
        Ok(self)
    }

    /// Transverse spring of stiffness `stiffness` (force per deflection)
    pub fn add_transverse_spring(&mut self, x: impl IntoExpression, stiffness: impl IntoExpression) -> BeamResult<&mut Self> {
        self.add_spring(SpringKind::Transverse, x, stiffness)
    }

    /// Rotational spring of stiffness `stiffness` (moment per rotation)
    pub fn add_rotational_spring(&mut self, x: impl IntoExpression, stiffness: impl IntoExpression) -> BeamResult<&mut Self> {
        self.add_spring(SpringKind::Rotational, x, stiffness)
    }

    fn add_spring(
        &mut self,
        kind: SpringKind,
        x: impl IntoExpression,
        stiffness: impl IntoExpression,
    ) -> BeamResult<&mut Self> {
        let x = coordinate("spring", x)?;
        let stiffness = stiffness.into_expression()?;
        let at = preliminary_value(&x)?;
        for (support, support_kind) in &self.supports {
            let point_kind = PointKind::from(*support_kind);
            if (preliminary_value(support)? - at).abs() < TOLERANCE && !point_kind.accepts_spring(kind) {
                return Err(BeamError::support_conflict(&x, kind.display_name(), point_kind.name()));
            }
        }
        self.springs.push(Spring::new(kind, x, stiffness));
        self.invalidate();
        Ok(self)
    }

    fn invalidate(&mut self) {
        self.points.clear();
        self.segments.clear();
        self.solved = false;
    }

    // =========================================================================
    // Solve
    // =========================================================================

    /// Run the full pipeline.
    ///
    /// On failure the beam keeps no points or segments.
    pub fn solve(&mut self) -> BeamResult<()> {
        self.invalidate();
        info!("solving beam of length {} from x = {}", self.length, self.origin);

        let frame = geometry::validate(self)?;
        let (mut points, mut segments) = segmentation::segment(self, &frame)?;
        debug!("{} points, {} segments", points.len(), segments.len());

        if points.iter().any(Point::has_springs) {
            debug!("springs present, solving reactions and deflections together");
            deflection::solve_coupled(&mut points, &mut segments)?;
        } else {
            equilibrium::solve_reactions(&mut points, &segments)?;
            internal_loads::integrate(&points, &mut segments)?;
            deflection::solve_rigid(&points, &mut segments)?;
        }

        self.points = points;
        self.segments = segments;
        self.solved = true;
        info!("beam solved");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn length(&self) -> &Expression {
        &self.length
    }

    pub fn origin(&self) -> &Expression {
        &self.origin
    }

    /// `origin + length`
    pub fn end(&self) -> Expression {
        &self.origin + &self.length
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Points of the last successful solve, ordered along the axis
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Segments of the last successful solve, ordered along the axis
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn supports(&self) -> &[(Expression, SupportKind)] {
        &self.supports
    }

    pub fn point_loads(&self) -> &[PointLoad] {
        &self.point_loads
    }

    pub fn point_moments(&self) -> &[PointMoment] {
        &self.point_moments
    }

    pub fn distributed_loads(&self) -> &[DistributedLoad] {
        &self.distributed_loads
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn property_spans(&self, property: Property) -> &[PropertySpan] {
        match property {
            Property::Young => &self.young,
            Property::Inertia => &self.inertia,
        }
    }

    /// Segment containing `x` (the left one at a shared boundary)
    pub fn segment_at(&self, x: f64, bindings: &Bindings) -> BeamResult<Option<&Segment>> {
        for segment in &self.segments {
            let (start, end) = segment.bounds(bindings)?;
            if x >= start - TOLERANCE && x <= end + TOLERANCE {
                return Ok(Some(segment));
            }
        }
        Ok(None)
    }
}

/// Parse a coordinate and reject the position variable in it
fn coordinate(field: &str, value: impl IntoExpression) -> BeamResult<Expression> {
    let value = value.into_expression()?;
    if value.depends_on_x() || value.contains_unknowns() {
        return Err(BeamError::geometry(format!(
            "{} coordinate {} cannot depend on the position variable",
            field, value
        )));
    }
    Ok(value)
}

/// Numeric value with every symbol set to one, for add-time checks
fn preliminary_value(value: &Expression) -> BeamResult<f64> {
    Ok(value.evaluate(&Bindings::new().with_default(1.0))?)
}

fn check_span(field: &str, x_start: &Expression, x_end: &Expression) -> BeamResult<()> {
    if preliminary_value(x_end)? - preliminary_value(x_start)? <= TOLERANCE {
        return Err(BeamError::geometry(format!(
            "{} span [{}, {}] is degenerate or inverted",
            field, x_start, x_end
        )));
    }
    Ok(())
}
