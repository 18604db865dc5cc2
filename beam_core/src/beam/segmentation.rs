//! Split a beam into points and segments.
//!
//! Every coordinate that matters is gathered into one list of tagged
//! records, sorted by normalized value and deduplicated. Each surviving
//! record becomes a [`Point`]; each consecutive pair bounds a [`Segment`].

use log::{debug, warn};

use super::geometry::Frame;
use super::{Beam, Segment, TOLERANCE};
use crate::errors::{BeamError, BeamResult};
use crate::loads::{DistributedLoad, Property, PropertySpan};
use crate::point::{Point, PointKind};
use crate::symbolic::Expression;

/// Where a coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CoordinateKind {
    PropertyBoundary,
    Support,
    PointLoad,
    PointMoment,
    DistributedLoadBoundary,
    Spring,
}

#[derive(Debug, Clone)]
pub(super) struct CoordinateRecord {
    pub value: f64,
    pub symbolic: Expression,
    pub kind: CoordinateKind,
}

fn collect(beam: &Beam, frame: &Frame) -> BeamResult<Vec<CoordinateRecord>> {
    let mut records = Vec::new();
    let mut push = |x: &Expression, kind: CoordinateKind| -> BeamResult<()> {
        records.push(CoordinateRecord {
            value: frame.normalize(x)?,
            symbolic: x.clone(),
            kind,
        });
        Ok(())
    };

    for property in [Property::Young, Property::Inertia] {
        for span in beam.property_spans(property) {
            push(&span.x_start, CoordinateKind::PropertyBoundary)?;
            push(&span.x_end, CoordinateKind::PropertyBoundary)?;
        }
    }
    for (x, _) in beam.supports() {
        push(x, CoordinateKind::Support)?;
    }
    for load in beam.point_loads() {
        push(&load.x_coord, CoordinateKind::PointLoad)?;
    }
    for moment in beam.point_moments() {
        push(&moment.x_coord, CoordinateKind::PointMoment)?;
    }
    for load in beam.distributed_loads() {
        push(&load.x_start, CoordinateKind::DistributedLoadBoundary)?;
        push(&load.x_end, CoordinateKind::DistributedLoadBoundary)?;
    }
    for spring in beam.springs() {
        push(&spring.x_coord, CoordinateKind::Spring)?;
    }
    Ok(records)
}

/// Sorted, deduplicated critical coordinates.
///
/// The sort is stable, so among coincident records the first collected one
/// survives.
pub(super) fn critical_coordinates(beam: &Beam, frame: &Frame) -> BeamResult<Vec<CoordinateRecord>> {
    let mut records = collect(beam, frame)?;
    records.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut retained: Vec<CoordinateRecord> = Vec::with_capacity(records.len());
    for record in records {
        match retained.last() {
            Some(last) if record.value - last.value < TOLERANCE => {}
            _ => retained.push(record),
        }
    }

    let (first, last) = match (retained.first(), retained.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(BeamError::internal("beam has no critical coordinates")),
    };
    if (first.value - frame.origin).abs() > TOLERANCE || (last.value - frame.end).abs() > TOLERANCE {
        return Err(BeamError::internal(format!(
            "critical coordinates span [{}, {}] instead of the whole beam",
            first.symbolic, last.symbolic
        )));
    }
    Ok(retained)
}

/// Build the points and segments of `beam`.
pub(super) fn segment(beam: &Beam, frame: &Frame) -> BeamResult<(Vec<Point>, Vec<Segment>)> {
    let coordinates = critical_coordinates(beam, frame)?;
    debug!(
        "critical coordinates: {}",
        coordinates
            .iter()
            .map(|c| format!("{} ({:?})", c.symbolic, c.kind))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut points = Vec::with_capacity(coordinates.len());
    for record in &coordinates {
        points.push(build_point(beam, frame, record)?);
    }

    let mut segments = Vec::with_capacity(coordinates.len().saturating_sub(1));
    for pair in coordinates.windows(2) {
        segments.push(build_segment(beam, frame, &pair[0], &pair[1])?);
    }
    Ok((points, segments))
}

fn coincides(frame: &Frame, x: &Expression, value: f64) -> BeamResult<bool> {
    Ok((frame.normalize(x)? - value).abs() < TOLERANCE)
}

fn build_point(beam: &Beam, frame: &Frame, record: &CoordinateRecord) -> BeamResult<Point> {
    let mut kind = PointKind::Continuity;
    for (x, support) in beam.supports() {
        if coincides(frame, x, record.value)? {
            kind = PointKind::from(*support);
        }
    }
    let mut point = Point::new(record.symbolic.clone(), kind);

    for load in beam.point_loads() {
        if coincides(frame, &load.x_coord, record.value)? {
            point.external_force = &point.external_force + &load.magnitude;
        }
    }
    for moment in beam.point_moments() {
        if coincides(frame, &moment.x_coord, record.value)? {
            point.external_moment = &point.external_moment + &moment.magnitude;
        }
    }
    for spring in beam.springs() {
        if coincides(frame, &spring.x_coord, record.value)? {
            if point.spring_stiffness(spring.kind).is_some() {
                warn!(
                    "merging parallel {} springs at x = {}",
                    spring.kind, point.x_coord
                );
            }
            point.attach_spring(spring.kind, &spring.stiffness)?;
        }
    }
    Ok(point)
}

/// Value of the unique span containing `[start, end]`
fn resolve_property(
    frame: &Frame,
    property: Property,
    spans: &[PropertySpan],
    start: &CoordinateRecord,
    end: &CoordinateRecord,
) -> BeamResult<Expression> {
    for span in spans {
        if start.value >= frame.normalize(&span.x_start)? - TOLERANCE
            && end.value <= frame.normalize(&span.x_end)? + TOLERANCE
        {
            return Ok(span.value.clone());
        }
    }
    Err(BeamError::internal(format!(
        "no {} span contains the segment [{}, {}]",
        property.display_name(),
        start.symbolic,
        end.symbolic
    )))
}

fn build_segment(beam: &Beam, frame: &Frame, start: &CoordinateRecord, end: &CoordinateRecord) -> BeamResult<Segment> {
    let young = resolve_property(frame, Property::Young, beam.property_spans(Property::Young), start, end)?;
    let inertia = resolve_property(frame, Property::Inertia, beam.property_spans(Property::Inertia), start, end)?;

    let mut intensity = Expression::zero();
    for load in beam.distributed_loads() {
        if start.value >= frame.normalize(&load.x_start)? - TOLERANCE
            && end.value <= frame.normalize(&load.x_end)? + TOLERANCE
        {
            intensity = intensity + &load.expression;
        }
    }
    let distributed_load = if intensity.is_zero() {
        DistributedLoad::zero(start.symbolic.clone(), end.symbolic.clone())
    } else {
        DistributedLoad::new(start.symbolic.clone(), end.symbolic.clone(), intensity)?
    };

    Ok(Segment::new(
        start.symbolic.clone(),
        end.symbolic.clone(),
        young,
        inertia,
        distributed_load,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::geometry;
    use super::*;
    use crate::loads::SpringKind;
    use crate::point::SupportKind;

    fn expr(s: &str) -> Expression {
        s.parse().unwrap()
    }

    #[test]
    fn test_coincident_coordinates_merge() {
        let mut beam = Beam::new("L").unwrap();
        beam.add_support(0, SupportKind::Pin)
            .unwrap()
            .add_support("L", SupportKind::Roller)
            .unwrap()
            .add_point_load("L/2", "-P")
            .unwrap()
            .add_point_load("0.5*L", "-Q")
            .unwrap();
        let frame = geometry::validate(&beam).unwrap();
        let (points, segments) = segment(&beam, &frame).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(segments.len(), 2);
        assert_eq!(points[0].kind, PointKind::Pin);
        assert_eq!(points[1].kind, PointKind::Continuity);
        assert_eq!(points[1].x_coord, expr("L/2"));
        assert_eq!(points[1].external_force, expr("-P - Q"));
        assert_eq!(points[2].kind, PointKind::Roller);
        assert_eq!(segments[1].x_start, expr("L/2"));
        assert_eq!(segments[1].x_end, expr("L"));
    }

    #[test]
    fn test_distributed_loads_sum_per_segment() {
        let mut beam = Beam::new(6).unwrap();
        beam.add_distributed_load(0, 4, "-q")
            .unwrap()
            .add_distributed_load(2, 6, "-x")
            .unwrap();
        let frame = geometry::validate(&beam).unwrap();
        let (_, segments) = segment(&beam, &frame).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].distributed_load.expression, expr("-q"));
        assert_eq!(segments[1].distributed_load.expression, expr("-q - x"));
        assert_eq!(segments[2].distributed_load.expression, expr("-x"));
        assert_eq!(segments[1].distributed_load.magnitude(), &expr("-2*q - 6"));
    }

    #[test]
    fn test_properties_resolved_per_segment() {
        let mut beam = Beam::new(3).unwrap();
        beam.set_young(0, 1.5, "E/1000")
            .unwrap()
            .set_young(1.5, 3, "E")
            .unwrap()
            .set_inertia(0, 1, "I")
            .unwrap()
            .set_inertia(1, 3, "100*I")
            .unwrap();
        let frame = geometry::validate(&beam).unwrap();
        let (points, segments) = segment(&beam, &frame).unwrap();

        assert_eq!(points.len(), 4);
        assert_eq!(segments[0].flexural_rigidity(), expr("E*I/1000"));
        assert_eq!(segments[1].flexural_rigidity(), expr("E*I/10"));
        assert_eq!(segments[2].flexural_rigidity(), expr("100*E*I"));
    }

    #[test]
    fn test_springs_attached_to_points() {
        let mut beam = Beam::new("L").unwrap();
        beam.add_transverse_spring(0, "k")
            .unwrap()
            .add_transverse_spring(0, "k")
            .unwrap()
            .add_rotational_spring(0, "c")
            .unwrap();
        let frame = geometry::validate(&beam).unwrap();
        let (points, _) = segment(&beam, &frame).unwrap();

        assert_eq!(points[0].spring_stiffness(SpringKind::Transverse), Some(&expr("2*k")));
        assert_eq!(points[0].spring_stiffness(SpringKind::Rotational), Some(&expr("c")));
        assert!(points[1].spring_stiffness(SpringKind::Transverse).is_none());
    }
}
