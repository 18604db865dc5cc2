//! Shear force and bending moment by integration along the beam.
//!
//! A left-to-right fold: each segment integrates `V' = -q` and `M' = -V`
//! from the values left behind by the previous segment, then hands on the
//! values just past its end point.

use log::debug;

use super::Segment;
use crate::errors::{BeamError, BeamResult};
use crate::point::Point;
use crate::symbolic::Expression;

/// Antiderivative of `integrand` anchored to `value` at `x_start`
fn anchored_integral(integrand: &Expression, x_start: &Expression, value: &Expression) -> BeamResult<Expression> {
    let antiderivative = integrand.integrate()?;
    let offset = antiderivative.subs_x(x_start)?;
    Ok(antiderivative - offset + value)
}

/// Fill in `shear_force` and `bending_moment` of every segment.
///
/// Reactions may still be unknown symbols; they are carried through.
pub(super) fn integrate(points: &[Point], segments: &mut [Segment]) -> BeamResult<()> {
    let first = points
        .first()
        .ok_or_else(|| BeamError::internal("beam has no points"))?;
    if points.len() != segments.len() + 1 {
        return Err(BeamError::internal(format!(
            "{} points cannot bound {} segments",
            points.len(),
            segments.len()
        )));
    }

    let mut shear_left = -first.total_force();
    let mut moment_left = -first.total_moment();

    for (segment, end) in segments.iter_mut().zip(&points[1..]) {
        let load = -&segment.distributed_load.expression;
        segment.shear_force = anchored_integral(&load, &segment.x_start, &shear_left)?;
        segment.bending_moment = anchored_integral(&-&segment.shear_force, &segment.x_start, &moment_left)?;
        debug!(
            "segment [{}, {}]: V = {}, M = {}",
            segment.x_start, segment.x_end, segment.shear_force, segment.bending_moment
        );

        shear_left = segment.shear_force.subs_x(&segment.x_end)? - end.total_force();
        moment_left = segment.bending_moment.subs_x(&segment.x_end)? - end.total_moment();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::DistributedLoad;
    use crate::point::PointKind;

    fn expr(s: &str) -> Expression {
        s.parse().unwrap()
    }

    #[test]
    fn test_cantilever_tip_load() {
        let mut points = vec![
            Point::new(expr("0"), PointKind::Fixed),
            Point::new(expr("L"), PointKind::Continuity),
        ];
        points[0].reaction_force = expr("P");
        points[0].reaction_moment = expr("L*P");
        points[1].external_force = expr("-P");
        let mut segments = vec![Segment::new(
            expr("0"),
            expr("L"),
            expr("E"),
            expr("I"),
            DistributedLoad::zero(expr("0"), expr("L")),
        )];

        integrate(&points, &mut segments).unwrap();
        assert_eq!(segments[0].shear_force, expr("-P"));
        assert_eq!(segments[0].bending_moment, expr("-L*P + P*x"));
    }

    #[test]
    fn test_values_at_segment_start_match_left_side() {
        let mut points = vec![
            Point::new(expr("0"), PointKind::Pin),
            Point::new(expr("2"), PointKind::Continuity),
            Point::new(expr("4"), PointKind::Roller),
        ];
        points[0].reaction_force = expr("q*2");
        points[2].reaction_force = expr("q*2");
        let mut segments = vec![
            Segment::new(
                expr("0"),
                expr("2"),
                expr("E"),
                expr("I"),
                DistributedLoad::new(expr("0"), expr("2"), expr("-q")).unwrap(),
            ),
            Segment::new(
                expr("2"),
                expr("4"),
                expr("E"),
                expr("I"),
                DistributedLoad::new(expr("2"), expr("4"), expr("-q")).unwrap(),
            ),
        ];

        integrate(&points, &mut segments).unwrap();
        let v0 = segments[0].shear_force.subs_x(&expr("2")).unwrap();
        let v1 = segments[1].shear_force.subs_x(&expr("2")).unwrap();
        assert_eq!(v0, v1);
        assert_eq!(segments[1].bending_moment.subs_x(&expr("2")).unwrap(), expr("2*q"));
        assert!(segments[1].bending_moment.subs_x(&expr("4")).unwrap().is_zero());
    }
}
