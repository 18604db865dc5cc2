//! Static equilibrium and determinacy.
//!
//! Equations are written as expressions that must vanish: vertical force
//! balance, moment balance about the beam origin, and one moment balance
//! about every hinge for the part of the beam to its right.

use log::debug;

use super::Segment;
use crate::errors::{BeamError, BeamResult, DeterminacyKind};
use crate::point::{Point, PointKind};
use crate::symbolic::{solve_linear_system, Atom, Expression, ExpressionError, Solution};

/// `ΣFy` of point forces and distributed-load resultants
pub(super) fn force_balance(points: &[Point], segments: &[Segment]) -> Expression {
    let point_forces: Expression = points.iter().map(Point::total_force).sum();
    let distributed: Expression = segments.iter().map(|s| s.distributed_load.magnitude()).sum();
    point_forces + distributed
}

/// `ΣM` about `reference`, counter-clockwise positive
pub(super) fn moment_balance(points: &[Point], segments: &[Segment], reference: &Expression) -> Expression {
    let point_moments: Expression = points
        .iter()
        .map(|p| p.total_moment() + p.total_force() * (&p.x_coord - reference))
        .sum();
    let distributed: Expression = segments
        .iter()
        .map(|s| s.distributed_load.moment_about(reference))
        .sum();
    point_moments + distributed
}

/// Global force and moment balance plus one moment release per hinge
pub(super) fn equations(points: &[Point], segments: &[Segment]) -> BeamResult<Vec<Expression>> {
    let origin = points
        .first()
        .map(|p| p.x_coord.clone())
        .ok_or_else(|| BeamError::internal("beam has no points"))?;

    let mut equations = vec![
        force_balance(points, segments),
        moment_balance(points, segments, &origin),
    ];
    for (i, point) in points.iter().enumerate() {
        if point.kind == PointKind::Hinge {
            // Moment of everything right of the hinge; segment i starts at it.
            let right_points = &points[i + 1..];
            let right_segments = segments.get(i..).unwrap_or(&[]);
            equations.push(moment_balance(right_points, right_segments, &point.x_coord));
        }
    }
    Ok(equations)
}

/// Replace every unknown reaction by an unknown symbol and return the unknowns
pub(super) fn assign_reaction_unknowns(points: &mut [Point]) -> Vec<Atom> {
    let mut unknowns = Vec::new();
    for (i, point) in points.iter_mut().enumerate() {
        if point.has_force_unknown() {
            let unknown = Atom::unknown(format!("R{}", i));
            point.reaction_force = Expression::from_atom(unknown.clone());
            unknowns.push(unknown);
        }
        if point.has_moment_unknown() {
            let unknown = Atom::unknown(format!("M{}", i));
            point.reaction_moment = Expression::from_atom(unknown.clone());
            unknowns.push(unknown);
        }
    }
    unknowns
}

/// Count restraints against equilibrium equations for a beam without springs
pub(super) fn check_rigid_determinacy(points: &[Point]) -> BeamResult<()> {
    let restrained: usize = points.iter().map(|p| p.kind.fixed_dof()).sum();
    let hinges = points.iter().filter(|p| p.kind == PointKind::Hinge).count();
    let required = 3 + hinges;
    debug!("{} restrained DOF, {} required", restrained, required);

    if restrained < required {
        Err(BeamError::determinacy(DeterminacyKind::Understatic, required, restrained))
    } else if restrained > required {
        Err(BeamError::determinacy(DeterminacyKind::Indeterminate, required, restrained))
    } else {
        Ok(())
    }
}

/// Solve `equations` for `unknowns`, translating algebra failures into beam errors
pub(super) fn solve(equations: &[Expression], unknowns: &[Atom]) -> BeamResult<Solution> {
    solve_linear_system(equations, unknowns).map_err(|err| match err {
        ExpressionError::Singular { unknowns } => BeamError::singular(unknowns),
        ExpressionError::CountMismatch { equations, unknowns } => BeamError::internal(format!(
            "assembled {} equations for {} unknowns",
            equations, unknowns
        )),
        other => BeamError::from(other),
    })
}

/// Solve the reactions of a beam without springs from equilibrium alone.
pub(super) fn solve_reactions(points: &mut [Point], segments: &[Segment]) -> BeamResult<()> {
    check_rigid_determinacy(points)?;
    let unknowns = assign_reaction_unknowns(points);
    let equations = equations(points, segments)?;
    debug!(
        "equilibrium: {} equations, {} reaction unknowns",
        equations.len(),
        unknowns.len()
    );

    let solution = solve(&equations, &unknowns)?;
    for point in points.iter_mut() {
        point.reaction_force = solution.apply(&point.reaction_force)?;
        point.reaction_moment = solution.apply(&point.reaction_moment)?;
    }
    Ok(())
}
