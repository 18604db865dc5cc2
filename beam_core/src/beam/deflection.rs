//! Rotation and deflection from the curvature `M / (E*I)`.
//!
//! Each segment gets two integration constants. They are fixed by the
//! kinematic conditions at the points and, when springs are present, solved
//! together with the reactions.

use log::debug;

use super::{equilibrium, internal_loads, Segment};
use crate::errors::{BeamError, BeamResult, DeterminacyKind};
use crate::loads::SpringKind;
use crate::point::Point;
use crate::symbolic::{Atom, Expression, Solution};

/// Integrate curvature twice per segment, returning the new constants
pub(super) fn integrate_curvature(segments: &mut [Segment]) -> BeamResult<Vec<Atom>> {
    let mut constants = Vec::with_capacity(2 * segments.len());
    for (j, segment) in segments.iter_mut().enumerate() {
        let curvature = segment.bending_moment.checked_div(&segment.flexural_rigidity())?;
        let rotation_constant = Atom::unknown(format!("C{}", j));
        let deflection_constant = Atom::unknown(format!("D{}", j));

        segment.rotation = curvature.integrate()? + Expression::from_atom(rotation_constant.clone());
        segment.deflection = segment.rotation.integrate()? + Expression::from_atom(deflection_constant.clone());

        constants.push(rotation_constant);
        constants.push(deflection_constant);
    }
    Ok(constants)
}

/// Conditions of every point on its neighbouring segments
pub(super) fn boundary_equations(points: &[Point], segments: &[Segment]) -> BeamResult<Vec<Expression>> {
    let mut equations = Vec::new();
    for (i, point) in points.iter().enumerate() {
        let left = i.checked_sub(1).and_then(|j| segments.get(j));
        let right = segments.get(i);
        equations.extend(point.boundary_conditions(left, right)?);
    }
    Ok(equations)
}

/// `R + k_v * w = 0` and `M + k_θ * θ = 0` at every spring
pub(super) fn spring_equations(points: &[Point], segments: &[Segment]) -> BeamResult<Vec<Expression>> {
    let mut equations = Vec::new();
    for (i, point) in points.iter().enumerate() {
        if !point.has_springs() {
            continue;
        }
        let adjacent = i
            .checked_sub(1)
            .and_then(|j| segments.get(j))
            .or_else(|| segments.get(i))
            .ok_or_else(|| BeamError::internal(format!("spring at x = {} has no segment", point.x_coord)))?;

        if let Some(k) = point.spring_stiffness(SpringKind::Transverse) {
            let deflection = adjacent.deflection.subs_x(&point.x_coord)?;
            equations.push(&point.reaction_force + k * deflection);
        }
        if let Some(k) = point.spring_stiffness(SpringKind::Rotational) {
            let rotation = adjacent.rotation.subs_x(&point.x_coord)?;
            equations.push(&point.reaction_moment + k * rotation);
        }
    }
    Ok(equations)
}

fn apply_to_curves(solution: &Solution, segments: &mut [Segment]) -> BeamResult<()> {
    for segment in segments.iter_mut() {
        segment.rotation = solution.apply(&segment.rotation)?;
        segment.deflection = solution.apply(&segment.deflection)?;
    }
    Ok(())
}

/// Fix the integration constants of a beam whose reactions are known.
pub(super) fn solve_rigid(points: &[Point], segments: &mut [Segment]) -> BeamResult<()> {
    let constants = integrate_curvature(segments)?;
    let equations = boundary_equations(points, segments)?;
    debug!(
        "deflection: {} conditions, {} integration constants",
        equations.len(),
        constants.len()
    );

    let solution = equilibrium::solve(&equations, &constants)?;
    apply_to_curves(&solution, segments)
}

/// Solve reactions and integration constants together.
///
/// Used whenever a spring is present: the spring reactions depend on the
/// deflections, so equilibrium alone cannot find them.
pub(super) fn solve_coupled(points: &mut [Point], segments: &mut [Segment]) -> BeamResult<()> {
    let mut unknowns = equilibrium::assign_reaction_unknowns(points);
    internal_loads::integrate(points, segments)?;
    unknowns.extend(integrate_curvature(segments)?);

    let mut equations = equilibrium::equations(points, segments)?;
    equations.extend(boundary_equations(points, segments)?);
    equations.extend(spring_equations(points, segments)?);
    debug!(
        "coupled system: {} equations, {} unknowns",
        equations.len(),
        unknowns.len()
    );

    if unknowns.len() > equations.len() {
        return Err(BeamError::determinacy(
            DeterminacyKind::Indeterminate,
            equations.len(),
            unknowns.len(),
        ));
    }
    if unknowns.len() < equations.len() {
        return Err(BeamError::determinacy(
            DeterminacyKind::Understatic,
            equations.len(),
            unknowns.len(),
        ));
    }

    let solution = equilibrium::solve(&equations, &unknowns)?;
    for point in points.iter_mut() {
        point.reaction_force = solution.apply(&point.reaction_force)?;
        point.reaction_moment = solution.apply(&point.reaction_moment)?;
    }
    for segment in segments.iter_mut() {
        segment.shear_force = solution.apply(&segment.shear_force)?;
        segment.bending_moment = solution.apply(&segment.bending_moment)?;
    }
    apply_to_curves(&solution, segments)
}
