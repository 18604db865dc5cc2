//! # Solved Beam Results
//!
//! [`BeamSolution`] is a serializable snapshot of a solved [`Beam`]: every
//! point with its reactions, every segment with its closed-form response
//! curves. Expressions serialize as their display strings, so the JSON reads
//! like the formulas a hand calculation would produce.
//!
//! Numeric diagrams are produced on demand from [`Bindings`]:
//!
//! ```rust
//! use beam_core::beam::{Beam, Quantity};
//! use beam_core::point::SupportKind;
//! use beam_core::symbolic::Bindings;
//!
//! let mut beam = Beam::new(4).unwrap();
//! beam.add_support(0, SupportKind::Fixed).unwrap().add_point_load(4, -1).unwrap();
//! beam.solve().unwrap();
//!
//! let solution = beam.solution().unwrap();
//! let bindings = Bindings::new().with("E", 1.0).with("I", 1.0);
//! let peak = solution.extreme(Quantity::BendingMoment, &bindings, 20).unwrap().unwrap();
//! assert_eq!(peak.value, -4.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::beam::{Beam, Quantity, Segment};
use crate::errors::BeamResult;
use crate::point::{Point, PointKind};
use crate::symbolic::{Bindings, Expression};

/// Reaction developed at one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub x_coord: Expression,
    pub kind: PointKind,
    pub force: Expression,
    pub moment: Expression,
}

/// Largest-magnitude value of a sampled quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub quantity: Quantity,
    pub value: f64,
    pub position: f64,
    pub segment_index: usize,
}

/// Serializable view of a solved beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSolution {
    pub length: Expression,
    pub origin: Expression,
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
}

impl BeamSolution {
    /// Points that develop a reaction force or moment
    pub fn reactions(&self) -> Vec<Reaction> {
        self.points
            .iter()
            .filter(|p| p.has_force_unknown() || p.has_moment_unknown())
            .map(|p| Reaction {
                x_coord: p.x_coord.clone(),
                kind: p.kind,
                force: p.reaction_force.clone(),
                moment: p.reaction_moment.clone(),
            })
            .collect()
    }

    /// `(x, value)` pairs of `quantity`, `samples` per segment including both ends
    pub fn diagram(&self, quantity: Quantity, bindings: &Bindings, samples: usize) -> BeamResult<Vec<(f64, f64)>> {
        let samples = samples.max(2);
        let mut diagram = Vec::with_capacity(samples * self.segments.len());
        for segment in &self.segments {
            let (start, end) = segment.bounds(bindings)?;
            let step = (end - start) / (samples - 1) as f64;
            for k in 0..samples {
                let x = start + step * k as f64;
                diagram.push((x, segment.evaluate(quantity, x, bindings)?));
            }
        }
        Ok(diagram)
    }

    /// Sampled extreme of `quantity` over the whole beam (`None` without segments)
    pub fn extreme(&self, quantity: Quantity, bindings: &Bindings, samples: usize) -> BeamResult<Option<Extreme>> {
        let samples = samples.max(2);
        let mut best: Option<Extreme> = None;
        for (segment_index, segment) in self.segments.iter().enumerate() {
            let (start, end) = segment.bounds(bindings)?;
            let step = (end - start) / (samples - 1) as f64;
            for k in 0..samples {
                let position = start + step * k as f64;
                let value = segment.evaluate(quantity, position, bindings)?;
                if best.map_or(true, |b| value.abs() > b.value.abs()) {
                    best = Some(Extreme {
                        quantity,
                        value,
                        position,
                        segment_index,
                    });
                }
            }
        }
        Ok(best)
    }
}

impl Beam {
    /// Snapshot of the last successful solve
    pub fn solution(&self) -> Option<BeamSolution> {
        if !self.is_solved() {
            return None;
        }
        Some(BeamSolution {
            length: self.length().clone(),
            origin: self.origin().clone(),
            points: self.points().to_vec(),
            segments: self.segments().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::SupportKind;
    use approx::assert_relative_eq;

    fn solved_simple_beam() -> Beam {
        let mut beam = Beam::new("L").unwrap();
        beam.add_support(0, SupportKind::Pin)
            .unwrap()
            .add_support("L", SupportKind::Roller)
            .unwrap()
            .add_distributed_load(0, "L", "-q")
            .unwrap();
        beam.solve().unwrap();
        beam
    }

    #[test]
    fn test_unsolved_beam_has_no_solution() {
        let beam = Beam::new("L").unwrap();
        assert!(beam.solution().is_none());
    }

    #[test]
    fn test_reactions_listed_for_supports() {
        let solution = solved_simple_beam().solution().unwrap();
        let reactions = solution.reactions();
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].kind, PointKind::Pin);
        assert_eq!(reactions[1].force, "L*q/2".parse().unwrap());
    }

    #[test]
    fn test_extreme_deflection() {
        let solution = solved_simple_beam().solution().unwrap();
        let bindings = Bindings::new()
            .with("L", 2.0)
            .with("q", 3.0)
            .with("E", 4.0)
            .with("I", 5.0);
        let peak = solution
            .extreme(Quantity::Deflection, &bindings, 11)
            .unwrap()
            .unwrap();
        assert_relative_eq!(peak.position, 1.0, epsilon = 1e-12);
        assert_relative_eq!(peak.value, -5.0 * 3.0 * 16.0 / (384.0 * 20.0), max_relative = 1e-12);

        let diagram = solution.diagram(Quantity::ShearForce, &bindings, 5).unwrap();
        assert_eq!(diagram.len(), 5);
        assert_relative_eq!(diagram[0].1, -3.0, epsilon = 1e-12);
        assert_relative_eq!(diagram[4].1, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solution_serializes_formulas() {
        let solution = solved_simple_beam().solution().unwrap();
        let json = serde_json::to_string(&solution).unwrap();
        assert!(json.contains("\"kind\":\"Pin\""));
        let back: BeamSolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, solution);
    }
}
