//! # Beam Input Documents
//!
//! [`BeamInput`] is the textual, JSON-serializable description of a beam.
//! Every coordinate and magnitude is a string parsed as an expression when
//! the beam is built, so a document can mix numbers and symbols:
//!
//! ```json
//! {
//!   "label": "B-1",
//!   "length": "L",
//!   "supports": [{ "x": "0", "kind": "pin" }, { "x": "L", "kind": "roller" }],
//!   "point_loads": [{ "x": "L/2", "magnitude": "-P" }]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beam_core::input::BeamInput;
//!
//! let json = r#"{
//!     "label": "B-1",
//!     "length": "L",
//!     "supports": [{ "x": "0", "kind": "fixed" }],
//!     "point_loads": [{ "x": "L", "magnitude": "-P" }]
//! }"#;
//! let input: BeamInput = serde_json::from_str(json).unwrap();
//! let mut beam = input.build().unwrap();
//! beam.solve().unwrap();
//! assert_eq!(beam.points()[0].reaction_force.to_string(), "P");
//! ```

use serde::{Deserialize, Serialize};

use crate::beam::Beam;
use crate::errors::{BeamError, BeamResult};
use crate::point::SupportKind;
use crate::symbolic::Bindings;

fn default_origin() -> String {
    "0".to_string()
}

/// Support placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportInput {
    pub x: String,
    pub kind: SupportKind,
}

/// Point load or point moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointActionInput {
    pub x: String,
    pub magnitude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoadInput {
    pub x_start: String,
    pub x_end: String,
    pub expression: String,
}

/// Value of Young's modulus or inertia over a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpanInput {
    pub x_start: String,
    pub x_end: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringInput {
    pub x: String,
    pub stiffness: String,
}

/// Textual description of a beam.
///
/// Empty `young`/`inertia` lists keep the default symbols `E` and `I` over
/// the whole beam. `bindings` are not used for solving; they give numeric
/// values for reports and diagrams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamInput {
    /// User label for this beam
    pub label: String,

    pub length: String,

    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default)]
    pub supports: Vec<SupportInput>,

    #[serde(default)]
    pub point_loads: Vec<PointActionInput>,

    #[serde(default)]
    pub point_moments: Vec<PointActionInput>,

    #[serde(default)]
    pub distributed_loads: Vec<DistributedLoadInput>,

    #[serde(default)]
    pub young: Vec<PropertySpanInput>,

    #[serde(default)]
    pub inertia: Vec<PropertySpanInput>,

    #[serde(default)]
    pub transverse_springs: Vec<SpringInput>,

    #[serde(default)]
    pub rotational_springs: Vec<SpringInput>,

    /// Numeric values for symbols, used when evaluating results
    #[serde(default)]
    pub bindings: Bindings,
}

impl BeamInput {
    /// An unloaded, unsupported beam
    pub fn new(label: impl Into<String>, length: impl Into<String>) -> Self {
        BeamInput {
            label: label.into(),
            length: length.into(),
            origin: default_origin(),
            supports: Vec::new(),
            point_loads: Vec::new(),
            point_moments: Vec::new(),
            distributed_loads: Vec::new(),
            young: Vec::new(),
            inertia: Vec::new(),
            transverse_springs: Vec::new(),
            rotational_springs: Vec::new(),
            bindings: Bindings::new(),
        }
    }

    /// Pin at the origin, roller at the far end
    pub fn simply_supported(label: impl Into<String>, length: impl Into<String>) -> Self {
        let mut input = Self::new(label, length);
        input.add_support("0", SupportKind::Pin);
        let end = input.length.clone();
        input.add_support(end, SupportKind::Roller);
        input
    }

    /// Fixed at the origin, free at the far end
    pub fn cantilever(label: impl Into<String>, length: impl Into<String>) -> Self {
        let mut input = Self::new(label, length);
        input.add_support("0", SupportKind::Fixed);
        input
    }

    /// Fixed-hinge-roller beam under two triangular loads and an end moment.
    ///
    /// Reactions are 30 and 80 at the fixed end and -10 at the roller.
    pub fn hinged_demo() -> Self {
        let mut input = Self::new("Hinged demo", "6");
        input.add_support("0", SupportKind::Fixed);
        input.add_support("4", SupportKind::Hinge);
        input.add_support("6", SupportKind::Roller);
        input.point_moments.push(PointActionInput {
            x: "6".to_string(),
            magnitude: "20".to_string(),
        });
        input.add_distributed_load("0", "2", "-5*x");
        input.add_distributed_load("2", "4", "-(20 - 5*x)");
        input.bindings = Bindings::new().with("E", 200e9).with("I", 1e-4);
        input
    }

    pub fn add_support(&mut self, x: impl Into<String>, kind: SupportKind) -> &mut Self {
        self.supports.push(SupportInput { x: x.into(), kind });
        self
    }

    pub fn add_point_load(&mut self, x: impl Into<String>, magnitude: impl Into<String>) -> &mut Self {
        self.point_loads.push(PointActionInput {
            x: x.into(),
            magnitude: magnitude.into(),
        });
        self
    }

    pub fn add_distributed_load(
        &mut self,
        x_start: impl Into<String>,
        x_end: impl Into<String>,
        expression: impl Into<String>,
    ) -> &mut Self {
        self.distributed_loads.push(DistributedLoadInput {
            x_start: x_start.into(),
            x_end: x_end.into(),
            expression: expression.into(),
        });
        self
    }

    /// Check the fields that do not need parsing
    pub fn validate(&self) -> BeamResult<()> {
        if self.label.trim().is_empty() {
            return Err(BeamError::invalid_input("label", &self.label, "label cannot be empty"));
        }
        if self.length.trim().is_empty() {
            return Err(BeamError::invalid_input("length", &self.length, "length is required"));
        }
        Ok(())
    }

    /// Build an unsolved [`Beam`] from the document.
    pub fn build(&self) -> BeamResult<Beam> {
        self.validate()?;
        let mut beam = Beam::with_origin(&self.length, &self.origin)?;
        for support in &self.supports {
            beam.add_support(&support.x, support.kind)?;
        }
        for load in &self.point_loads {
            beam.add_point_load(&load.x, &load.magnitude)?;
        }
        for moment in &self.point_moments {
            beam.add_point_moment(&moment.x, &moment.magnitude)?;
        }
        for load in &self.distributed_loads {
            beam.add_distributed_load(&load.x_start, &load.x_end, &load.expression)?;
        }
        for span in &self.young {
            beam.set_young(&span.x_start, &span.x_end, &span.value)?;
        }
        for span in &self.inertia {
            beam.set_inertia(&span.x_start, &span.x_end, &span.value)?;
        }
        for spring in &self.transverse_springs {
            beam.add_transverse_spring(&spring.x, &spring.stiffness)?;
        }
        for spring in &self.rotational_springs {
            beam.add_rotational_spring(&spring.x, &spring.stiffness)?;
        }
        Ok(beam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Expression;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let input: BeamInput = serde_json::from_str(r#"{"label": "B", "length": "L"}"#).unwrap();
        assert_eq!(input.origin, "0");
        assert!(input.supports.is_empty());
        let beam = input.build().unwrap();
        assert_eq!(beam.length(), &Expression::symbol("L"));
    }

    #[test]
    fn test_support_kind_keywords() {
        let json = r#"{"label": "B", "length": "6", "supports": [{"x": "0", "kind": "fixed"}, {"x": "4", "kind": "hinge"}]}"#;
        let input: BeamInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.supports[1].kind, SupportKind::Hinge);
    }

    #[test]
    fn test_support_kind_parsing_matches_builder() {
        let json = r#"{"label": "B", "length": "L", "supports": [{"x": "0", "kind": "Pin"}, {"x": "L", "kind": " ROLLER "}]}"#;
        let input: BeamInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.supports[0].kind, SupportKind::Pin);
        assert_eq!(input.supports[1].kind, "roller".parse::<SupportKind>().unwrap());

        let rewritten = serde_json::to_string(&input).unwrap();
        assert!(rewritten.contains(r#""kind":"pin""#));

        let bad = r#"{"label": "B", "length": "L", "supports": [{"x": "0", "kind": "clamp"}]}"#;
        let err = serde_json::from_str::<BeamInput>(bad).unwrap_err();
        assert!(err.to_string().contains("pin, roller, hinge, fixed"));
    }

    #[test]
    fn test_hinged_demo_solves() {
        let mut beam = BeamInput::hinged_demo().build().unwrap();
        beam.solve().unwrap();
        let forces: Vec<String> = beam
            .points()
            .iter()
            .map(|p| p.reaction_force.to_string())
            .collect();
        assert_eq!(forces, vec!["30", "0", "0", "-10"]);
        assert_eq!(beam.points()[0].reaction_moment.to_string(), "80");
    }

    #[test]
    fn test_property_spans_and_springs_applied() {
        let mut input = BeamInput::simply_supported("B", "L");
        input.add_point_load("L/2", "-P");
        input.young.push(PropertySpanInput {
            x_start: "0".into(),
            x_end: "L".into(),
            value: "E2".into(),
        });
        input.transverse_springs.push(SpringInput {
            x: "L/2".into(),
            stiffness: "k".into(),
        });
        let beam = input.build().unwrap();
        assert_eq!(beam.springs().len(), 1);
        assert_eq!(
            beam.property_spans(crate::loads::Property::Young)[0].value,
            Expression::symbol("E2")
        );
    }

    #[test]
    fn test_invalid_documents() {
        let input = BeamInput::new("  ", "L");
        assert_eq!(input.build().unwrap_err().error_code(), "INVALID_INPUT");

        let mut input = BeamInput::cantilever("B", "L");
        input.add_point_load("L/", "-P");
        assert_eq!(input.build().unwrap_err().error_code(), "PARSE_ERROR");
    }
}
