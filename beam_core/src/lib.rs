//! # beam_core - Exact Symbolic Beam Solver
//!
//! `beam_core` computes the static response of a one-dimensional beam:
//! support reactions, shear force, bending moment, rotation and deflection.
//! All arithmetic is exact. Inputs may be numbers or carry symbols (a
//! length `L`, loads `P`, stiffnesses `E`, `I`, `k`), and every result is a
//! closed-form expression in the position `x` per segment.
//!
//! ## Design Philosophy
//!
//! - **Exact**: rational coefficients and symbolic parameters, never sampled
//! - **JSON-First**: inputs, results and errors implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use beam_core::{Beam, Expression, SupportKind};
//!
//! let mut beam = Beam::new("L")?;
//! beam.add_support(0, SupportKind::Pin)?
//!     .add_support("L", SupportKind::Roller)?
//!     .add_point_load("L/2", "-P")?;
//! beam.solve()?;
//!
//! let midspan = beam.segments()[0].bending_moment.subs_x(&"L/2".parse()?)?;
//! assert_eq!(midspan, "L*P/4".parse::<Expression>()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`symbolic`] - Exact expressions, parser, calculus and linear solver
//! - [`loads`] - Point loads, moments, distributed loads, springs, property spans
//! - [`point`] - Supports and critical points
//! - [`beam`] - Beam builder and the solving pipeline
//! - [`results`] - Serializable solutions and numeric diagrams
//! - [`input`] - Textual beam descriptions
//! - [`document`] - Multi-beam documents with metadata
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves

pub mod beam;
pub mod document;
pub mod errors;
pub mod file_io;
pub mod input;
pub mod loads;
pub mod point;
pub mod results;
pub mod symbolic;

// Re-export commonly used types at crate root for convenience
pub use beam::{Beam, Quantity, Segment};
pub use document::{BeamDocument, DocumentMetadata};
pub use errors::{BeamError, BeamResult};
pub use file_io::{load_document, save_document};
pub use input::BeamInput;
pub use point::{Point, PointKind, SupportKind};
pub use results::BeamSolution;
pub use symbolic::{Bindings, Expression};
