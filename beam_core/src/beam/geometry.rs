//! Coordinate validation run at the start of every solve.
//!
//! Coordinates may contain a single geometry symbol (typically `L`). To
//! order and compare them, the symbol is set to one; every comparison then
//! works on these normalized values with [`TOLERANCE`].

use std::collections::BTreeSet;

use log::debug;

use super::{Beam, TOLERANCE};
use crate::errors::{BeamError, BeamResult};
use crate::loads::{Property, PropertySpan};
use crate::point::PointKind;
use crate::symbolic::{Bindings, Expression};

/// Normalization of the beam's coordinates
#[derive(Debug, Clone)]
pub(super) struct Frame {
    pub symbol: Option<String>,
    bindings: Bindings,
    pub origin: f64,
    pub end: f64,
}

impl Frame {
    /// Comparable value of a coordinate
    pub fn normalize(&self, coordinate: &Expression) -> BeamResult<f64> {
        Ok(coordinate.evaluate(&self.bindings)?)
    }

    pub fn length(&self) -> f64 {
        self.end - self.origin
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.origin - TOLERANCE && value <= self.end + TOLERANCE
    }
}

/// Every user coordinate, labelled for error messages
fn coordinates(beam: &Beam) -> Vec<(&'static str, &Expression)> {
    let mut all: Vec<(&'static str, &Expression)> = Vec::new();
    for property in [Property::Young, Property::Inertia] {
        for span in beam.property_spans(property) {
            all.push((property.display_name(), &span.x_start));
            all.push((property.display_name(), &span.x_end));
        }
    }
    all.extend(beam.supports().iter().map(|(x, _)| ("support", x)));
    all.extend(beam.point_loads().iter().map(|l| ("point load", &l.x_coord)));
    all.extend(beam.point_moments().iter().map(|m| ("point moment", &m.x_coord)));
    for load in beam.distributed_loads() {
        all.push(("distributed load", &load.x_start));
        all.push(("distributed load", &load.x_end));
    }
    all.extend(beam.springs().iter().map(|s| ("spring", &s.x_coord)));
    all
}

/// Check the beam's geometry and build the normalization frame.
pub(super) fn validate(beam: &Beam) -> BeamResult<Frame> {
    let coordinates = coordinates(beam);

    for (field, x) in &coordinates {
        if x.depends_on_x() {
            return Err(BeamError::geometry(format!(
                "{} coordinate {} cannot depend on the position variable",
                field, x
            )));
        }
    }

    let geometry_symbols: BTreeSet<String> = beam
        .length()
        .free_symbols()
        .into_iter()
        .chain(beam.origin().free_symbols())
        .collect();
    let mut symbols = geometry_symbols.clone();
    for (_, x) in &coordinates {
        symbols.extend(x.free_symbols());
    }
    if symbols.len() > 1 {
        return Err(BeamError::geometry(format!(
            "at most one symbol may appear in coordinates, found {}",
            symbols.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }
    let symbol = symbols.into_iter().next();
    if let Some(name) = &symbol {
        if !geometry_symbols.contains(name) {
            return Err(BeamError::geometry(format!(
                "coordinates use '{}' but the beam length {} does not",
                name,
                beam.length()
            )));
        }
    }

    let bindings = match &symbol {
        Some(name) => Bindings::new().with(name.as_str(), 1.0),
        None => Bindings::new(),
    };
    let origin = beam.origin().evaluate(&bindings)?;
    let length = beam.length().evaluate(&bindings)?;
    if length <= TOLERANCE {
        return Err(BeamError::geometry(format!(
            "beam length {} must be positive",
            beam.length()
        )));
    }
    let frame = Frame {
        symbol,
        bindings,
        origin,
        end: origin + length,
    };
    debug!(
        "geometry symbol {:?}, normalized span [{}, {}]",
        frame.symbol, frame.origin, frame.end
    );

    for (field, x) in &coordinates {
        if !frame.contains(frame.normalize(x)?) {
            return Err(BeamError::geometry(format!(
                "{} coordinate {} lies outside the beam [{}, {}]",
                field,
                x,
                beam.origin(),
                beam.end()
            )));
        }
    }
    for load in beam.distributed_loads() {
        check_span(&frame, "distributed load", &load.x_start, &load.x_end)?;
    }

    for property in [Property::Young, Property::Inertia] {
        check_coverage(&frame, property, beam.property_spans(property))?;
    }

    check_supports(beam, &frame)?;
    Ok(frame)
}

fn check_span(frame: &Frame, field: &str, x_start: &Expression, x_end: &Expression) -> BeamResult<()> {
    if frame.normalize(x_start)? >= frame.normalize(x_end)? - TOLERANCE {
        return Err(BeamError::geometry(format!(
            "{} span [{}, {}] is degenerate or inverted",
            field, x_start, x_end
        )));
    }
    Ok(())
}

/// Spans must partition the beam: total length first, then pairwise overlap
fn check_coverage(frame: &Frame, property: Property, spans: &[PropertySpan]) -> BeamResult<()> {
    let mut bounds = Vec::with_capacity(spans.len());
    for span in spans {
        check_span(frame, property.display_name(), &span.x_start, &span.x_end)?;
        bounds.push((frame.normalize(&span.x_start)?, frame.normalize(&span.x_end)?));
    }

    let covered: f64 = bounds.iter().map(|(start, end)| end - start).sum();
    if (covered - frame.length()).abs() > TOLERANCE {
        return Err(BeamError::property_coverage(
            property.display_name(),
            format!(
                "spans cover {:.6} of a normalized length {:.6}",
                covered,
                frame.length()
            ),
        ));
    }

    for (i, a) in bounds.iter().enumerate() {
        for (j, b) in bounds.iter().enumerate().skip(i + 1) {
            if a.0 < b.1 - TOLERANCE && b.0 < a.1 - TOLERANCE {
                return Err(BeamError::property_coverage(
                    property.display_name(),
                    format!(
                        "span [{}, {}] overlaps span [{}, {}]",
                        spans[i].x_start, spans[i].x_end, spans[j].x_start, spans[j].x_end
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn check_supports(beam: &Beam, frame: &Frame) -> BeamResult<()> {
    let supports = beam.supports();
    for (i, (x, kind)) in supports.iter().enumerate() {
        let at = frame.normalize(x)?;
        for (other, other_kind) in supports.iter().skip(i + 1) {
            if (frame.normalize(other)? - at).abs() < TOLERANCE {
                return Err(BeamError::geometry(format!(
                    "{} at x = {} coincides with the {} at x = {}",
                    other_kind, other, kind, x
                )));
            }
        }
        let point_kind = PointKind::from(*kind);
        for spring in beam.springs() {
            if (frame.normalize(&spring.x_coord)? - at).abs() < TOLERANCE && !point_kind.accepts_spring(spring.kind) {
                return Err(BeamError::support_conflict(x, spring.kind.display_name(), point_kind.name()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::SupportKind;

    #[test]
    fn test_frame_normalizes_geometry_symbol() {
        let mut beam = Beam::new("L").unwrap();
        beam.add_point_load("3*L/4", "-P").unwrap();
        let frame = validate(&beam).unwrap();
        assert_eq!(frame.symbol.as_deref(), Some("L"));
        assert_eq!(frame.normalize(&"3*L/4".parse().unwrap()).unwrap(), 0.75);
        assert_eq!(frame.end, 1.0);
    }

    #[test]
    fn test_two_symbols_rejected() {
        let mut beam = Beam::new("L").unwrap();
        beam.add_point_load("a", "-P").unwrap();
        let err = validate(&beam).unwrap_err();
        assert!(matches!(err, BeamError::Geometry { .. }));
    }

    #[test]
    fn test_symbol_missing_from_length_rejected() {
        let mut beam = Beam::new(6).unwrap();
        beam.add_point_load("L/2", "-P").unwrap();
        assert!(matches!(validate(&beam), Err(BeamError::Geometry { .. })));
    }

    #[test]
    fn test_coordinate_outside_beam() {
        let mut beam = Beam::new(6).unwrap();
        beam.add_support(7, SupportKind::Pin).unwrap();
        let err = validate(&beam).unwrap_err();
        assert_eq!(err.error_code(), "GEOMETRY_ERROR");
    }

    #[test]
    fn test_property_overlap() {
        let mut beam = Beam::new(4).unwrap();
        beam.set_young(0, 3, "E").unwrap().set_young(2, 4, "E").unwrap();
        let err = validate(&beam).unwrap_err();
        assert!(matches!(err, BeamError::PropertyCoverage { .. }), "{err:?}");

        // Equal total length but shifted: still an overlap.
        let mut beam = Beam::new(4).unwrap();
        beam.set_inertia(0, 2, "I").unwrap().set_inertia(1, 3, "I").unwrap();
        let err = validate(&beam).unwrap_err();
        assert!(matches!(err, BeamError::PropertyCoverage { .. }));
    }
}
