//! # Beam Documents
//!
//! The `BeamDocument` struct is the root container written to disk. It holds
//! any number of beam descriptions keyed by UUID, plus metadata and
//! settings. Documents serialize to `.beam.json` files as human-readable
//! JSON.
//!
//! ## Structure
//!
//! ```text
//! BeamDocument
//! ├── meta: DocumentMetadata (schema version, title, author, timestamps)
//! ├── settings: DocumentSettings (diagram sampling)
//! └── beams: HashMap<Uuid, BeamInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beam_core::document::BeamDocument;
//! use beam_core::input::BeamInput;
//!
//! let mut document = BeamDocument::new("Floor framing", "J. Doe");
//! let id = document.add_beam(BeamInput::cantilever("C-1", "L"));
//! assert!(document.get_beam(&id).is_some());
//!
//! let json = serde_json::to_string_pretty(&document).unwrap();
//! assert!(json.contains("C-1"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::BeamInput;

/// Current schema version for beam documents
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root document container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamDocument {
    pub meta: DocumentMetadata,

    #[serde(default)]
    pub settings: DocumentSettings,

    /// All beams, keyed by UUID
    pub beams: HashMap<Uuid, BeamInput>,
}

impl BeamDocument {
    /// Create a new empty document.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        BeamDocument {
            meta: DocumentMetadata {
                version: SCHEMA_VERSION.to_string(),
                title: title.into(),
                author: author.into(),
                created: now,
                modified: now,
            },
            settings: DocumentSettings::default(),
            beams: HashMap::new(),
        }
    }

    /// Add a beam, returning the UUID assigned to it.
    pub fn add_beam(&mut self, beam: BeamInput) -> Uuid {
        let id = Uuid::new_v4();
        self.beams.insert(id, beam);
        self.touch();
        id
    }

    /// Remove a beam by UUID.
    pub fn remove_beam(&mut self, id: &Uuid) -> Option<BeamInput> {
        let beam = self.beams.remove(id);
        if beam.is_some() {
            self.touch();
        }
        beam
    }

    pub fn get_beam(&self, id: &Uuid) -> Option<&BeamInput> {
        self.beams.get(id)
    }

    /// Mutable access; marks the document as modified when the beam exists.
    pub fn get_beam_mut(&mut self, id: &Uuid) -> Option<&mut BeamInput> {
        if self.beams.contains_key(id) {
            self.meta.modified = Utc::now();
            self.beams.get_mut(id)
        } else {
            None
        }
    }

    /// Beams sorted by label, for stable listings
    pub fn beams_by_label(&self) -> Vec<(&Uuid, &BeamInput)> {
        let mut beams: Vec<_> = self.beams.iter().collect();
        beams.sort_by(|a, b| a.1.label.cmp(&b.1.label));
        beams
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }
}

impl Default for BeamDocument {
    fn default() -> Self {
        BeamDocument::new("", "")
    }
}

/// Document metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub title: String,

    pub author: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Settings shared by every beam in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Samples per segment when building numeric diagrams
    pub diagram_samples: usize,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings { diagram_samples: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let document = BeamDocument::new("Bridge deck", "Jane Engineer");
        assert_eq!(document.meta.title, "Bridge deck");
        assert_eq!(document.meta.version, SCHEMA_VERSION);
        assert_eq!(document.settings.diagram_samples, 50);
    }

    #[test]
    fn test_add_remove_beam() {
        let mut document = BeamDocument::new("Test", "Engineer");
        let id = document.add_beam(BeamInput::simply_supported("B-1", "L"));
        assert_eq!(document.beam_count(), 1);
        assert_eq!(document.get_beam(&id).unwrap().supports.len(), 2);

        document.get_beam_mut(&id).unwrap().add_point_load("L/2", "-P");
        assert_eq!(document.get_beam(&id).unwrap().point_loads.len(), 1);

        assert!(document.remove_beam(&id).is_some());
        assert_eq!(document.beam_count(), 0);
        assert!(document.remove_beam(&id).is_none());
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let json = r#"{
            "meta": {
                "version": "0.1.0",
                "title": "Old",
                "author": "A",
                "created": "2024-01-01T00:00:00Z",
                "modified": "2024-01-01T00:00:00Z"
            },
            "beams": {}
        }"#;
        let document: BeamDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.settings, DocumentSettings::default());
    }

    #[test]
    fn test_beams_by_label() {
        let mut document = BeamDocument::default();
        document.add_beam(BeamInput::cantilever("B", "L"));
        document.add_beam(BeamInput::cantilever("A", "L"));
        let labels: Vec<_> = document
            .beams_by_label()
            .into_iter()
            .map(|(_, b)| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
    }
}
