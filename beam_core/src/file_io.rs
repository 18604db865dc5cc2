//! # File I/O Module
//!
//! Handles document file operations with safety features:
//! - **Atomic saves**: Write to .tmp, verify, rename to prevent corruption
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Documents are saved as JSON, conventionally with a `.beam.json`
//! extension. A bare [`BeamInput`] file (one beam, no metadata) can also be
//! read with [`load_beam_input`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use beam_core::file_io::{save_document, load_document};
//! use beam_core::document::BeamDocument;
//! use std::path::Path;
//!
//! let document = BeamDocument::new("Floor framing", "Engineer");
//! let path = Path::new("framing.beam.json");
//!
//! save_document(&document, path).unwrap();
//! let loaded = load_document(path).unwrap();
//! assert_eq!(loaded.meta.title, "Floor framing");
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::document::{BeamDocument, SCHEMA_VERSION};
use crate::errors::{BeamError, BeamResult};
use crate::input::BeamInput;

/// Temporary path used while saving `path`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_to_string(path: &Path) -> BeamResult<String> {
    let mut file = File::open(path)
        .map_err(|e| BeamError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| BeamError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Save a document to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize document to JSON
/// 2. Write to a temporary file (.tmp) and sync it
/// 3. Re-read the temporary file and check it parses
/// 4. Rename .tmp over the target (atomic on most filesystems)
pub fn save_document(document: &BeamDocument, path: &Path) -> BeamResult<()> {
    let json = serde_json::to_string_pretty(document).map_err(|e| BeamError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        BeamError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        BeamError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        BeamError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    // Verify before replacing anything
    let written = read_to_string(&tmp_path)?;
    if let Err(e) = serde_json::from_str::<BeamDocument>(&written) {
        let _ = fs::remove_file(&tmp_path);
        return Err(BeamError::SerializationError {
            reason: format!("verification of {} failed: {}", tmp_path.display(), e),
        });
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BeamError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!("saved {} beams to {}", document.beam_count(), path.display());
    Ok(())
}

/// Load a document from a file.
///
/// # Returns
///
/// * `Ok(BeamDocument)` - Successfully loaded document
/// * `Err(BeamError::VersionMismatch)` - File version is incompatible
/// * `Err(BeamError::SerializationError)` - Invalid JSON
/// * `Err(BeamError::FileError)` - I/O error
pub fn load_document(path: &Path) -> BeamResult<BeamDocument> {
    let contents = read_to_string(path)?;

    let document: BeamDocument =
        serde_json::from_str(&contents).map_err(|e| BeamError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&document.meta.version)?;

    debug!("loaded {} beams from {}", document.beam_count(), path.display());
    Ok(document)
}

/// Load a single bare beam description.
pub fn load_beam_input(path: &Path) -> BeamResult<BeamInput> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| BeamError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> BeamResult<()> {
    let mismatch = || BeamError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    let (file_major, current_major) = match (file_parts.first(), current_parts.first()) {
        (Some(f), Some(c)) => (*f, *c),
        _ => return Err(mismatch()),
    };

    // Major version must match
    if file_major != current_major {
        return Err(mismatch());
    }

    // For 0.x versions a newer minor may carry breaking changes
    if current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_document_path(name: &str) -> PathBuf {
        temp_dir().join(format!("beam_core_test_{}.beam.json", name))
    }

    #[test]
    fn test_tmp_path_generation() {
        let path = Path::new("/path/to/deck.beam.json");
        assert_eq!(tmp_path_for(path), Path::new("/path/to/deck.beam.json.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_document_path("roundtrip");

        let mut document = BeamDocument::new("Roundtrip", "Test Engineer");
        let id = document.add_beam(BeamInput::hinged_demo());
        save_document(&document, &path).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.meta.author, "Test Engineer");
        assert_eq!(loaded.get_beam(&id), document.get_beam(&id));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_document_path("atomic");
        let tmp_path = tmp_path_for(&path);

        save_document(&BeamDocument::new("Atomic", "Test"), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_document_path("newer_schema");
        let mut document = BeamDocument::new("Future", "Test");
        document.meta.version = "0.9.0".to_string();
        save_document(&document, &path).unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, BeamError::VersionMismatch { .. }));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(&temp_document_path("does_not_exist")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_bare_beam_input() {
        let path = temp_document_path("bare_input");
        fs::write(&path, r#"{"label": "C-1", "length": "L"}"#).unwrap();

        let input = load_beam_input(&path).unwrap();
        assert_eq!(input.label, "C-1");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
