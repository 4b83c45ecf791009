use std::path::Path;

use crate::error::CatalogError;
use crate::facility::FacilityRecord;

/// Load the facility list from a JSON array file.
///
/// A missing file is not an error: it is logged and an empty list returned,
/// so a fresh deployment serves `[]` instead of failing every request.
/// Individual records that do not match the record shape are logged and
/// skipped.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] for read failures other than "not found" and
/// [`CatalogError::Parse`] when the contents are not a JSON array.
pub fn load_facilities(path: &Path) -> Result<Vec<FacilityRecord>, CatalogError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "facility data file not found; serving empty list");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(CatalogError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let raw: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

    let facilities: Vec<FacilityRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), index, error = %e, "skipping malformed facility record");
                None
            }
        })
        .collect();

    tracing::debug!(path = %path.display(), count = facilities.len(), "loaded facility data");
    Ok(facilities)
}
