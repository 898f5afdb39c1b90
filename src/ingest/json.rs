//! JSON array reader.

use serde::de::DeserializeOwned;
use std::path::Path;

use super::IngestError;

/// Parse a JSON array of objects. Rows are numbered from 1.
pub(super) fn parse_rows<R: DeserializeOwned>(
    path: &Path,
    contents: &str,
) -> Result<Vec<(usize, R)>, IngestError> {
    if contents.trim().is_empty() {
        return Err(IngestError::EmptyFile(path.to_path_buf()));
    }
    let rows: Vec<R> =
        serde_json::from_str(contents).map_err(|e| IngestError::Json(path.to_path_buf(), e))?;
    Ok(rows.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect())
}
