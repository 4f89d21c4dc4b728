//! Readers for the metadata JSON the resource scripts leave behind.

use crate::domain::errors::ProvisionerError;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// File name of the per-resource metadata document.
pub(crate) const METADATA_FILE: &str = "metadata.json";

/// Parse a JSON document. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ProvisionerError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ProvisionerError::io(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ProvisionerError::Parse {
            what: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Parse `<dir>/<entry>/metadata.json` for every sub-directory of `dir`.
///
/// A missing `dir` means no resources. Entries named in `skip`, plain files
/// and unreadable metadata are passed over.
pub(crate) fn read_all<T: DeserializeOwned>(
    dir: &Path,
    skip: &[&str],
) -> Result<Vec<T>, ProvisionerError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ProvisionerError::io(dir, e)),
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !skip.contains(&name.as_str()))
        .collect();
    names.sort();

    let mut items = Vec::with_capacity(names.len());
    for name in names {
        match read_json(&dir.join(&name).join(METADATA_FILE)) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!("[pg-03] skipping {}: {}", name, e),
        }
    }
    Ok(items)
}

pub(crate) fn exists(path: &Path) -> Result<bool, ProvisionerError> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ProvisionerError::io(path, e)),
    }
}
