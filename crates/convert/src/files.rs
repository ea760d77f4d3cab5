//! PDF selection and bundle download.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::client::{ConvertError, ConvertResult};

/// Outcome of filtering a set of candidate upload paths.
#[derive(Debug, Default)]
pub struct FileSelection {
    /// PDFs accepted for upload, in input order.
    pub accepted: Vec<PathBuf>,
    /// Names rejected (not a PDF, unreadable, or a duplicate).
    pub rejected: Vec<String>,
}

impl FileSelection {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Accepts only `.pdf` files, de-duplicating by (name, size).
///
/// Mirrors the converter's drop-zone rules: anything that is not a PDF is
/// reported rather than silently dropped, and the same document added
/// twice is uploaded once.
pub fn select_pdf_files(paths: &[PathBuf]) -> FileSelection {
    let mut selection = FileSelection::default();
    let mut seen: HashSet<(String, u64)> = HashSet::new();

    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            selection.rejected.push(name);
            continue;
        }

        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!("cannot stat {}: {e}", path.display());
                selection.rejected.push(name);
                continue;
            }
        };

        if seen.insert((name, size)) {
            selection.accepted.push(path.clone());
        }
    }

    selection
}

/// Writes a returned bundle as pretty JSON next to the user, named
/// `nhcx_claim_bundle_<unix-millis>.json`, and reports the path written.
pub fn save_bundle(bundle: &Value, dir: &Path) -> ConvertResult<PathBuf> {
    let path = dir.join(format!(
        "nhcx_claim_bundle_{}.json",
        chrono::Utc::now().timestamp_millis()
    ));
    let json = serde_json::to_string_pretty(bundle)?;
    std::fs::write(&path, json).map_err(|source| ConvertError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}
