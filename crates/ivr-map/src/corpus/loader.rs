//! Alias corpus loading from CSV.
//!
//! A corpus directory looks like:
//!
//! ```text
//! aliases/
//! ├── global.csv
//! └── manufacturers/
//!     ├── medlife.csv
//!     └── acz.csv
//! ```
//!
//! Every file has the header `"Canonical Name","Variant"`. Lines starting
//! with `#` are comments. The file stem of a manufacturer file is its scope.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{AliasCorpus, AliasEntry, AliasScope};
use crate::error::{ConfigurationError, Result};

/// Name of the global table inside a corpus directory.
pub const GLOBAL_FILE: &str = "global.csv";

/// Directory holding one CSV per manufacturer or template scope.
pub const SCOPES_DIR: &str = "manufacturers";

#[derive(Debug, Deserialize)]
struct AliasCsvRow {
    #[serde(rename = "Canonical Name")]
    canonical: String,
    #[serde(rename = "Variant")]
    variant: String,
}

/// Parses alias rows from CSV content. `file` is only used in error messages.
pub fn parse_entries(content: &str, file: &str, scope: &AliasScope) -> Result<Vec<AliasEntry>> {
    let cursor = Cursor::new(content.as_bytes());
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(cursor);

    let mut entries = Vec::new();
    for result in reader.deserialize::<AliasCsvRow>() {
        let row = result.map_err(|e| ConfigurationError::CsvParse {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        entries.push(AliasEntry::new(&row.canonical, &row.variant, scope.clone())?);
    }
    Ok(entries)
}

/// Loads a corpus directory. Both the global file and the manufacturers
/// directory are optional, but the directory itself must exist.
pub fn load_dir(dir: &Path) -> Result<AliasCorpus> {
    let metadata = std::fs::metadata(dir).map_err(|e| io_error(dir, e))?;
    if !metadata.is_dir() {
        return Err(io_error(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let mut corpus = AliasCorpus::new();

    let global = dir.join(GLOBAL_FILE);
    if global.is_file() {
        load_file(&mut corpus, &global, &AliasScope::Global)?;
    }

    for path in scope_files(&dir.join(SCOPES_DIR))? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(file = %path.display(), "Skipping alias file with non-UTF-8 name");
            continue;
        };
        let scope = AliasScope::from_id(stem);
        if scope.is_global() {
            tracing::warn!(file = %path.display(), "Skipping manufacturer file named like the global scope");
            continue;
        }
        load_file(&mut corpus, &path, &scope)?;
    }

    tracing::info!(
        dir = %dir.display(),
        entries = corpus.len(),
        scopes = corpus.scopes().len(),
        "Loaded alias corpus"
    );
    Ok(corpus)
}

fn load_file(corpus: &mut AliasCorpus, path: &Path, scope: &AliasScope) -> Result<()> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let entries = parse_entries(&content, &path.display().to_string(), scope)?;
    tracing::debug!(file = %path.display(), %scope, entries = entries.len(), "Read alias file");
    corpus.extend(entries)
}

fn scope_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigurationError {
    ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    }
}
