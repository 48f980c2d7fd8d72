//! Builds a [`Catalog`] from a `<root>/<category>/<file>` descriptor tree.

use crate::catalog::{Catalog, DatasetDescriptor};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A descriptor file that could not be parsed as YAML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// A file that does not sit exactly one directory below the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutViolation {
    pub path: PathBuf,
    /// Number of path components below the root (2 is the only valid depth).
    pub depth: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub parse_failures: Vec<ParseFailure>,
    pub layout_violations: Vec<LayoutViolation>,
}

impl LoadedCatalog {
    pub fn failed_paths(&self) -> impl Iterator<Item = &Path> {
        self.parse_failures.iter().map(|failure| failure.path.as_path())
    }
}

/// Parse every descriptor under `root`.
///
/// Unparsable files are collected in `parse_failures` and the scan carries
/// on. Files outside the two-level layout are reported in
/// `layout_violations` and left out of the catalog. A missing root is an
/// error rather than an empty catalog.
pub fn load_catalog(root: &Path) -> Result<LoadedCatalog> {
    if !root.is_dir() {
        bail!(
            "descriptor root {} does not exist or is not a directory",
            root.display()
        );
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut loaded = LoadedCatalog::default();
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let [category, file_name] = parts.as_slice() else {
            warn!(path = %path.display(), depth = parts.len(), "skipping descriptor outside <category>/<file> layout");
            loaded.layout_violations.push(LayoutViolation {
                depth: parts.len(),
                path,
            });
            continue;
        };

        match read_descriptor(&path)? {
            Ok(descriptor) => {
                debug!(category = %category, file = %file_name, "loaded descriptor");
                loaded
                    .catalog
                    .insert(category.clone(), file_name.clone(), descriptor);
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "could not parse descriptor");
                loaded.parse_failures.push(ParseFailure { path, reason });
            }
        }
    }

    Ok(loaded)
}

/// Read and parse a single descriptor at `<root>/<category>/<file_name>`.
pub fn load_descriptor(root: &Path, category: &str, file_name: &str) -> Result<DatasetDescriptor> {
    let path = root.join(category).join(file_name);
    match read_descriptor(&path)? {
        Ok(descriptor) => Ok(descriptor),
        Err(reason) => bail!("parsing {}: {reason}", path.display()),
    }
}

/// Outer error is I/O, inner error is a parse failure reason.
fn read_descriptor(path: &Path) -> Result<std::result::Result<DatasetDescriptor, String>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => return Ok(Err(format!("not valid UTF-8: {err}"))),
    };
    if text.trim().is_empty() {
        return Ok(Ok(DatasetDescriptor::new(Value::Null)));
    }
    Ok(serde_yaml::from_str::<Value>(&text)
        .map(DatasetDescriptor::new)
        .map_err(|err| err.to_string()))
}

fn collect_files(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            debug!(path = %path.display(), "skipping hidden entry");
            continue;
        }
        // `DirEntry::file_type` does not follow symlinks; links are skipped.
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", path.display()))?;
        if file_type.is_dir() {
            collect_files(&path, acc)?;
        } else if file_type.is_file() {
            acc.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-regular entry");
        }
    }
    Ok(())
}
