//! Species (class) names parsed from image filenames.
//!
//! Dataset images are named after the species they show, optionally
//! followed by parenthesised counters: `CapeDaisy(1)(2).jpg` belongs to the
//! `CapeDaisy` class. Everything before the first parenthesis, trimmed, is
//! the class name.

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LabelprepError;

/// Extensions (compared case-insensitively) treated as images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Extension of label files paired with images.
pub const LABEL_EXTENSION: &str = "txt";

/// Extract the species from a filename stem (no extension).
///
/// Returns `None` when the stem starts with a parenthesis or the leading
/// text is blank.
pub fn species_from_stem(stem: &str) -> Option<String> {
    let end = stem.find(['(', ')']).unwrap_or(stem.len());
    let species = stem[..end].trim();
    if species.is_empty() {
        None
    } else {
        Some(species.to_string())
    }
}

/// Extract the species from a full file name such as `Rose(3).png`.
pub fn species_from_file_name(file_name: &str) -> Option<String> {
    species_from_stem(&file_stem(file_name))
}

/// File name without its final extension.
pub fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_path(path: &Path) -> bool {
    has_extension(path, &IMAGE_EXTENSIONS)
}

pub(crate) fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

/// List regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, LabelprepError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LabelprepError::DirList {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort_by_cached_key(|path| file_name_string(path));
    Ok(files)
}

/// List image files directly inside `dir`, sorted by file name.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, LabelprepError> {
    let mut files = list_files(dir)?;
    files.retain(|path| is_image_path(path));
    Ok(files)
}

/// Whether `a` and `b` name the same location.
///
/// Existing paths are compared after canonicalization; otherwise `.`
/// components are dropped before comparing.
pub fn same_location(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

pub(crate) fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
