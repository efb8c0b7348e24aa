//! Cleaning of exported label filenames.
//!
//! Annotation tools export label files with URL-encoded, hash-prefixed names
//! such as `7da3c033__Dataset%5CRose(1).txt`. This module maps them back to
//! plain names (`Rose(1).txt`) and copies them into a fresh directory.

mod report;

pub use report::{RenameEntry, RenameReport};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use percent_encoding::percent_decode_str;

use crate::error::LabelprepError;
use crate::species::{
    file_name_string, has_extension, list_files, same_location, LABEL_EXTENSION,
};

/// Separator between an export hash prefix and the real name.
const PREFIX_SEPARATOR: &str = "__";

/// Characters not allowed in Windows filenames.
const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Options for cleaning label filenames.
#[derive(Clone, Debug)]
pub struct RenameOptions {
    /// Directory holding the exported label files.
    pub labels_dir: PathBuf,
    /// Directory the cleaned copies are written to.
    pub output_dir: PathBuf,
    /// Compute the mapping without copying anything.
    pub dry_run: bool,
}

/// Turn an exported label filename into a clean one.
///
/// The result may be blank (just `.txt`) when the name was all prefix.
pub fn clean_label_name(file_name: &str) -> String {
    let decoded = percent_decode_str(file_name).decode_utf8_lossy();

    let unprefixed = decoded
        .split(PREFIX_SEPARATOR)
        .last()
        .unwrap_or_default()
        .replace(['\\', '/'], "_");

    strip_dataset_prefix(&unprefixed).replace(INVALID_FILENAME_CHARS, "_")
}

/// Remove a leading `Dataset` followed by at least one `_` or `-`.
fn strip_dataset_prefix(name: &str) -> &str {
    const PREFIX: &str = "dataset";

    let Some(head) = name.get(..PREFIX.len()) else {
        return name;
    };
    if !head.eq_ignore_ascii_case(PREFIX) {
        return name;
    }

    let rest = &name[PREFIX.len()..];
    let trimmed = rest.trim_start_matches(['_', '-']);
    if trimmed.len() == rest.len() {
        name
    } else {
        trimmed
    }
}

/// True when nothing precedes the final extension, e.g. `.txt`.
fn is_blank_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map_or(name.is_empty(), |(stem, _)| stem.is_empty())
}

/// Validate rename options before running.
pub fn validate_rename_options(opts: &RenameOptions) -> Result<(), LabelprepError> {
    if same_location(&opts.output_dir, &opts.labels_dir) {
        return Err(LabelprepError::InvalidRenameParams {
            message: "the output directory must differ from the labels directory".to_string(),
        });
    }
    Ok(())
}

/// Copy every `.txt` file in the labels directory under its cleaned name.
pub fn clean_labels_dir(opts: &RenameOptions) -> Result<RenameReport, LabelprepError> {
    validate_rename_options(opts)?;

    let mut label_files = list_files(&opts.labels_dir)?;
    label_files.retain(|path| has_extension(path, &[LABEL_EXTENSION]));
    debug!(
        "found {} label file(s) in {}",
        label_files.len(),
        opts.labels_dir.display()
    );

    if !opts.dry_run {
        fs::create_dir_all(&opts.output_dir).map_err(|source| LabelprepError::Write {
            path: opts.output_dir.clone(),
            source,
        })?;
    }

    let mut report = RenameReport::new(opts.output_dir.clone(), opts.dry_run);
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();

    for src in label_files {
        let original = file_name_string(&src);
        let cleaned = clean_label_name(&original);

        if is_blank_name(&cleaned) {
            warn!("Skipping {original}: nothing left of the name after cleaning");
            report.skipped.push(original);
            continue;
        }

        if let Some(previous) = claimed.insert(cleaned.clone(), original.clone()) {
            warn!("{original} and {previous} both clean to {cleaned}; the later copy wins");
            report.collisions.push(cleaned.clone());
        }

        if !opts.dry_run {
            copy_file(&src, &opts.output_dir.join(&cleaned))?;
        }

        info!("{original} -> {cleaned}");
        report.entries.push(RenameEntry { original, cleaned });
    }

    Ok(report)
}

/// Copy `from` to `to`. Copying a file onto itself is a no-op.
pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<(), LabelprepError> {
    if same_location(from, to) {
        debug!("{} is already in place", to.display());
        return Ok(());
    }
    fs::copy(from, to).map_err(|source| LabelprepError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
