//! Rename report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The result of cleaning a labels directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RenameReport {
    /// Directory the cleaned copies went to.
    pub output_dir: PathBuf,
    /// True if nothing was copied.
    pub dry_run: bool,
    /// Every file that was (or would be) copied, in input order.
    pub entries: Vec<RenameEntry>,
    /// Inputs whose cleaned name was blank.
    pub skipped: Vec<String>,
    /// Cleaned names claimed by more than one input.
    pub collisions: Vec<String>,
}

/// One original → cleaned filename mapping.
#[derive(Clone, Debug, Serialize)]
pub struct RenameEntry {
    pub original: String,
    pub cleaned: String,
}

impl RenameReport {
    pub fn new(output_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            output_dir,
            dry_run,
            ..Default::default()
        }
    }
}

impl fmt::Display for RenameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} -> {}", entry.original, entry.cleaned)?;
        }

        for name in &self.skipped {
            writeln!(f, "[WARN] skipped {}: blank name after cleaning", name)?;
        }
        for name in &self.collisions {
            writeln!(f, "[WARN] {} was produced by more than one input", name)?;
        }

        writeln!(f)?;
        if self.dry_run {
            writeln!(
                f,
                "Dry run: {} label file(s) would be saved to: {}",
                self.entries.len(),
                self.output_dir.display()
            )
        } else {
            writeln!(
                f,
                "All cleaned label files saved to: {}",
                self.output_dir.display()
            )
        }
    }
}
