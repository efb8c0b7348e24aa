//! Split report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::allocate::{Split, SplitCounts};
use super::plan::{CoverageGap, COVERAGE_MIN_PAIRS};

/// How many skipped images to list in the text report.
const MISSING_LABEL_PREVIEW: usize = 10;

/// The result of splitting a dataset.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    /// Number of distinct species with at least one pair.
    pub species: usize,
    /// Number of valid image-label pairs.
    pub total_pairs: usize,
    /// Images skipped because no label file matched.
    pub missing_labels: Vec<String>,
    /// Images skipped because their species could not be parsed.
    pub unparseable: Vec<String>,
    /// Requested totals.
    pub targets: SplitCounts,
    /// Totals after per-species allocation.
    pub initial: SplitCounts,
    /// Totals after rebalancing.
    pub totals: SplitCounts,
    /// Pairs moved while rebalancing.
    pub moves: usize,
    /// Splits lacking some species.
    pub coverage: Vec<CoverageGap>,
    pub out_dir: PathBuf,
    pub dry_run: bool,
}

impl SplitReport {
    /// True if the final totals equal the targets.
    pub fn targets_met(&self) -> bool {
        self.totals == self.targets
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.unparseable {
            writeln!(f, "[WARN] Could not parse species from filename: {}", name)?;
        }

        if !self.missing_labels.is_empty() {
            writeln!(
                f,
                "[WARN] {} images skipped due to missing labels (showing up to {}):",
                self.missing_labels.len(),
                MISSING_LABEL_PREVIEW
            )?;
            for name in self.missing_labels.iter().take(MISSING_LABEL_PREVIEW) {
                writeln!(f, "   - {}", name)?;
            }
        }

        writeln!(
            f,
            "[INFO] Found {} species and {} total pairs.",
            self.species, self.total_pairs
        )?;
        writeln!(f, "[INFO] Initial totals -> {}", self.initial)?;
        writeln!(f, "[INFO] Final totals   -> {}", self.totals)?;
        if !self.targets_met() {
            writeln!(
                f,
                "[WARN] Targets ({}) could not be met exactly.",
                self.targets
            )?;
        }

        if self.coverage.is_empty() {
            writeln!(
                f,
                "[INFO] All splits contain every species (for species with >= {} images).",
                COVERAGE_MIN_PAIRS
            )?;
        } else {
            writeln!(
                f,
                "[WARN] Some splits are missing species (likely because certain species have too few images or exact-count constraints)."
            )?;
            for gap in &self.coverage {
                writeln!(f, "   {} missing: {}", gap.split, gap.missing.join(", "))?;
            }
        }

        if self.dry_run {
            return writeln!(f, "[DRY RUN] No files copied.");
        }

        writeln!(f, "[DONE] Copied files to:")?;
        for split in Split::ALL {
            writeln!(
                f,
                "   {} / labels",
                self.out_dir.join(split.as_str()).join("images").display()
            )?;
        }
        Ok(())
    }
}
