//! Count report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Images per species in one folder.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CountReport {
    /// The folder that was scanned.
    pub folder: PathBuf,
    /// Total parsed images.
    pub total_images: usize,
    /// Per-species counts, sorted by species name.
    pub species: Vec<SpeciesCount>,
    /// Image files whose species could not be parsed.
    pub unparseable: Vec<String>,
}

/// A species and its image count.
#[derive(Clone, Debug, Serialize)]
pub struct SpeciesCount {
    pub species: String,
    pub count: usize,
}

impl CountReport {
    /// Species with fewer than `min` images.
    pub fn below(&self, min: usize) -> impl Iterator<Item = &SpeciesCount> {
        self.species.iter().filter(move |s| s.count < min)
    }
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.unparseable {
            writeln!(f, "[WARN] Could not parse species from: {}", name)?;
        }

        writeln!(f)?;
        writeln!(f, "=== Image Count Per Species ===")?;
        for row in &self.species {
            let word = if row.count == 1 { "image" } else { "images" };
            writeln!(f, "{} — {} {}", row.species, row.count, word)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{} species, {} image(s) in {}",
            self.species.len(),
            self.total_images,
            self.folder.display()
        )?;
        writeln!(f, "Sanity check complete!")
    }
}
