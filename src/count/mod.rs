//! Per-class image counts for a folder (a quick sanity check after
//! splitting).

mod report;

pub use report::{CountReport, SpeciesCount};

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

use crate::error::LabelprepError;
use crate::species::{file_name_string, list_image_files, species_from_file_name};

/// Count images per species directly inside `folder`.
pub fn count_species(folder: &Path) -> Result<CountReport, LabelprepError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut unparseable = Vec::new();

    for path in list_image_files(folder)? {
        let file_name = file_name_string(&path);
        match species_from_file_name(&file_name) {
            Some(species) => *counts.entry(species).or_insert(0) += 1,
            None => {
                warn!("Could not parse species from: {file_name}");
                unparseable.push(file_name);
            }
        }
    }

    let species: Vec<SpeciesCount> = counts
        .into_iter()
        .map(|(species, count)| SpeciesCount { species, count })
        .collect();

    Ok(CountReport {
        folder: folder.to_path_buf(),
        total_images: species.iter().map(|s| s.count).sum(),
        species,
        unparseable,
    })
}

/// Fail if any species in the report has fewer than `min` images.
pub fn check_minimum(report: CountReport, min: usize) -> Result<CountReport, LabelprepError> {
    let below = report.below(min).count();
    if below > 0 {
        return Err(LabelprepError::CountBelowMinimum { min, below, report });
    }
    Ok(report)
}
