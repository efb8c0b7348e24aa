//! Train/val/test splitting of image-label pairs.
//!
//! Images are grouped by species, each group is shuffled and allocated to
//! the three splits in proportion to the requested totals (with at least one
//! pair per split for species that have three or more), and the totals are
//! then nudged toward the exact targets. Pairs are copied into
//! `<out>/<split>/images` and `<out>/<split>/labels`.

mod allocate;
mod plan;
mod report;

pub use allocate::{allocate_species, PerSplit, Split, SplitCounts, SplitRatios};
pub use plan::{
    coverage_gaps, plan_split, rebalance, totals, Assignment, CoverageGap, Pair, SpeciesGroups,
    SplitPlan, COVERAGE_MIN_PAIRS, MAX_REBALANCE_MOVES,
};
pub use report::SplitReport;

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::LabelprepError;
use crate::rename::copy_file;
use crate::species::{
    file_name_string, file_stem, list_image_files, same_location, species_from_stem,
    LABEL_EXTENSION,
};

/// Default seed for shuffling species groups.
pub const DEFAULT_SEED: u64 = 42;

/// Options for splitting a dataset.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub out_dir: PathBuf,
    pub targets: SplitCounts,
    pub seed: u64,
    /// Plan and report without copying files.
    pub dry_run: bool,
}

/// Image-label pairs found on disk, plus what had to be skipped.
#[derive(Clone, Debug, Default)]
pub struct GatheredPairs {
    pub groups: SpeciesGroups,
    /// Images without a matching `<stem>.txt` label.
    pub missing_labels: Vec<String>,
    /// Images whose species could not be parsed.
    pub unparseable: Vec<String>,
}

impl GatheredPairs {
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Validate split options before running.
pub fn validate_split_options(opts: &SplitOptions) -> Result<(), LabelprepError> {
    if same_location(&opts.out_dir, &opts.images_dir)
        || same_location(&opts.out_dir, &opts.labels_dir)
    {
        return Err(LabelprepError::InvalidSplitParams {
            message: "the output directory must differ from the images and labels directories"
                .to_string(),
        });
    }
    Ok(())
}

/// Pair every image in `images_dir` with `<labels_dir>/<stem>.txt`, grouped
/// by species.
pub fn gather_pairs(images_dir: &Path, labels_dir: &Path) -> Result<GatheredPairs, LabelprepError> {
    let mut gathered = GatheredPairs::default();

    for image in list_image_files(images_dir)? {
        let file_name = file_name_string(&image);
        let stem = file_stem(&file_name);

        let Some(species) = species_from_stem(&stem) else {
            warn!("Could not parse species from filename: {file_name}");
            gathered.unparseable.push(file_name);
            continue;
        };

        let label = labels_dir.join(format!("{stem}.{LABEL_EXTENSION}"));
        if !label.is_file() {
            gathered.missing_labels.push(file_name);
            continue;
        }

        gathered
            .groups
            .entry(species.clone())
            .or_default()
            .push(Pair {
                image,
                label,
                species,
            });
    }

    if !gathered.missing_labels.is_empty() {
        warn!(
            "{} image(s) skipped due to missing labels",
            gathered.missing_labels.len()
        );
    }

    Ok(gathered)
}

/// Split the dataset described by `opts` and copy the pairs into place.
pub fn split_dataset(opts: &SplitOptions) -> Result<SplitReport, LabelprepError> {
    validate_split_options(opts)?;

    let gathered = gather_pairs(&opts.images_dir, &opts.labels_dir)?;
    let total = gathered.total();
    if total == 0 {
        return Err(LabelprepError::NoValidPairs {
            images_dir: opts.images_dir.clone(),
            labels_dir: opts.labels_dir.clone(),
        });
    }

    let species = gathered.groups.len();
    info!("Found {species} species and {total} total pairs");

    let plan = plan_split(gathered.groups, &opts.targets, opts.seed);
    for gap in &plan.coverage {
        warn!("{} is missing species: {}", gap.split, gap.missing.join(", "));
    }

    if !opts.dry_run {
        write_assignment(&opts.out_dir, &plan.assignment)?;
        info!("Copied files to {}", opts.out_dir.display());
    }

    Ok(SplitReport {
        species,
        total_pairs: total,
        missing_labels: gathered.missing_labels,
        unparseable: gathered.unparseable,
        targets: opts.targets,
        initial: plan.initial,
        totals: plan.totals,
        moves: plan.moves,
        coverage: plan.coverage,
        out_dir: opts.out_dir.clone(),
        dry_run: opts.dry_run,
    })
}

/// Create `<out>/<split>/{images,labels}` for every split.
pub fn ensure_split_dirs(out_dir: &Path) -> Result<(), LabelprepError> {
    for split in Split::ALL {
        for sub in ["images", "labels"] {
            let dir = out_dir.join(split.as_str()).join(sub);
            fs::create_dir_all(&dir).map_err(|source| LabelprepError::Write { path: dir, source })?;
        }
    }
    Ok(())
}

/// Copy each assigned pair into its split's `images/` and `labels/`.
pub fn write_assignment(out_dir: &Path, assignment: &Assignment) -> Result<(), LabelprepError> {
    ensure_split_dirs(out_dir)?;

    for split in Split::ALL {
        let split_dir = out_dir.join(split.as_str());
        for pair in assignment.get(split) {
            copy_into(&pair.image, &split_dir.join("images"))?;
            copy_into(&pair.label, &split_dir.join("labels"))?;
        }
    }

    Ok(())
}

fn copy_into(file: &Path, dir: &Path) -> Result<(), LabelprepError> {
    let name = file.file_name().ok_or_else(|| LabelprepError::InvalidSplitParams {
        message: format!("'{}' has no file name", file.display()),
    })?;
    copy_file(file, &dir.join(name))
}
