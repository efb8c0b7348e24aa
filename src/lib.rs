//! Labelprep: prepare image/label datasets for detection training.
//!
//! Labelprep covers the chores between exporting annotations and training a
//! model: cleaning exported label filenames, listing the classes present in
//! an image folder, counting images per class, and splitting image-label
//! pairs into train/val/test folders.
//!
//! Class (species) names come from image filenames: everything before the
//! first parenthesis, so `CapeDaisy(3).jpg` is a `CapeDaisy` image.
//!
//! # Modules
//!
//! - [`species`]: Filename parsing and directory listing
//! - [`rename`]: Cleaning of exported label filenames
//! - [`names`]: Unique class-name extraction
//! - [`count`]: Per-class image counts
//! - [`split`]: Train/val/test splitting
//! - [`error`]: Error types for labelprep operations

pub mod count;
pub mod error;
pub mod names;
pub mod rename;
pub mod species;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::LabelprepError;

/// The labelprep CLI application.
#[derive(Parser)]
#[command(name = "labelprep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Copy exported label files under clean, filesystem-safe names.
    CleanLabels(CleanLabelsArgs),
    /// Write the unique class names found in an image folder.
    Names(NamesArgs),
    /// Count images per class in a folder.
    Count(CountArgs),
    /// Split image-label pairs into train/val/test folders.
    Split(SplitArgs),
}

/// Arguments for the clean-labels subcommand.
#[derive(clap::Args)]
struct CleanLabelsArgs {
    /// Directory holding the exported label files.
    #[arg(long, env = "LABELPREP_LABELS", default_value = "labels")]
    labels: PathBuf,

    /// Directory to write the cleaned copies to.
    #[arg(long, env = "LABELPREP_LABELS_OUT", default_value = "labels2")]
    out: PathBuf,

    /// Show the renames without copying anything.
    #[arg(long)]
    dry_run: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the names subcommand.
#[derive(clap::Args)]
struct NamesArgs {
    /// Folder of images named after their class.
    #[arg(long, env = "LABELPREP_DATASET", default_value = "Dataset")]
    images: PathBuf,

    /// File to write the names to, one per line.
    #[arg(long, short = 'o', default_value = "plant_names.txt")]
    out: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the count subcommand.
#[derive(clap::Args)]
struct CountArgs {
    /// Folder of images to check (e.g. split/val/images).
    #[arg(default_value = "split/val/images")]
    folder: PathBuf,

    /// Fail if any class has fewer images than this.
    #[arg(long)]
    min: Option<usize>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Folder of images.
    #[arg(long, env = "LABELPREP_IMAGES", default_value = "Images")]
    images: PathBuf,

    /// Folder of labels with the same stems as the images.
    #[arg(long, env = "LABELPREP_LABELS", default_value = "labels")]
    labels: PathBuf,

    /// Output root; train/val/test subfolders are created inside.
    #[arg(long, env = "LABELPREP_OUT", default_value = "split")]
    out: PathBuf,

    /// Target number of training pairs.
    #[arg(long, env = "LABELPREP_TRAIN", default_value_t = 90)]
    train: usize,

    /// Target number of validation pairs.
    #[arg(long, env = "LABELPREP_VAL", default_value_t = 35)]
    val: usize,

    /// Target number of test pairs.
    #[arg(long, env = "LABELPREP_TEST", default_value_t = 20)]
    test: usize,

    /// Seed for shuffling within each class.
    #[arg(long, env = "LABELPREP_SEED", default_value_t = split::DEFAULT_SEED)]
    seed: u64,

    /// Plan the split and report it without copying files.
    #[arg(long)]
    dry_run: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the labelprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelprepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CleanLabels(args)) => run_clean_labels(args),
        Some(Commands::Names(args)) => run_names(args),
        Some(Commands::Count(args)) => run_count(args),
        Some(Commands::Split(args)) => run_split(args),
        None => {
            println!("labelprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Prepare image/label datasets for detection training.");
            println!();
            println!("Run 'labelprep --help' for usage information.");
            Ok(())
        }
    }
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    fn parse(value: &str) -> Result<Self, LabelprepError> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LabelprepError::UnsupportedFormat(format!(
                "'{}' (supported: text, json)",
                other
            ))),
        }
    }
}

fn print_report<R: Serialize + std::fmt::Display>(
    report: &R,
    format: ReportFormat,
) -> Result<(), LabelprepError> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Execute the clean-labels subcommand.
fn run_clean_labels(args: CleanLabelsArgs) -> Result<(), LabelprepError> {
    let format = ReportFormat::parse(&args.output)?;
    let opts = rename::RenameOptions {
        labels_dir: args.labels,
        output_dir: args.out,
        dry_run: args.dry_run,
    };
    let report = rename::clean_labels_dir(&opts)?;
    print_report(&report, format)
}

/// Execute the names subcommand.
fn run_names(args: NamesArgs) -> Result<(), LabelprepError> {
    let format = ReportFormat::parse(&args.output)?;
    let report = names::write_names(&args.images, &args.out)?;
    print_report(&report, format)
}

/// Execute the count subcommand.
fn run_count(args: CountArgs) -> Result<(), LabelprepError> {
    let format = ReportFormat::parse(&args.output)?;
    let report = count::count_species(&args.folder)?;

    let Some(min) = args.min else {
        return print_report(&report, format);
    };

    match count::check_minimum(report, min) {
        Ok(report) => print_report(&report, format),
        Err(err) => {
            // Show the counts alongside the failure.
            if let LabelprepError::CountBelowMinimum { report, .. } = &err {
                print_report(report, format)?;
                for row in report.below(min) {
                    println!("[WARN] {} has only {} image(s)", row.species, row.count);
                }
            }
            Err(err)
        }
    }
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), LabelprepError> {
    let format = ReportFormat::parse(&args.output)?;
    let opts = split::SplitOptions {
        images_dir: args.images,
        labels_dir: args.labels,
        out_dir: args.out,
        targets: split::SplitCounts::new(args.train, args.val, args.test),
        seed: args.seed,
        dry_run: args.dry_run,
    };
    let report = split::split_dataset(&opts)?;
    print_report(&report, format)
}
