//! Unique class-name extraction.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::error::LabelprepError;
use crate::species::{file_name_string, list_image_files, species_from_file_name};

/// The sorted, deduplicated class names found in an image folder.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NamesReport {
    /// Where the names were written.
    pub output_file: PathBuf,
    /// Unique names in byte order.
    pub names: Vec<String>,
    /// Image files whose name had no class prefix.
    pub unparseable: Vec<String>,
}

impl fmt::Display for NamesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.unparseable {
            writeln!(f, "[WARN] Could not parse a class name from: {}", name)?;
        }
        writeln!(
            f,
            "Done! Found {} unique class name(s) and saved them to {}",
            self.names.len(),
            self.output_file.display()
        )
    }
}

/// Collect the unique class names of every image directly in `images_dir`.
pub fn collect_names(images_dir: &Path) -> Result<(BTreeSet<String>, Vec<String>), LabelprepError> {
    let mut names = BTreeSet::new();
    let mut unparseable = Vec::new();

    for path in list_image_files(images_dir)? {
        let file_name = file_name_string(&path);
        match species_from_file_name(&file_name) {
            Some(species) => {
                names.insert(species);
            }
            None => {
                warn!("Could not parse a class name from: {file_name}");
                unparseable.push(file_name);
            }
        }
    }

    debug!("{} unique name(s) in {}", names.len(), images_dir.display());
    Ok((names, unparseable))
}

/// Extract class names from `images_dir` and write them, one per line, to
/// `output_file`.
pub fn write_names(images_dir: &Path, output_file: &Path) -> Result<NamesReport, LabelprepError> {
    let (names, unparseable) = collect_names(images_dir)?;

    let write_err = |source| LabelprepError::Write {
        path: output_file.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(output_file).map_err(write_err)?;
    for name in &names {
        writeln!(file, "{}", name).map_err(write_err)?;
    }

    Ok(NamesReport {
        output_file: output_file.to_path_buf(),
        names: names.into_iter().collect(),
        unparseable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_sorted_unique_names() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let images = temp.path().join("Dataset");
        fs::create_dir_all(&images).expect("create images dir");
        for name in [
            "Rose(1).jpg",
            "Rose(2)(3).JPG",
            "CapeDaisy(1).png",
            "Aloe Vera (7).tif",
            "(9).jpg",
            "notes.txt",
        ] {
            fs::write(images.join(name), b"x").expect("write file");
        }

        let out = temp.path().join("plant_names.txt");
        let report = write_names(&images, &out).expect("write names");

        assert_eq!(report.names, vec!["Aloe Vera", "CapeDaisy", "Rose"]);
        assert_eq!(report.unparseable, vec!["(9).jpg"]);
        let written = fs::read_to_string(&out).expect("read names");
        assert_eq!(written, "Aloe Vera\nCapeDaisy\nRose\n");
    }

    #[test]
    fn empty_folder_writes_empty_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("names.txt");
        let report = write_names(temp.path(), &out).expect("write names");
        assert!(report.names.is_empty());
        assert_eq!(fs::read_to_string(&out).expect("read names"), "");
    }
}
