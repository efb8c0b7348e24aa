use std::fs;
use std::path::{Path, PathBuf};

/// Image and label directories of a scratch dataset.
pub struct Layout {
    pub images: PathBuf,
    pub labels: PathBuf,
}

/// Write `count` images per species into `<root>/Images`, each with a
/// matching label in `<root>/labels`.
pub fn write_dataset(root: &Path, species: &[(&str, usize)]) -> Layout {
    let images = root.join("Images");
    let labels = root.join("labels");
    fs::create_dir_all(&images).expect("create images dir");
    fs::create_dir_all(&labels).expect("create labels dir");

    for (name, count) in species {
        for i in 1..=*count {
            fs::write(images.join(format!("{name}({i}).jpg")), b"jpeg")
                .expect("write image");
            fs::write(
                labels.join(format!("{name}({i}).txt")),
                format!("0 0.5 0.5 0.{i} 0.{i}\n"),
            )
            .expect("write label");
        }
    }

    Layout { images, labels }
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
