//! Integration tests for splitting a dataset on disk.

use std::fs;
use std::path::Path;

use labelprep::count::count_species;
use labelprep::split::{split_dataset, Split, SplitCounts, SplitOptions};
use labelprep::LabelprepError;

mod common;
use common::{file_names, write_dataset};

fn options(root: &Path, targets: SplitCounts) -> SplitOptions {
    let layout = write_dataset(root, &[("Rose", 10), ("Fern", 6), ("Lily", 4)]);
    SplitOptions {
        images_dir: layout.images,
        labels_dir: layout.labels,
        out_dir: root.join("split"),
        targets,
        seed: 42,
        dry_run: false,
    }
}

#[test]
fn split_copies_pairs_into_each_split() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let opts = options(temp.path(), SplitCounts::new(12, 5, 3));

    let report = split_dataset(&opts).expect("split dataset");

    assert_eq!(report.species, 3);
    assert_eq!(report.total_pairs, 20);
    assert!(report.targets_met());
    assert!(report.coverage.is_empty());

    let mut seen = Vec::new();
    for split in Split::ALL {
        let images_dir = opts.out_dir.join(split.as_str()).join("images");
        let labels_dir = opts.out_dir.join(split.as_str()).join("labels");
        let images = file_names(&images_dir);
        let labels = file_names(&labels_dir);

        assert_eq!(images.len(), *report.totals.get(split));
        let image_stems: Vec<String> =
            images.iter().map(|n| n.trim_end_matches(".jpg").to_string()).collect();
        let label_stems: Vec<String> =
            labels.iter().map(|n| n.trim_end_matches(".txt").to_string()).collect();
        assert_eq!(image_stems, label_stems, "labels follow their images in {split}");

        let counts = count_species(&images_dir).expect("count split");
        assert_eq!(counts.species.len(), 3, "every species present in {split}");

        seen.extend(images);
    }

    seen.sort();
    assert_eq!(seen, file_names(&opts.images_dir));
}

#[test]
fn label_contents_are_copied_verbatim() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let opts = options(temp.path(), SplitCounts::new(12, 5, 3));
    split_dataset(&opts).expect("split dataset");

    for split in Split::ALL {
        let labels_dir = opts.out_dir.join(split.as_str()).join("labels");
        for name in file_names(&labels_dir) {
            let copied = fs::read_to_string(labels_dir.join(&name)).expect("read copy");
            let original = fs::read_to_string(opts.labels_dir.join(&name)).expect("read original");
            assert_eq!(copied, original);
        }
    }
}

#[test]
fn same_seed_gives_same_split() {
    let a = tempfile::tempdir().expect("create temp dir");
    let b = tempfile::tempdir().expect("create temp dir");
    let opts_a = options(a.path(), SplitCounts::new(12, 5, 3));
    let opts_b = options(b.path(), SplitCounts::new(12, 5, 3));

    split_dataset(&opts_a).expect("split a");
    split_dataset(&opts_b).expect("split b");

    for split in Split::ALL {
        let dir = |root: &Path| root.join("split").join(split.as_str()).join("images");
        assert_eq!(file_names(&dir(a.path())), file_names(&dir(b.path())));
    }
}

#[test]
fn dry_run_writes_nothing() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let mut opts = options(temp.path(), SplitCounts::new(12, 5, 3));
    opts.dry_run = true;

    let report = split_dataset(&opts).expect("plan split");

    assert_eq!(report.totals, SplitCounts::new(12, 5, 3));
    assert!(!opts.out_dir.exists());
}

#[test]
fn unreachable_targets_are_reported_not_fatal() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let opts = options(temp.path(), SplitCounts::new(90, 35, 20));

    let report = split_dataset(&opts).expect("split dataset");

    assert_eq!(report.totals.total(), 20);
    assert!(!report.targets_met());
    assert!(report.to_string().contains("could not be met exactly"));
}

#[test]
fn missing_labels_are_skipped() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let opts = options(temp.path(), SplitCounts::new(12, 5, 3));
    fs::remove_file(opts.labels_dir.join("Lily(1).txt")).expect("remove label");
    fs::write(opts.images_dir.join("(odd).jpg"), b"jpeg").expect("write odd image");

    let report = split_dataset(&opts).expect("split dataset");

    assert_eq!(report.total_pairs, 19);
    assert_eq!(report.missing_labels, vec!["Lily(1).jpg"]);
    assert_eq!(report.unparseable, vec!["(odd).jpg"]);
}

#[test]
fn missing_images_dir_is_an_error() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let opts = SplitOptions {
        images_dir: temp.path().join("nope"),
        labels_dir: temp.path().join("labels"),
        out_dir: temp.path().join("split"),
        targets: SplitCounts::new(1, 1, 1),
        seed: 42,
        dry_run: false,
    };

    let err = split_dataset(&opts).unwrap_err();
    assert!(matches!(err, LabelprepError::DirList { .. }));
}
