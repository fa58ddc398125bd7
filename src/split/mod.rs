//! Train/val/test splitting of labeled image patches.
//!
//! The splitter pairs every `png/<stem>.png` with `labels/<stem>.txt`,
//! shuffles the pairs, partitions them by ratio and copies each pair into the
//! split layout described in [`crate::dataset`]. Sources are only read.
//!
//! Counts are computed by truncation: `train = floor(n * train_ratio)`,
//! `val = floor(n * val_ratio)`, and the test split takes whatever remains.
//! Ratios are deliberately not required to sum to 1.0.

pub mod report;

pub use report::{SplitReport, SplitSection};

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::dataset::{
    label_file_name, resolve_class_names, write_data_yaml, DataYaml, PatchLayout, Split,
    DEFAULT_IMAGE_EXTENSION,
};
use crate::error::SbdError;

/// Fraction of samples assigned to each split.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    /// Informational only; the test split always receives the remainder.
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.2,
            test: 0.1,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Self {
        Self { train, val, test }
    }

    pub fn sum(&self) -> f64 {
        self.train + self.val + self.test
    }

    /// Compute split boundaries for `total` samples.
    pub fn plan(&self, total: usize) -> SplitPlan {
        let train = truncated_count(total, self.train);
        let val = truncated_count(total, self.val);
        SplitPlan::new(total, train, val)
    }
}

/// `floor(total * ratio)`; negative or NaN products become 0.
fn truncated_count(total: usize, ratio: f64) -> usize {
    (total as f64 * ratio) as usize
}

/// Contiguous, non-overlapping ranges of a shuffled sample list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPlan {
    total: usize,
    train_end: usize,
    val_end: usize,
}

impl SplitPlan {
    /// Build a plan from requested train/val counts.
    ///
    /// Boundaries are clamped to `total`, so oversized requests shrink the
    /// later splits instead of failing.
    pub fn new(total: usize, train: usize, val: usize) -> Self {
        let train_end = train.min(total);
        let val_end = train.saturating_add(val).min(total);
        Self {
            total,
            train_end,
            val_end,
        }
    }

    /// Index range of a split within the shuffled list.
    pub fn range(&self, split: Split) -> Range<usize> {
        match split {
            Split::Train => 0..self.train_end,
            Split::Val => self.train_end..self.val_end,
            Split::Test => self.val_end..self.total,
        }
    }

    pub fn count(&self, split: Split) -> usize {
        self.range(split).len()
    }

    /// Slice `items` into the three splits, in [`Split::ALL`] order.
    ///
    /// `items` must have exactly `total` elements.
    pub fn assign<'a, T>(&self, items: &'a [T]) -> [(Split, &'a [T]); 3] {
        debug_assert_eq!(items.len(), self.total);
        Split::ALL.map(|split| (split, &items[self.range(split)]))
    }
}

/// An image patch paired with its label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Image file name, also used for the copied image.
    pub file_name: PathBuf,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

impl Sample {
    /// File name of the copied label.
    pub fn label_file_name(&self) -> PathBuf {
        label_file_name(&self.file_name)
    }
}

/// Result of scanning a patch directory.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    /// Images with a matching label, sorted by file name.
    pub samples: Vec<Sample>,
    /// Images without a matching label, sorted by file name.
    pub unmatched: Vec<PathBuf>,
}

impl Discovery {
    pub fn image_count(&self) -> usize {
        self.samples.len() + self.unmatched.len()
    }
}

/// Options for [`split_dataset`].
#[derive(Clone, Debug)]
pub struct SplitOptions {
    /// Directory containing `png/` and `labels/`.
    pub patches_dir: PathBuf,
    /// Directory receiving `train/`, `val/`, `test/` and `data.yaml`.
    pub output_dir: PathBuf,
    pub ratios: SplitRatios,
    /// Class names; `None` writes the single default class.
    pub classes: Option<Vec<String>>,
    /// Fixed seed for a reproducible shuffle; `None` uses the thread RNG.
    pub seed: Option<u64>,
    /// Extension of the images to pick up (case-sensitive, without dot).
    pub image_extension: String,
}

impl SplitOptions {
    /// Options with default ratios (0.7/0.2/0.1), no classes and no seed.
    pub fn new(patches_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            patches_dir: patches_dir.into(),
            output_dir: output_dir.into(),
            ratios: SplitRatios::default(),
            classes: None,
            seed: None,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }
}

/// Split a patch directory into train/val/test and write `data.yaml`.
///
/// Fails before touching `output_dir` if `png/` or `labels/` is missing.
/// Copy and write failures abort immediately and leave the output partially
/// populated. Existing files with the same name are overwritten.
pub fn split_dataset(opts: &SplitOptions) -> Result<SplitReport, SbdError> {
    let layout = PatchLayout::new(&opts.patches_dir);
    layout.validate()?;

    for split in Split::ALL {
        fs::create_dir_all(split.images_dir(&opts.output_dir)).map_err(SbdError::Io)?;
        fs::create_dir_all(split.labels_dir(&opts.output_dir)).map_err(SbdError::Io)?;
    }

    let Discovery {
        mut samples,
        unmatched,
    } = discover_samples(&layout, &opts.image_extension)?;
    info!("Found {} images with labels", samples.len());
    for image in &unmatched {
        debug!("Skipping {}: no matching label", image.display());
    }

    let ratio_sum = opts.ratios.sum();
    if (ratio_sum - 1.0).abs() > 1e-9 {
        debug!("Split ratios sum to {ratio_sum}; test split takes the remainder");
    }

    shuffle_samples(&mut samples, opts.seed);
    let plan = opts.ratios.plan(samples.len());

    let mut sections = Vec::with_capacity(Split::ALL.len());
    for (split, chunk) in plan.assign(&samples) {
        for sample in chunk {
            copy_sample(sample, &opts.output_dir, split)?;
        }
        info!("{}: {} images copied", split, chunk.len());

        sections.push(SplitSection {
            split,
            images: chunk.len(),
            files: chunk.iter().map(|s| s.file_name.clone()).collect(),
        });
    }

    let names = resolve_class_names(opts.classes.as_deref());
    let data_yaml = DataYaml::for_split_output(&opts.output_dir, names)?;
    let data_yaml_path = write_data_yaml(&opts.output_dir, &data_yaml)?;
    info!("data.yaml written to {}", data_yaml_path.display());

    Ok(SplitReport {
        patches_dir: opts.patches_dir.clone(),
        output_dir: opts.output_dir.clone(),
        labeled_images: samples.len(),
        unmatched_images: unmatched.len(),
        seed: opts.seed,
        ratios: opts.ratios,
        splits: sections,
        data_yaml: data_yaml_path,
        nc: data_yaml.nc,
        names: data_yaml.names,
    })
}

/// List images directly inside `png/` and pair them with their labels.
///
/// Only regular files whose extension equals `extension` exactly are
/// considered. Entries of `png/` that cannot be inspected, such as dangling
/// symlinks, are paired like any other image: without a label they end up in
/// `unmatched`, with one the copy fails later. Both lists come back sorted by
/// file name.
pub fn discover_samples(layout: &PatchLayout, extension: &str) -> Result<Discovery, SbdError> {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(layout.images_dir())
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let image_path = match entry {
            Ok(entry) if entry.file_type().is_file() => entry.into_path(),
            Ok(_) => continue,
            Err(err) => {
                let unreadable = (err.depth() == 1)
                    .then(|| err.path().map(Path::to_path_buf))
                    .flatten();
                match unreadable {
                    Some(path) => {
                        debug!("Cannot inspect {}: {}", path.display(), err);
                        path
                    }
                    None => {
                        return Err(SbdError::DirectoryWalk {
                            path: layout.images_dir().to_path_buf(),
                            source: err,
                        })
                    }
                }
            }
        };

        if !has_extension(&image_path, extension) {
            continue;
        }
        let Some(file_name) = image_path.file_name().map(PathBuf::from) else {
            continue;
        };

        let label_path = layout.label_path_for(&file_name);
        if label_path.is_file() {
            discovery.samples.push(Sample {
                image_path,
                label_path,
                file_name,
            });
        } else {
            discovery.unmatched.push(file_name);
        }
    }

    Ok(discovery)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}

/// Shuffle in place, deterministically when `seed` is given.
pub fn shuffle_samples<T>(items: &mut [T], seed: Option<u64>) {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        items.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        items.shuffle(&mut rng);
    }
}

/// Copy an image and its label into `<output_dir>/<split>/{images,labels}`.
pub fn copy_sample(sample: &Sample, output_dir: &Path, split: Split) -> Result<(), SbdError> {
    let image_dst = split.images_dir(output_dir).join(&sample.file_name);
    let label_dst = split.labels_dir(output_dir).join(sample.label_file_name());

    debug!(
        "Copying {} -> {}",
        sample.image_path.display(),
        image_dst.display()
    );
    copy_with_metadata(&sample.image_path, &image_dst)?;
    copy_with_metadata(&sample.label_path, &label_dst)
}

/// Copy contents and permissions, then carry over access/modification times.
fn copy_with_metadata(from: &Path, to: &Path) -> Result<(), SbdError> {
    let copy_failed = |source: std::io::Error| SbdError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    fs::copy(from, to).map_err(copy_failed)?;
    preserve_times(from, to).map_err(copy_failed)
}

#[cfg(not(windows))]
fn preserve_times(from: &Path, to: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(from)?;
    let mut times = fs::FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    // A read-only handle is enough for the owner, and still works after
    // `fs::copy` carried over read-only permissions.
    fs::File::open(to)?.set_times(times)
}

// CopyFileExW already preserves timestamps.
#[cfg(windows)]
fn preserve_times(_from: &Path, _to: &Path) -> std::io::Result<()> {
    Ok(())
}
