//! Split report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::SplitRatios;
use crate::dataset::Split;

/// Outcome of a [`split_dataset`](super::split_dataset) run.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    pub patches_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Images that had a matching label.
    pub labeled_images: usize,
    /// Images skipped because no label matched.
    pub unmatched_images: usize,
    /// Seed used for the shuffle, if one was fixed.
    pub seed: Option<u64>,
    pub ratios: SplitRatios,
    /// Per-split counts, in train/val/test order.
    pub splits: Vec<SplitSection>,
    /// Location of the written `data.yaml`.
    pub data_yaml: PathBuf,
    pub nc: usize,
    pub names: Vec<String>,
}

/// Samples assigned to one split.
#[derive(Clone, Debug, Serialize)]
pub struct SplitSection {
    pub split: Split,
    pub images: usize,
    /// Image file names in shuffled order.
    #[serde(skip)]
    pub files: Vec<PathBuf>,
}

impl SplitReport {
    fn section(&self, split: Split) -> Option<&SplitSection> {
        self.splits.iter().find(|s| s.split == split)
    }

    /// Number of samples copied into `split`.
    pub fn count(&self, split: Split) -> usize {
        self.section(split).map(|s| s.images).unwrap_or(0)
    }

    /// Image file names copied into `split`.
    pub fn files(&self, split: Split) -> &[PathBuf] {
        self.section(split).map(|s| s.files.as_slice()).unwrap_or(&[])
    }

    /// Total samples copied across all splits.
    pub fn total_copied(&self) -> usize {
        self.splits.iter().map(|s| s.images).sum()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Split {} labeled image(s) from {} into {}",
            self.labeled_images,
            self.patches_dir.display(),
            self.output_dir.display()
        )?;
        if self.unmatched_images > 0 {
            writeln!(
                f,
                "  skipped {} image(s) without labels",
                self.unmatched_images
            )?;
        }
        if let Some(seed) = self.seed {
            writeln!(f, "  seed: {}", seed)?;
        }
        writeln!(f)?;

        for section in &self.splits {
            writeln!(f, "  {:<5} {:>8}", section.split.as_str(), section.images)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "data.yaml: {} (nc={}, names=[{}])",
            self.data_yaml.display(),
            self.nc,
            self.names.join(", ")
        )
    }
}
