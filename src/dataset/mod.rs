//! Filesystem layout shared by the splitter and the training launcher.
//!
//! Source patches live in a flat layout:
//!
//! ```text
//! <patches_dir>/png/<stem>.png
//! <patches_dir>/labels/<stem>.txt
//! ```
//!
//! Split output follows the Ultralytics convention:
//!
//! ```text
//! <output_dir>/{train,val,test}/{images,labels}/
//! <output_dir>/data.yaml
//! ```

pub mod data_yaml;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SbdError;

pub use data_yaml::{read_data_yaml, write_data_yaml, DataYaml, DATA_YAML_FILE_NAME};

/// Source sub-directory holding the image patches.
pub const SOURCE_IMAGES_DIR: &str = "png";
/// Source sub-directory holding the YOLO label files.
pub const SOURCE_LABELS_DIR: &str = "labels";
/// Default extension used to enumerate source images.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";
pub const LABEL_EXTENSION: &str = "txt";

/// Class name used when the caller supplies no class list.
pub const DEFAULT_CLASS_NAME: &str = "class0";

/// One of the three dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// All splits, in the order samples are assigned to them.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Directory name of the split under the output root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// `<output_dir>/<split>`
    pub fn root(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.as_str())
    }

    /// `<output_dir>/<split>/images`
    pub fn images_dir(&self, output_dir: &Path) -> PathBuf {
        self.root(output_dir).join("images")
    }

    /// `<output_dir>/<split>/labels`
    pub fn labels_dir(&self, output_dir: &Path) -> PathBuf {
        self.root(output_dir).join("labels")
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source directory of labeled image patches.
#[derive(Clone, Debug)]
pub struct PatchLayout {
    images_dir: PathBuf,
    labels_dir: PathBuf,
}

impl PatchLayout {
    pub fn new(patches_dir: &Path) -> Self {
        Self {
            images_dir: patches_dir.join(SOURCE_IMAGES_DIR),
            labels_dir: patches_dir.join(SOURCE_LABELS_DIR),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn labels_dir(&self) -> &Path {
        &self.labels_dir
    }

    /// Check that both `png/` and `labels/` exist as directories.
    pub fn validate(&self) -> Result<(), SbdError> {
        if !self.images_dir.is_dir() {
            return Err(SbdError::SourceLayoutInvalid {
                path: self.images_dir.clone(),
                message: format!("missing {}/ directory", SOURCE_IMAGES_DIR),
            });
        }

        if !self.labels_dir.is_dir() {
            return Err(SbdError::SourceLayoutInvalid {
                path: self.labels_dir.clone(),
                message: format!("missing {}/ directory", SOURCE_LABELS_DIR),
            });
        }

        Ok(())
    }

    /// Label file expected for an image file name (same stem, `.txt`).
    pub fn label_path_for(&self, image_file_name: &Path) -> PathBuf {
        self.labels_dir.join(label_file_name(image_file_name))
    }
}

/// Label file name for an image file name: the stem with a `.txt` extension.
pub fn label_file_name(image_file_name: &Path) -> PathBuf {
    image_file_name.with_extension(LABEL_EXTENSION)
}

/// Resolve the class list written to `data.yaml`.
///
/// `None` or an empty list falls back to a single synthetic class named
/// [`DEFAULT_CLASS_NAME`], so the resulting list always has `nc >= 1`.
pub fn resolve_class_names(classes: Option<&[String]>) -> Vec<String> {
    match classes {
        Some(names) if !names.is_empty() => names.to_vec(),
        _ => vec![DEFAULT_CLASS_NAME.to_string()],
    }
}
