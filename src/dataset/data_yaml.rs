//! Ultralytics `data.yaml` dataset description.
//!
//! The file binds split image directories to the class list:
//!
//! ```yaml
//! train: /abs/out/train/images
//! val: /abs/out/val/images
//! test: /abs/out/test/images
//! nc: 1
//! names:
//! - class0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Split;
use crate::error::SbdError;

pub const DATA_YAML_FILE_NAME: &str = "data.yaml";

/// Upper bound on the class list rebuilt from an index-keyed `names` mapping.
const MAX_CLASS_COUNT: usize = 10_000;

/// Contents of a `data.yaml` file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataYaml")]
pub struct DataYaml {
    /// Training images directory.
    pub train: PathBuf,
    /// Validation images directory.
    pub val: PathBuf,
    /// Test images directory; omitted by the training launcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<PathBuf>,
    /// Number of classes.
    pub nc: usize,
    /// Ordered class names.
    pub names: Vec<String>,
}

impl DataYaml {
    /// Description of a split output directory, with absolute split paths.
    ///
    /// Paths are made absolute against the current directory without
    /// resolving symlinks.
    pub fn for_split_output(output_dir: &Path, names: Vec<String>) -> Result<Self, SbdError> {
        let abs = |split: Split| std::path::absolute(split.images_dir(output_dir));
        Ok(Self {
            train: abs(Split::Train)?,
            val: abs(Split::Val)?,
            test: Some(abs(Split::Test)?),
            nc: names.len(),
            names,
        })
    }

    /// Description used to launch training; paths are kept as given.
    pub fn for_training(train: &Path, val: &Path, names: Vec<String>) -> Self {
        Self {
            train: train.to_path_buf(),
            val: val.to_path_buf(),
            test: None,
            nc: names.len(),
            names,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDataYaml {
    train: PathBuf,
    val: PathBuf,
    #[serde(default)]
    test: Option<PathBuf>,
    #[serde(default)]
    nc: Option<usize>,
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

impl TryFrom<RawDataYaml> for DataYaml {
    type Error = String;

    fn try_from(raw: RawDataYaml) -> Result<Self, Self::Error> {
        let names = match raw.names {
            DataYamlNames::Sequence(names) => names,
            DataYamlNames::Mapping(mapping) => densify_names(mapping)?,
        };

        Ok(Self {
            train: raw.train,
            val: raw.val,
            test: raw.test,
            nc: raw.nc.unwrap_or(names.len()),
            names,
        })
    }
}

/// Turn an index -> name mapping into a dense list, naming gaps `class<N>`.
///
/// The dense list may hold at most [`MAX_CLASS_COUNT`] names.
fn densify_names(mapping: BTreeMap<usize, String>) -> Result<Vec<String>, String> {
    let Some(&max_index) = mapping.keys().next_back() else {
        return Ok(Vec::new());
    };

    let len = max_index
        .checked_add(1)
        .filter(|&len| len <= MAX_CLASS_COUNT)
        .ok_or_else(|| {
            format!(
                "class index {max_index} in names exceeds the limit of {MAX_CLASS_COUNT} classes"
            )
        })?;

    let mut names = vec![String::new(); len];
    for (index, name) in mapping {
        names[index] = name;
    }
    for (index, name) in names.iter_mut().enumerate() {
        if name.trim().is_empty() {
            *name = format!("class{}", index);
        }
    }
    Ok(names)
}

/// Render a [`DataYaml`] as YAML text.
pub fn to_yaml_string(data: &DataYaml, path: &Path) -> Result<String, SbdError> {
    serde_yaml::to_string(data).map_err(|source| SbdError::DataYamlWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `<dir>/data.yaml`, overwriting any existing file.
///
/// Returns the path of the written file.
pub fn write_data_yaml(dir: &Path, data: &DataYaml) -> Result<PathBuf, SbdError> {
    let path = dir.join(DATA_YAML_FILE_NAME);
    let yaml = to_yaml_string(data, &path)?;
    fs::write(&path, yaml).map_err(SbdError::Io)?;
    Ok(path)
}

/// Read a `data.yaml` file.
///
/// `names` may be either a list or an index-keyed mapping. A missing `nc`
/// defaults to the number of names.
pub fn read_data_yaml(path: &Path) -> Result<DataYaml, SbdError> {
    let data = fs::read_to_string(path).map_err(SbdError::Io)?;
    serde_yaml::from_str(&data).map_err(|source| SbdError::DataYamlParse {
        path: path.to_path_buf(),
        source,
    })
}
