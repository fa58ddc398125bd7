//! Training launcher.
//!
//! Writes a `data.yaml` for the given split directories, picks the model to
//! start from and hands everything to a [`Trainer`]. The actual training
//! loop, checkpointing and metrics belong to the trainer.

pub mod ultralytics;

pub use ultralytics::{UltralyticsCli, DEFAULT_YOLO_BIN};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::dataset::{write_data_yaml, DataYaml};
use crate::error::SbdError;

/// Base model used when no pretrained checkpoint is given.
pub const DEFAULT_BASE_MODEL: &str = "yolo11m.pt";
/// Run name, also the sub-directory of the output dir holding the results.
pub const DEFAULT_MODEL_NAME: &str = "yolo_model";

/// Where training starts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSource {
    /// A previously trained checkpoint on disk.
    Pretrained(PathBuf),
    /// A base model identifier resolved by the trainer (e.g. `yolo11m.pt`).
    Base(String),
}

impl ModelSource {
    /// A pretrained checkpoint wins over the base model identifier.
    pub fn select(pretrained: Option<&Path>, base_model: &str) -> Self {
        match pretrained {
            Some(path) => ModelSource::Pretrained(path.to_path_buf()),
            None => ModelSource::Base(base_model.to_string()),
        }
    }

    /// Value passed to the trainer's `model` argument.
    pub fn as_arg(&self) -> String {
        match self {
            ModelSource::Pretrained(path) => path.display().to_string(),
            ModelSource::Base(id) => id.clone(),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Pretrained(path) => write!(f, "pretrained checkpoint {}", path.display()),
            ModelSource::Base(id) => write!(f, "base model {}", id),
        }
    }
}

/// Hyperparameters forwarded to the trainer unchanged.
///
/// Nothing here is range-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperparameters {
    pub epochs: u32,
    pub imgsz: u32,
    pub batch: i32,
    /// Initial learning rate (`lr0`).
    pub learning_rate: f64,
    /// Early-stopping patience in epochs.
    pub patience: u32,
    /// Copy-paste augmentation probability.
    pub copy_paste: f64,
    /// Extra `key=value` trainer arguments, appended after the fixed set.
    pub extra: Vec<(String, String)>,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            epochs: 100,
            imgsz: 512,
            batch: 64,
            learning_rate: 1e-4,
            patience: 20,
            copy_paste: 0.0,
            extra: Vec::new(),
        }
    }
}

/// Options for [`train_model`].
#[derive(Clone, Debug)]
pub struct TrainOptions {
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
    pub classes: Vec<String>,
    /// Receives `data.yaml` and the trainer's run directory.
    pub output_dir: PathBuf,
    pub pretrained_model: Option<PathBuf>,
    pub base_model: String,
    pub model_name: String,
    pub hyperparameters: Hyperparameters,
}

impl TrainOptions {
    /// Options with the default base model, run name and hyperparameters.
    pub fn new(
        train_images_dir: impl Into<PathBuf>,
        val_images_dir: impl Into<PathBuf>,
        classes: Vec<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            train_images_dir: train_images_dir.into(),
            val_images_dir: val_images_dir.into(),
            classes,
            output_dir: output_dir.into(),
            pretrained_model: None,
            base_model: DEFAULT_BASE_MODEL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            hyperparameters: Hyperparameters::default(),
        }
    }
}

/// Everything a trainer needs for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainRequest {
    pub model: ModelSource,
    /// Path of the `data.yaml` describing the dataset.
    pub data: PathBuf,
    /// Output root; the run lands in `<project>/<name>`.
    pub project: PathBuf,
    pub name: String,
    pub params: Hyperparameters,
}

impl TrainRequest {
    /// Render as Ultralytics-style `key=value` arguments.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("data={}", self.data.display()),
            format!("model={}", self.model.as_arg()),
            format!("epochs={}", self.params.epochs),
            format!("imgsz={}", self.params.imgsz),
            format!("batch={}", self.params.batch),
            format!("lr0={}", self.params.learning_rate),
            format!("name={}", self.name),
            format!("patience={}", self.params.patience),
            format!("copy_paste={}", self.params.copy_paste),
            format!("project={}", self.project.display()),
        ];
        args.extend(
            self.params
                .extra
                .iter()
                .map(|(key, value)| format!("{key}={value}")),
        );
        args
    }
}

/// An external detection-model training routine.
pub trait Trainer {
    /// Run training to completion. Blocks until the trainer is done.
    fn train(&self, request: &TrainRequest) -> Result<(), SbdError>;
}

/// Launch training and return where the best checkpoint should end up.
///
/// The returned path is `<output_dir>/<model_name>/weights/best.pt`. It is
/// built by convention and not checked for existence.
pub fn train_model(opts: &TrainOptions, trainer: &dyn Trainer) -> Result<PathBuf, SbdError> {
    let model = ModelSource::select(opts.pretrained_model.as_deref(), &opts.base_model);
    match &model {
        ModelSource::Pretrained(path) => info!("Loaded pretrained model: {}", path.display()),
        ModelSource::Base(id) => warn!("No pretrained model provided; using base model {}", id),
    }

    fs::create_dir_all(&opts.output_dir).map_err(SbdError::Io)?;
    let data_yaml = DataYaml::for_training(
        &opts.train_images_dir,
        &opts.val_images_dir,
        opts.classes.clone(),
    );
    let data_yaml_path = write_data_yaml(&opts.output_dir, &data_yaml)?;

    let request = TrainRequest {
        model,
        data: data_yaml_path,
        project: opts.output_dir.clone(),
        name: opts.model_name.clone(),
        params: opts.hyperparameters.clone(),
    };
    trainer.train(&request)?;

    let best = best_model_path(&opts.output_dir, &opts.model_name);
    info!("Training finished; best model saved to {}", best.display());
    Ok(best)
}

/// `<output_dir>/<model_name>/weights/best.pt`
pub fn best_model_path(output_dir: &Path, model_name: &str) -> PathBuf {
    output_dir.join(model_name).join("weights").join("best.pt")
}

/// Parse a `key=value` trainer override.
pub fn parse_override(raw: &str) -> Result<(String, String), SbdError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        SbdError::InvalidArgument(format!("trainer override '{raw}' is not key=value"))
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(SbdError::InvalidArgument(format!(
            "trainer override '{raw}' has an empty key"
        )));
    }

    Ok((key.to_string(), value.to_string()))
}
