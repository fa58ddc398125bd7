//! sbd: dataset preparation and training for small-boat detection.
//!
//! Two independent tools working on satellite image patches:
//!
//! - [`split`]: partition labeled `png/` + `labels/` patches into
//!   train/val/test and write an Ultralytics `data.yaml`.
//! - [`train`]: write a `data.yaml` for existing splits and launch a YOLO
//!   training run through a [`train::Trainer`].
//!
//! # Modules
//!
//! - [`dataset`]: filesystem layout and the `data.yaml` description
//! - [`split`]: the dataset splitter and its report
//! - [`train`]: the training launcher and the Ultralytics CLI backend
//! - [`error`]: error types for sbd operations

pub mod dataset;
pub mod error;
pub mod logging;
pub mod split;
pub mod train;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::SbdError;

use dataset::{read_data_yaml, DATA_YAML_FILE_NAME, DEFAULT_IMAGE_EXTENSION};
use split::{split_dataset, SplitOptions, SplitRatios};
use train::{
    parse_override, train_model, Hyperparameters, TrainOptions, UltralyticsCli,
    DEFAULT_BASE_MODEL, DEFAULT_MODEL_NAME, DEFAULT_YOLO_BIN,
};

/// The sbd CLI application.
#[derive(Parser)]
#[command(name = "sbd")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log per-file detail (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split labeled patches into train/val/test and write data.yaml.
    Split(SplitArgs),
    /// Write data.yaml for existing splits and launch YOLO training.
    Train(TrainArgs),
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Directory containing png/ and labels/.
    patches_dir: PathBuf,

    /// Directory to create train/, val/, test/ and data.yaml in.
    output_dir: PathBuf,

    /// Fraction of samples for training.
    #[arg(long, default_value_t = 0.7)]
    train_ratio: f64,

    /// Fraction of samples for validation.
    #[arg(long, default_value_t = 0.2)]
    val_ratio: f64,

    /// Fraction of samples for testing (test always receives the remainder).
    #[arg(long, default_value_t = 0.1)]
    test_ratio: f64,

    /// Class name, repeated in class-id order. Defaults to a single 'class0'.
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,

    /// Seed for a reproducible shuffle.
    #[arg(long)]
    seed: Option<u64>,

    /// Image extension to pick up from png/ (case-sensitive).
    #[arg(long = "ext", default_value = DEFAULT_IMAGE_EXTENSION)]
    image_extension: String,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the train subcommand.
#[derive(clap::Args)]
struct TrainArgs {
    /// Directory receiving data.yaml and the training run.
    #[arg(long)]
    output_dir: PathBuf,

    /// Take train/val paths and class names from <DIR>/data.yaml.
    #[arg(long, value_name = "DIR", conflicts_with_all = ["train_images", "val_images"])]
    from_split: Option<PathBuf>,

    /// Training images directory.
    #[arg(long, value_name = "DIR")]
    train_images: Option<PathBuf>,

    /// Validation images directory.
    #[arg(long, value_name = "DIR")]
    val_images: Option<PathBuf>,

    /// Class name, repeated in class-id order.
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,

    /// Checkpoint to start from instead of the base model.
    #[arg(long, value_name = "PATH")]
    pretrained: Option<PathBuf>,

    /// Base model identifier used without --pretrained.
    #[arg(long, default_value = DEFAULT_BASE_MODEL)]
    base_model: String,

    /// Run name; results land in <OUTPUT_DIR>/<NAME>.
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    name: String,

    #[arg(long, default_value_t = 100)]
    epochs: u32,

    #[arg(long, default_value_t = 512)]
    imgsz: u32,

    #[arg(long, default_value_t = 64, allow_negative_numbers = true)]
    batch: i32,

    /// Initial learning rate.
    #[arg(long, default_value_t = 1e-4)]
    lr0: f64,

    /// Early-stopping patience in epochs.
    #[arg(long, default_value_t = 20)]
    patience: u32,

    /// Copy-paste augmentation probability.
    #[arg(long, default_value_t = 0.0)]
    copy_paste: f64,

    /// Extra trainer argument passed through verbatim (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Ultralytics executable.
    #[arg(long, env = "SBD_YOLO_BIN", default_value = DEFAULT_YOLO_BIN)]
    yolo_bin: PathBuf,
}

/// Run the sbd CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SbdError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Train(args)) => run_train(args),
        None => {
            println!("sbd {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset preparation and YOLO training for small-boat detection.");
            println!();
            println!("Run 'sbd --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), SbdError> {
    let opts = SplitOptions {
        patches_dir: args.patches_dir,
        output_dir: args.output_dir,
        ratios: SplitRatios::new(args.train_ratio, args.val_ratio, args.test_ratio),
        classes: (!args.classes.is_empty()).then_some(args.classes),
        seed: args.seed,
        image_extension: args.image_extension,
    };

    let report = split_dataset(&opts)?;

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    Ok(())
}

/// Execute the train subcommand.
fn run_train(args: TrainArgs) -> Result<(), SbdError> {
    let (train_images_dir, val_images_dir, classes) = match args.from_split {
        Some(dir) => {
            let data = read_data_yaml(&dir.join(DATA_YAML_FILE_NAME))?;
            let classes = if args.classes.is_empty() {
                data.names
            } else {
                args.classes
            };
            (data.train, data.val, classes)
        }
        None => match (args.train_images, args.val_images) {
            (Some(train), Some(val)) => (train, val, args.classes),
            _ => {
                return Err(SbdError::InvalidArgument(
                    "pass --from-split or both --train-images and --val-images".to_string(),
                ));
            }
        },
    };

    let extra = args
        .overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = TrainOptions {
        train_images_dir,
        val_images_dir,
        classes,
        output_dir: args.output_dir,
        pretrained_model: args.pretrained,
        base_model: args.base_model,
        model_name: args.name,
        hyperparameters: Hyperparameters {
            epochs: args.epochs,
            imgsz: args.imgsz,
            batch: args.batch,
            learning_rate: args.lr0,
            patience: args.patience,
            copy_paste: args.copy_paste,
            extra,
        },
    };

    let trainer = UltralyticsCli::new(args.yolo_bin);
    let best = train_model(&opts, &trainer)?;
    println!("{}", best.display());

    Ok(())
}
