use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for sbd operations.
#[derive(Debug, Error)]
pub enum SbdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid patch layout at {path}: {message}")]
    SourceLayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while traversing {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to write data.yaml to {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse data.yaml from {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to launch trainer '{program}': {source}")]
    TrainerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Trainer '{program}' exited unsuccessfully ({status})")]
    TrainerFailed { program: String, status: ExitStatus },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
