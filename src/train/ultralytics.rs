//! Trainer backed by the Ultralytics `yolo` command-line tool.
//!
//! Runs `yolo detect train key=value ...` as a child process with inherited
//! stdio, so the trainer's own progress output reaches the terminal.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use super::{TrainRequest, Trainer};
use crate::error::SbdError;

/// Executable looked up on `PATH` when no explicit program is given.
pub const DEFAULT_YOLO_BIN: &str = "yolo";

/// Launches the Ultralytics CLI.
#[derive(Clone, Debug)]
pub struct UltralyticsCli {
    program: PathBuf,
}

impl Default for UltralyticsCli {
    fn default() -> Self {
        Self::new(DEFAULT_YOLO_BIN)
    }
}

impl UltralyticsCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the command for a request without running it.
    pub fn command(&self, request: &TrainRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("detect").arg("train").args(request.to_cli_args());
        cmd
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Trainer for UltralyticsCli {
    fn train(&self, request: &TrainRequest) -> Result<(), SbdError> {
        let mut cmd = self.command(request);
        info!("Launching {} with {}", self.program_name(), request.model);
        debug!("Trainer command: {:?}", cmd);

        let status = cmd.status().map_err(|source| SbdError::TrainerSpawn {
            program: self.program_name(),
            source,
        })?;

        if !status.success() {
            return Err(SbdError::TrainerFailed {
                program: self.program_name(),
                status,
            });
        }

        Ok(())
    }
}
