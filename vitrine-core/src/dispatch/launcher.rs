use std::{fmt::Debug, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use vitrine_model::ItemId;

use crate::error::LaunchError;

/// Starts one acquisition job and waits for it to finish.
#[async_trait]
pub trait JobLauncher: Send + Sync + Debug {
    async fn launch(&self, id: &ItemId) -> Result<(), LaunchError>;
}

/// Runs `program args... <id>` directly, without a shell, so the identifier
/// is always a single argument.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command(&self, id: &ItemId) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(id.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl JobLauncher for CommandLauncher {
    async fn launch(&self, id: &ItemId) -> Result<(), LaunchError> {
        debug!(program = %self.program, args = ?self.args, item_id = %id, "spawning job");
        let status = self
            .command(id)
            .status()
            .await
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::Exited {
                program: self.program.clone(),
                status,
            })
        }
    }
}
