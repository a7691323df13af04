use crate::error::{RollError, Result};
use crate::publish::{ArchivePublisher, Release};
use std::collections::HashMap;
use std::process::Command;

/// Captured result of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human readable failure report with the captured streams
    pub fn describe_failure(&self, program: &str) -> String {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        format!(
            "{} exited with {}\nStdout: {}\nStderr: {}",
            program,
            code,
            self.stdout.trim_end(),
            self.stderr.trim_end()
        )
    }
}

/// Publishes by running external commands.
///
/// The access check and the publish command are argv vectors. Both run with
/// `ROLL_DEV_*` variables describing the release in their environment.
pub struct CommandPublisher {
    access_check: Vec<String>,
    command: Vec<String>,
}

impl CommandPublisher {
    /// An empty `access_check` means access is assumed
    pub fn new(access_check: Vec<String>, command: Vec<String>) -> Self {
        CommandPublisher {
            access_check,
            command,
        }
    }
}

impl Release {
    /// Environment handed to publish commands
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("ROLL_DEV_VERSION".to_string(), self.version.to_string());
        env.insert("ROLL_DEV_TAG".to_string(), self.tag.clone());
        env.insert("ROLL_DEV_COMMIT".to_string(), self.commit.clone());
        env.insert("ROLL_DEV_CHANNEL".to_string(), self.channel.clone());

        env
    }
}

/// Run `argv` to completion and capture its output.
///
/// Only a failure to start the program is an error here; the caller
/// decides what a non-zero exit means.
pub fn run_command(argv: &[String], env: &HashMap<String, String>) -> std::io::Result<CommandOutput> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
    })?;

    log::debug!("running {:?}", argv);
    let output = Command::new(program).args(args).envs(env).output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}

impl ArchivePublisher for CommandPublisher {
    fn check_access(&self) -> Result<()> {
        if self.access_check.is_empty() {
            log::debug!("no access check configured");
            return Ok(());
        }

        let program = self.access_check.join(" ");
        let output = run_command(&self.access_check, &HashMap::new())
            .map_err(|e| RollError::access(format!("Failed to run {}: {}", program, e)))?;

        if !output.success() {
            return Err(RollError::access(output.describe_failure(&program)));
        }
        Ok(())
    }

    fn publish(&self, release: &Release) -> Result<()> {
        let program = self.command.join(" ");
        let output = run_command(&self.command, &release.to_env_vars())
            .map_err(|e| RollError::publish(format!("Failed to run {}: {}", program, e)))?;

        if !output.success() {
            return Err(RollError::publish(output.describe_failure(&program)));
        }

        log::info!("published {} via {}", release.tag, program);
        Ok(())
    }
}
