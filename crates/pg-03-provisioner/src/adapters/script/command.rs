//! External command execution with captured output.

use crate::domain::errors::ProvisionerError;
use std::path::Path;
use std::process::{Command, Stdio};

/// Environment flag telling the resource scripts to run non-interactively
/// and print JSON.
pub const API_MODE_ENV: &str = "BASPHERE_API_MODE";

pub(crate) struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A resource script invocation in API mode.
pub(crate) fn api_command(script: &Path, owner: &str) -> Command {
    let mut cmd = Command::new(script);
    cmd.arg("--api").arg("--user").arg(owner).env(API_MODE_ENV, "1");
    cmd
}

/// Run `cmd` to completion. A non-zero exit is a `CommandFailed` carrying
/// both output streams.
pub(crate) fn run(action: &'static str, mut cmd: Command) -> Result<CommandOutput, ProvisionerError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!("[pg-03] {}: running {:?}", action, cmd);

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ProvisionerError::CommandFailed {
            action,
            detail: format!("could not start {}: {}", program, e),
            stdout: String::new(),
            stderr: String::new(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        tracing::warn!("[pg-03] {} failed: {} ({})", action, output.status, stderr.trim());
        return Err(ProvisionerError::CommandFailed {
            action,
            detail: output.status.to_string(),
            stdout,
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}
