//! Azure CLI command execution.
//!
//! Provides utilities for running Azure CLI commands and parsing their output.

use crate::error::{ArmError, Result};
use colored::Colorize;
use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

/// Largest stdout accepted from a single command (one graph page of full documents).
const MAX_OUTPUT_BYTES: usize = 20_000_000;

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a shell command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err(ArmError::Transport)` - If the command fails or produces too much output;
///   the message carries the command's stderr
pub fn run(cmd: &str) -> Result<String> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);

    let Some((program, args)) = cmds.split_first() else {
        return Err(ArmError::Transport("empty command".to_string()));
    };

    let output = Command::new(program).args(args).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        ArmError::Transport(format!("Failed to execute command: {}", e))
    })?;

    if output.status.success() {
        log::debug!("Success cmd: {cmd}");
        log::debug!("Success output.stdout.len(): {}", output.stdout.len());

        if output.stdout.len() > MAX_OUTPUT_BYTES {
            return Err(ArmError::Transport(format!(
                "Response too large: {} bytes for command: {:?}",
                output.stdout.len(),
                cmds
            )));
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(ArmError::Transport(format!("ERROR running: {stderr}")));
    }

    String::from_utf8(output.stdout).map_err(|e| ArmError::Transport(format!("Invalid UTF-8: {}", e)))
}

/// [`run`] on the blocking pool, for use from async code.
pub async fn run_async(cmd: String) -> Result<String> {
    tokio::task::spawn_blocking(move || run(&cmd))
        .await
        .map_err(|e| ArmError::Transport(format!("az task failed: {e}")))?
}

/// True when a CLI failure message reports a missing resource.
pub fn is_not_found(message: &str) -> bool {
    message.contains("(ResourceNotFound)") || message.contains("was not found")
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .filter(|s| !s.is_empty())
        .collect()
}
