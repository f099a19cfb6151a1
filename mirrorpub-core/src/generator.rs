//! External "new article" generators and the `created:` line they print

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::{Error, Result};

/// Runs a destination's article generator
pub trait Generator: Send + Sync {
    /// Run `command` in `cwd` and return its stdout
    fn run(&self, cwd: &Path, command: &[String]) -> Result<String>;
}

/// Spawns the generator as a subprocess
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandGenerator;

impl Generator for CommandGenerator {
    fn run(&self, cwd: &Path, command: &[String]) -> Result<String> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("generator command is empty".to_string()))?;

        debug!(?command, cwd = %cwd.display(), "Running generator");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| Error::Other(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            return Err(Error::command(program, &args, &output.stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// File name reported on the single `created:` line of generator output
///
/// The output may carry unrelated notices (version banners and the like). The path may be
/// wrapped in ANSI color sequences and prefixed with a directory; both are removed.
pub fn extract_created_name(output: &str) -> Result<String> {
    let created: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("created:"))
        .collect();

    let [line] = created.as_slice() else {
        return Err(Error::ContentValidation(format!(
            "expected exactly one 'created:' line in generator output, found {}:\n{}",
            created.len(),
            output
        )));
    };

    let path = strip_ansi(line.trim().trim_start_matches("created:").trim_start());
    let name = path.rsplit('/').next().unwrap_or(&path).to_string();
    debug!(name = %name, "Generator reported created file");
    Ok(name)
}

/// Check that the generator created `expected`
pub fn validate_created(expected: &str, created: &str) -> Result<()> {
    if created != expected {
        return Err(Error::ContentValidation(format!(
            "created file {:?} does not match the expected name {:?}",
            created, expected
        )));
    }
    info!(file = %created, "Created");
    Ok(())
}

/// Remove `ESC [ ... m` color sequences
fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("\x1b[") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        match tail.find('m') {
            Some(end) => rest = &tail[end + 1..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
