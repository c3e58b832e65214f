//! External clean/smudge drivers.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{FilterError, FilterResult};
use crate::list::{Filter, FilterSource};

/// Runs a configured shell command with the content on stdin and takes
/// its stdout as the filtered content.
///
/// The call blocks until the process exits. Non-required drivers that fail
/// to start or exit unsuccessfully pass the content through unchanged.
#[derive(Clone, Debug)]
pub struct DriverFilter {
    name: String,
    command: String,
    required: bool,
}

impl DriverFilter {
    pub fn new(name: impl Into<String>, command: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            required,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn run(&self, source: &FilterSource, input: &[u8]) -> FilterResult<Result<Vec<u8>, String>> {
        let command = self.command.replace("%f", &shell_quote(&source.path));
        let spawn_err = |e: std::io::Error| FilterError::DriverSpawn {
            driver: self.name.clone(),
            command: command.clone(),
            source: e,
        };

        let mut child = shell(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;
        let mut stdin = child.stdin.take();

        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin.as_mut() {
                Some(pipe) => pipe.write_all(input),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output.map_err(spawn_err)?;

        match written {
            Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Ok(Err(format!("writing stdin: {e}")));
            }
            Err(_) => return Ok(Err("stdin writer panicked".into())),
            _ => {}
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Ok(Err(format!("{}: {}", output.status, stderr.trim())));
        }
        debug!(driver = %self.name, path = %source.path, bytes = output.stdout.len(), "driver filtered content");
        Ok(Ok(output.stdout))
    }
}

impl Filter for DriverFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, source: &FilterSource, input: Vec<u8>) -> FilterResult<Vec<u8>> {
        let outcome = match self.run(source, &input) {
            Ok(outcome) => outcome,
            Err(e) if self.required => return Err(e),
            Err(e) => Err(e.to_string()),
        };
        match outcome {
            Ok(output) => Ok(output),
            Err(reason) if self.required => Err(FilterError::DriverFailed {
                driver: self.name.clone(),
                path: source.path.clone(),
                reason,
            }),
            Err(reason) => {
                warn!(driver = %self.name, path = %source.path, %reason, "optional filter driver failed; passing content through");
                Ok(input)
            }
        }
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// `cmd` has no single quotes; wrap in double quotes and double any
/// embedded ones.
#[cfg(windows)]
fn shell_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
