//! [`CommandRunner`] backed by `std::process`.

use super::{CommandLine, CommandOutput, CommandRunner};
use crate::release::error::{Error, Result};
use std::{
    io::Read,
    process::{Command, Stdio},
    thread,
};
use wait_timeout::ChildExt;

/// Spawns real processes and waits for them with a timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut stream) = stream {
            let mut bytes = Vec::new();
            if stream.read_to_end(&mut bytes).is_ok() {
                text = String::from_utf8_lossy(&bytes).into_owned();
            }
        }
        text
    })
}

impl CommandRunner for ProcessCommandRunner {
    fn execute(&self, command: &CommandLine) -> Result<CommandOutput> {
        let program = which::which(&command.program).map_err(|e| {
            Error::tool(format!("`{}` not found in PATH: {}", command.program, e))
        })?;

        let mut process = Command::new(program);
        process
            .args(command.arg_values())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            process.current_dir(dir);
        }
        for (key, value) in &command.env {
            process.env(key, value);
        }

        let mut child = process.spawn().map_err(|e| Error::CommandFailed {
            command: command.to_string(),
            code: -1,
            stderr: e.to_string(),
        })?;

        // Pipes are drained on their own threads so a chatty tool can't block
        // on a full buffer while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(command.timeout)? {
            Some(status) => status,
            None => {
                log::warn!(
                    "{} timed out after {}s, terminating",
                    command,
                    command.timeout.as_secs()
                );
                child.kill()?;
                child.wait()?;
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    code: -1,
                    stderr: format!("timed out after {}s", command.timeout.as_secs()),
                });
            }
        };

        let join = |handle: thread::JoinHandle<String>| handle.join().unwrap_or_default();
        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            stdout: join(stdout),
            stderr: join(stderr),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn captures_output_and_exit_code() {
        let runner = ProcessCommandRunner::new();
        let output = runner
            .execute(&CommandLine::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();
        assert_eq!(output.code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn kills_on_timeout() {
        let runner = ProcessCommandRunner::new();
        let command = CommandLine::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(100));
        let err = runner.execute(&command).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: -1, .. }));
    }

    #[test]
    fn missing_program_is_a_tool_error() {
        let runner = ProcessCommandRunner::new();
        let err = runner
            .execute(&CommandLine::new("definitely-not-a-real-tool-name"))
            .unwrap_err();
        assert!(matches!(err, Error::ToolProcessing(_)));
    }
}
