//! The environment-executor boundary.
//!
//! The core never interprets command strings; it hands a project's opaque
//! command list, a working directory, and an environment to an [`Executor`]
//! and waits for the blocking call to finish. Timeouts, retries, and
//! cancellation all live on the other side of this seam.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

pub trait Executor {
    /// Run the commands in order against `project_dir`, with `env` added to
    /// the process environment. Stops at the first failing command.
    fn run(&self, project_dir: &Path, env: &[(String, String)], commands: &[String])
        -> Result<()>;
}

/// Runs each command through `sh -c` with the project directory as cwd.
#[derive(Default)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
    fn run(
        &self,
        project_dir: &Path,
        env: &[(String, String)],
        commands: &[String],
    ) -> Result<()> {
        for command in commands {
            let mut child = Command::new("sh");
            child.arg("-c").arg(command).current_dir(project_dir);
            for (key, value) in env {
                child.env(key, value);
            }
            let status = child.status().map_err(|e| {
                Error::io(format!("cannot run '{}'", command), e)
            })?;
            if !status.success() {
                return Err(Error::Io {
                    context: format!("command failed: '{}'", command),
                    detail: status
                        .code()
                        .map(|c| format!("exit code {}", c))
                        .unwrap_or_else(|| "terminated by signal".to_string()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records every run instead of executing; optionally fails after a
    /// given number of calls.
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub runs: RefCell<Vec<(String, Vec<String>)>>,
        pub fail_after: Option<usize>,
    }

    impl Executor for RecordingExecutor {
        fn run(
            &self,
            project_dir: &Path,
            _env: &[(String, String)],
            commands: &[String],
        ) -> Result<()> {
            let mut runs = self.runs.borrow_mut();
            if self.fail_after.is_some_and(|n| runs.len() >= n) {
                return Err(Error::Io {
                    context: "command failed".to_string(),
                    detail: "injected failure".to_string(),
                });
            }
            runs.push((
                project_dir.display().to_string(),
                commands.to_vec(),
            ));
            Ok(())
        }
    }
}
