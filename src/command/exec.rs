use std::path::Path;

use tracing::{debug, info};

use crate::error::ProcessError;

/// A ready-to-run external program.
///
/// Views yield one through [`Cmd::exec`](super::Cmd::exec); the App releases
/// the terminal, runs it to completion and resumes with `ExecFinished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Added on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run the program with inherited stdio and wait for it to exit.
    pub async fn run(&self) -> Result<(), ProcessError> {
        info!("Handing terminal to {} {:?}", self.program, self.args);
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .status()
            .await
            .map_err(|e| ProcessError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        debug!("{} exited with {status}", self.program);
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Exit {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}

/// Open `path` in the user's editor: `$VISUAL`, then `$EDITOR`, then `vi`.
///
/// The path is also exported as `LAZYINFRA_INVENTORY` for editor wrappers.
pub fn editor_command(path: &Path) -> ExternalCommand {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string());

    // Editors are often configured with flags, e.g. "code --wait"
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    ExternalCommand::new(program)
        .args(parts)
        .arg(path.display().to_string())
        .env("LAZYINFRA_INVENTORY", path.display().to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_exit() {
        assert_eq!(ExternalCommand::new("true").run().await, Ok(()));
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_code() {
        let result = ExternalCommand::new("sh").args(["-c", "exit 3"]).run().await;
        assert_eq!(
            result,
            Err(ProcessError::Exit {
                program: "sh".to_string(),
                code: Some(3),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let result = ExternalCommand::new("lazyinfra-no-such-program").run().await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_env_reaches_the_child() {
        let result = ExternalCommand::new("sh")
            .args(["-c", "test \"$LAZYINFRA_PROBE\" = on"])
            .env("LAZYINFRA_PROBE", "on")
            .run()
            .await;
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_editor_flags_are_split() {
        let cmd = ExternalCommand::new("code").args(["--wait"]).arg("inv.json");
        assert_eq!(cmd.args, vec!["--wait", "inv.json"]);
    }
}
