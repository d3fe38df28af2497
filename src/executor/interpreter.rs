//! Interpreter-backed executor
//!
//! Each script runs in its own interpreter process with the source piped on
//! stdin, so nothing a notebook defines survives into the next one.

use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{ExecutionError, Executor};
use crate::config::InterpreterConfig;

/// Executor that pipes the script into an external interpreter
#[derive(Clone, Debug)]
pub struct InterpreterExecutor {
    program: String,
    args: Vec<String>,
}

impl InterpreterExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self::new(&config.program).with_args(&config.args)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Executor for InterpreterExecutor {
    async fn execute(&self, source: &str, working_dir: &Path) -> Result<String, ExecutionError> {
        debug!(
            "Starting {} {:?} in {}",
            self.program,
            self.args,
            working_dir.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "interpreter has no stdin"))?;

        // Feed stdin while stderr is drained so a chatty script cannot block us
        let script = source.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&script).await;
            drop(stdin);
            result
        });

        let output = child.wait_with_output().await?;
        let write_result = writer.await.map_err(io::Error::other)?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ExecutionError::Failed {
                code: output.status.code(),
                trace: stderr,
            });
        }

        if let Err(e) = write_result {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
            debug!("Interpreter closed stdin early: {}", e);
        }

        Ok(stderr)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn shell() -> InterpreterExecutor {
        InterpreterExecutor::new("sh").with_args(["-s"])
    }

    #[test]
    fn test_python_defaults() {
        let executor = InterpreterExecutor::from_config(&InterpreterConfig::default());
        assert_eq!(executor.program(), "python3");
        assert_eq!(executor.args, vec!["-".to_string()]);
    }

    #[test]
    fn test_from_config() {
        let config = InterpreterConfig {
            program: "python3.12".to_string(),
            args: vec!["-u".to_string(), "-".to_string()],
        };
        let executor = InterpreterExecutor::from_config(&config);
        assert_eq!(executor.program(), "python3.12");
        assert_eq!(executor.args, vec!["-u", "-"]);
    }

    #[tokio::test]
    async fn test_successful_script() {
        let dir = tempdir().unwrap();
        let result = shell().execute("x=1\nexit 0\n", dir.path()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failing_script_captures_trace() {
        let dir = tempdir().unwrap();
        let err = shell()
            .execute("echo 'ValueError: boom' >&2\nexit 3\n", dir.path())
            .await
            .unwrap_err();

        match err {
            ExecutionError::Failed { code, trace } => {
                assert_eq!(code, Some(3));
                assert!(trace.contains("ValueError: boom"));
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_returns_stderr() {
        let dir = tempdir().unwrap();
        let stderr = shell()
            .execute("echo 'DeprecationWarning: old api' >&2\nexit 0\n", dir.path())
            .await
            .unwrap();
        assert_eq!(stderr, "DeprecationWarning: old api\n");
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();
        let result = shell().execute("test -f data.csv\n", dir.path()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_each_script_gets_a_fresh_process() {
        let dir = tempdir().unwrap();
        let executor = shell();
        executor
            .execute("LEAKED=yes\nexport LEAKED\n", dir.path())
            .await
            .unwrap();
        let result = executor.execute("test -z \"$LEAKED\"\n", dir.path()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = tempdir().unwrap();
        let err = InterpreterExecutor::new("nb-runner-no-such-interpreter")
            .execute("pass", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Spawn { .. }));
    }
}
