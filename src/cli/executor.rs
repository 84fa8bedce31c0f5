//! Process execution of the external CLI
//!
//! Arguments are always handed to the OS as a literal list. Nothing here is
//! ever joined into a shell string.

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::process::Stdio;
use tracing::{debug, trace};

use crate::errors::{ClientError, ClientResult};

/// Captured result of one program invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability: run program P with argument list A
#[async_trait]
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    async fn run(&self, program: &str, args: &[String]) -> ClientResult<ProcessOutput>;
}

/// Runs the program with `tokio::process`
///
/// The child is killed if the returned future is dropped, which is what
/// happens when a confirmation deadline fires mid-call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl CommandRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> ClientResult<ProcessOutput> {
        trace!(program = %program, args = ?args, "Spawning CLI process");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ClientError::io(program, e))?;

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}

/// Run and return stdout, mapping unsuccessful exits to `ClientError::Execution`
///
/// A nonzero exit whose stdout is still a JSON document is passed through: the
/// CLI prints the ledger's structured response even when it rejects a
/// transaction, and the caller needs `raw_log` from it.
pub async fn execute_raw(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> ClientResult<Vec<u8>> {
    let output = runner.run(program, args).await?;

    if output.success() {
        return Ok(output.stdout);
    }

    if serde_json::from_slice::<IgnoredAny>(&output.stdout).is_ok() {
        debug!(
            program = %program,
            exit_code = ?output.exit_code,
            "CLI exited unsuccessfully with a JSON response"
        );
        return Ok(output.stdout);
    }

    Err(ClientError::Execution {
        program: program.to_string(),
        exit_code: output.exit_code,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Decode bytes as JSON into `T`, returning the serde error verbatim
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedRunner, ScriptedResponse};

    fn args() -> Vec<String> {
        vec!["query".to_string(), "tx".to_string()]
    }

    #[tokio::test]
    async fn test_success_returns_stdout() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::stdout(r#"{"a":1}"#)]);
        let out = execute_raw(&runner, "provider-services", &args()).await.unwrap();
        assert_eq!(out, br#"{"a":1}"#.to_vec());
        assert_eq!(runner.calls()[0], args());
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_text_is_execution_error() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::failure(
            1,
            "Error: tx (ABC) not found",
        )]);
        let err = execute_raw(&runner, "provider-services", &args())
            .await
            .unwrap_err();
        match err {
            ClientError::Execution {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "Error: tx (ABC) not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_json_stdout_passes_through() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::exit_with_stdout(
            1,
            r#"{"txhash":"X","raw_log":"out of gas","logs":[]}"#,
        )]);
        let out = execute_raw(&runner, "provider-services", &args()).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("out of gas"));
    }

    #[test]
    fn test_decode_json_surfaces_serde_error() {
        let err = decode_json::<serde_json::Value>(b"Error: not found").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_tokio_runner_reports_missing_program() {
        let runner = TokioProcessRunner;
        let err = runner
            .run("definitely-not-an-installed-program-7f3a", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
