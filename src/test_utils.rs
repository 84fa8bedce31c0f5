//! Test Utilities Module
//!
//! Scripted stand-ins for the external CLI so the builder, poller and worker
//! can be exercised without a `provider-services` binary.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cli::{CliContext, CommandRunner, EnvLookup, ProcessOutput, StaticEnv};
use crate::errors::{ClientError, ClientResult};

/// One canned reply of the fake CLI
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
    /// Simulate the program not being spawnable at all
    pub spawn_error: bool,
}

impl ScriptedResponse {
    /// Exit 0 with the given stdout
    pub fn stdout(out: impl Into<String>) -> Self {
        Self {
            stdout: out.into().into_bytes(),
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// Nonzero exit with text on stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into().into_bytes(),
            exit_code: Some(code),
            ..Self::default()
        }
    }

    /// Nonzero exit that still prints something on stdout
    pub fn exit_with_stdout(code: i32, out: impl Into<String>) -> Self {
        Self {
            stdout: out.into().into_bytes(),
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn spawn_error() -> Self {
        Self {
            spawn_error: true,
            ..Self::default()
        }
    }

    /// Empty stdout: what the CLI prints before a transaction is indexed
    pub fn not_indexed() -> Self {
        Self::stdout("")
    }
}

#[derive(Debug, Default)]
struct Inner {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    fallback: Option<ScriptedResponse>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Fake CLI replaying responses in order and recording every invocation
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Inner>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self::build(responses, None, Duration::ZERO)
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Replays `responses`, then answers every further call with `fallback`
    pub fn with_fallback(responses: Vec<ScriptedResponse>, fallback: ScriptedResponse) -> Self {
        Self::build(responses, Some(fallback), Duration::ZERO)
    }

    /// Each call takes `delay` before answering
    pub fn with_delay(
        responses: Vec<ScriptedResponse>,
        fallback: Option<ScriptedResponse>,
        delay: Duration,
    ) -> Self {
        Self::build(responses, fallback, delay)
    }

    fn build(
        responses: Vec<ScriptedResponse>,
        fallback: Option<ScriptedResponse>,
        delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                responses: Mutex::new(responses.into()),
                fallback,
                delay,
                ..Inner::default()
            }),
        }
    }

    /// Argument lists of every call, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock_calls().iter().map(|(_, args)| args.clone()).collect()
    }

    /// Program names of every call, in call order
    pub fn programs(&self) -> Vec<String> {
        self.lock_calls().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Highest number of concurrently running calls observed
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, Vec<String>)>> {
        self.inner.calls.lock().expect("calls lock poisoned")
    }

    fn next_response(&self) -> Option<ScriptedResponse> {
        let mut responses = self.inner.responses.lock().expect("responses lock poisoned");
        responses.pop_front().or_else(|| self.inner.fallback.clone())
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> ClientResult<ProcessOutput> {
        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.lock_calls().push((program.to_string(), args.to_vec()));

        if !self.inner.delay.is_zero() {
            tokio::time::sleep(self.inner.delay).await;
        }

        let response = self.next_response();
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            Some(r) if r.spawn_error => Err(ClientError::io(
                program,
                std::io::Error::new(std::io::ErrorKind::NotFound, "scripted spawn failure"),
            )),
            Some(r) => Ok(ProcessOutput {
                stdout: r.stdout,
                stderr: r.stderr,
                exit_code: r.exit_code,
            }),
            None => Ok(ProcessOutput {
                stdout: Vec::new(),
                stderr: b"no scripted response left".to_vec(),
                exit_code: Some(1),
            }),
        }
    }
}

/// Minimal `CliContext` over a scripted runner
#[derive(Debug, Clone)]
pub struct TestContext {
    path: String,
    env: Arc<StaticEnv>,
    runner: ScriptedRunner,
}

impl TestContext {
    pub fn new(path: impl Into<String>, env: StaticEnv, runner: ScriptedRunner) -> Self {
        Self {
            path: path.into(),
            env: Arc::new(env),
            runner,
        }
    }
}

impl CliContext for TestContext {
    fn program_path(&self) -> &str {
        &self.path
    }

    fn env(&self) -> Arc<dyn EnvLookup> {
        self.env.clone()
    }

    fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::new(self.runner.clone())
    }
}

/// JSON of a successful transaction carrying one log with the given events
pub fn tx_json(hash: &str, events: Vec<(&str, Vec<(&str, &str)>)>) -> String {
    let events: Vec<_> = events
        .into_iter()
        .map(|(ty, attrs)| {
            let attributes: Vec<_> = attrs
                .into_iter()
                .map(|(k, v)| json!({ "key": k, "value": v }))
                .collect();
            json!({ "type": ty, "attributes": attributes })
        })
        .collect();

    json!({
        "height": "1234",
        "txhash": hash,
        "logs": [{ "events": events }],
        "raw_log": "[]",
    })
    .to_string()
}

/// JSON of a successful transaction with a single bare `message` event
pub fn confirmed_tx_json(hash: &str) -> String {
    tx_json(hash, vec![("message", Vec::new())])
}

/// JSON of a transaction the ledger rejected
pub fn failed_tx_json(hash: &str, raw_log: &str) -> String {
    json!({
        "height": "0",
        "txhash": hash,
        "logs": [],
        "raw_log": raw_log,
    })
    .to_string()
}
