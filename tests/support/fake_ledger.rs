//! In-memory stand-in for `provider-services`
//!
//! Broadcasts get sequential hashes and become queryable after a configurable
//! number of "not found" answers. Manifests whose path contains `reject` are
//! accepted for broadcast but fail on the ledger.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use akash_client::cli::{CommandRunner, ProcessOutput};
use akash_client::ClientResult;
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Broadcast(String),
    Query(String),
    Other(Vec<String>),
}

#[derive(Debug)]
struct Pending {
    remaining_misses: u32,
    record: serde_json::Value,
}

#[derive(Debug, Default)]
struct State {
    next_tx: u64,
    next_dseq: u64,
    txs: HashMap<String, Pending>,
    calls: Vec<Call>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Clone)]
pub struct FakeLedger {
    state: Arc<Mutex<State>>,
    misses_before_indexed: u32,
    latency: Duration,
}

impl FakeLedger {
    pub fn new(misses_before_indexed: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_dseq: 100,
                ..State::default()
            })),
            misses_before_indexed,
            latency: Duration::from_millis(20),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn broadcast(&self, args: &[String]) -> ProcessOutput {
        let mut state = self.state.lock().unwrap();
        state.next_tx += 1;
        let hash = format!("{:064X}", state.next_tx);

        let rejected = args.iter().any(|a| a.contains("reject"));
        let record = if rejected {
            json!({ "height": "0", "txhash": hash, "logs": [], "raw_log": "insufficient funds" })
        } else if args[..3] == ["tx", "deployment", "create"] {
            let dseq = state.next_dseq.to_string();
            state.next_dseq += 1;
            json!({
                "height": "10",
                "txhash": hash,
                "logs": [{ "events": [{
                    "type": "akash.v1",
                    "attributes": [
                        { "key": "dseq", "value": dseq },
                        { "key": "gseq", "value": "1" },
                        { "key": "oseq", "value": "1" }
                    ]
                }]}],
                "raw_log": "[]"
            })
        } else {
            json!({
                "height": "10",
                "txhash": hash,
                "logs": [{ "events": [{ "type": "message", "attributes": [] }] }],
                "raw_log": "[]"
            })
        };

        state.txs.insert(
            hash.clone(),
            Pending {
                remaining_misses: self.misses_before_indexed,
                record,
            },
        );
        state.calls.push(Call::Broadcast(hash.clone()));

        ok(json!({ "txhash": hash, "code": 0, "raw_log": "" }).to_string())
    }

    fn query(&self, hash: &str) -> ProcessOutput {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Query(hash.to_string()));

        match state.txs.get_mut(hash) {
            Some(pending) if pending.remaining_misses == 0 => ok(pending.record.to_string()),
            Some(pending) => {
                pending.remaining_misses -= 1;
                not_found(hash)
            }
            None => not_found(hash),
        }
    }
}

fn ok(stdout: String) -> ProcessOutput {
    ProcessOutput {
        stdout: stdout.into_bytes(),
        stderr: Vec::new(),
        exit_code: Some(0),
    }
}

fn not_found(hash: &str) -> ProcessOutput {
    ProcessOutput {
        stdout: Vec::new(),
        stderr: format!("Error: tx ({hash}) not found").into_bytes(),
        exit_code: Some(1),
    }
}

#[async_trait]
impl CommandRunner for FakeLedger {
    async fn run(&self, _program: &str, args: &[String]) -> ClientResult<ProcessOutput> {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        tokio::time::sleep(self.latency).await;

        let output = match args.first().map(String::as_str) {
            Some("tx") => self.broadcast(args),
            Some("query") if args.get(1).map(String::as_str) == Some("tx") => self.query(&args[2]),
            _ => {
                self.state.lock().unwrap().calls.push(Call::Other(args.to_vec()));
                ok("{}".to_string())
            }
        };

        self.state.lock().unwrap().in_flight -= 1;
        Ok(output)
    }
}
