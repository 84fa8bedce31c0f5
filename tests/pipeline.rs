mod support;

use std::collections::HashSet;
use std::io::Write;

use akash_client::{ClientError, Config, Seqs};
use support::fake_ledger::{Call, FakeLedger};
use support::{client, client_with_config, config, init_tracing};

#[tokio::test(start_paused = true)]
async fn deployment_lifecycle() {
    init_tracing();
    let ledger = FakeLedger::new(2);
    let client = client(&ledger);

    let seqs = client.create_deployment("/tmp/web.yaml").await.unwrap();
    assert_eq!(
        seqs,
        Seqs {
            dseq: "100".to_string(),
            gseq: "1".to_string(),
            oseq: "1".to_string()
        }
    );

    let lease = client.create_lease(&seqs, "akash1provider").await.unwrap();
    assert!(!lease.failed());

    client.delete_deployment(&seqs.dseq, "akash1owner").await.unwrap();

    let metrics = client.metrics();
    assert_eq!(metrics.submissions_total.get(), 3);
    assert_eq!(metrics.submissions_confirmed.get(), 3);
    // Two misses then a hit, per transaction
    assert_eq!(metrics.poll_attempts.get(), 9);
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_are_serialized() {
    init_tracing();
    let ledger = FakeLedger::new(1);
    let client = client(&ledger);

    let mut tasks = Vec::new();
    for i in 0..6 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.create_deployment(&format!("/tmp/app-{i}.yaml")).await
        }));
    }

    let mut dseqs = HashSet::new();
    for task in tasks {
        let seqs = task.await.unwrap().unwrap();
        assert!(dseqs.insert(seqs.dseq));
    }
    assert_eq!(dseqs.len(), 6);
    assert_eq!(ledger.max_in_flight(), 1);

    // Each broadcast is confirmed before the next one starts
    let mut open: Option<(String, u32)> = None;
    for call in ledger.calls() {
        match call {
            Call::Broadcast(hash) => {
                assert!(open.is_none(), "broadcast of {hash} while another tx is open");
                open = Some((hash, 0));
            }
            Call::Query(hash) => {
                let (current, seen) = open.as_mut().expect("query without an open broadcast");
                assert_eq!(*current, hash);
                *seen += 1;
                // One miss, then the record
                if *seen == 2 {
                    open = None;
                }
            }
            Call::Other(args) => panic!("unexpected call {args:?}"),
        }
    }
    assert!(open.is_none());
}

#[tokio::test(start_paused = true)]
async fn ledger_failure_does_not_stall_queue() {
    init_tracing();
    let ledger = FakeLedger::new(0);
    let client = client(&ledger);

    let err = client.create_deployment("/tmp/reject.yaml").await.unwrap_err();
    assert!(matches!(err, ClientError::TransactionFailed { .. }));
    assert_eq!(err.to_string(), "transaction failed: insufficient funds");

    let seqs = client.create_deployment("/tmp/ok.yaml").await.unwrap();
    assert_eq!(seqs.dseq, "100");
    assert_eq!(client.metrics().submissions_failed.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_indexing_hits_caller_timeout() {
    init_tracing();
    let ledger = FakeLedger::new(u32::MAX);
    let mut config = config();
    config.pipeline.submit_timeout_ms = 2_000;
    config.pipeline.confirm_timeout_ms = 4_000;
    let client = client_with_config(&ledger, config);

    let err = client.delete_deployment("100", "akash1owner").await.unwrap_err();
    assert!(matches!(err, ClientError::SubmissionTimeout { timeout_ms: 2_000 }));

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    let exposition = client.metrics().encode().unwrap();
    assert!(exposition.contains("akash_tx_submission_timeouts_total 1"));
    assert!(exposition.contains("akash_tx_confirmation_timeouts_total 1"));
}

#[test]
fn config_file_round_trip() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
key_name = "deployer"
account_address = "akash1owner"
chain_id = "sandbox-01"
node = "http://localhost:26657"

[pipeline]
poll_interval_ms = 250
"#
    )
    .unwrap();

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.pipeline.poll_interval_ms, 250);
    assert_eq!(config.pipeline.confirm_timeout_ms, 90_000);
    assert_eq!(config.transaction_note, "Akash Rust Client");
}
