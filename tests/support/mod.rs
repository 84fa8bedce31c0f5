#![allow(dead_code)]

pub mod fake_ledger;

use std::sync::Arc;

use akash_client::cli::StaticEnv;
use akash_client::{AkashClient, Config};

use fake_ledger::FakeLedger;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("akash_client=debug")
        .with_test_writer()
        .try_init();
}

pub fn config() -> Config {
    Config {
        key_name: "deployer".to_string(),
        account_address: "akash1owner".to_string(),
        chain_id: "sandbox-01".to_string(),
        node: "http://localhost:26657".to_string(),
        home: "/tmp/akash-home".to_string(),
        ..Config::default()
    }
}

pub fn client(ledger: &FakeLedger) -> AkashClient {
    client_with_config(ledger, config())
}

pub fn client_with_config(ledger: &FakeLedger, config: Config) -> AkashClient {
    AkashClient::with_components(config, Arc::new(ledger.clone()), Arc::new(StaticEnv::new()))
        .expect("client should build")
}
