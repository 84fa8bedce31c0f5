use tracing::{debug, info};

use super::AkashClient;
use crate::cli::AkashCommand;
use crate::errors::ClientResult;
use crate::types::{Seqs, Transaction};

impl AkashClient {
    /// Accept `provider`'s bid on the order identified by `seqs`
    pub async fn create_lease(&self, seqs: &Seqs, provider: &str) -> ClientResult<Transaction> {
        let cmd = self
            .cli()
            .tx()
            .market()
            .lease()
            .create()
            .set_dseq(&seqs.dseq)
            .set_gseq(&seqs.gseq)
            .set_oseq(&seqs.oseq)
            .set_provider(provider)
            .set_owner(&self.config.account_address)
            .default_gas();

        let tx = self.submit_tx(self.tx_options(cmd)).await?;
        info!(dseq = %seqs.dseq, provider = %provider, txhash = %tx.txhash, "Lease created");

        Ok(tx)
    }

    /// Upload the manifest to the provider holding the lease
    ///
    /// Talks to the provider, not the ledger, so it bypasses the submission
    /// queue. Returns whatever the CLI printed.
    pub async fn send_manifest(
        &self,
        dseq: &str,
        provider: &str,
        manifest: &str,
    ) -> ClientResult<String> {
        let cmd = self
            .provider_command(self.cli().provider().send_manifest(manifest))
            .set_dseq(dseq)
            .set_provider(provider);

        let out = cmd.execute().await?;
        debug!(dseq = %dseq, provider = %provider, "Manifest sent");

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Provider-side status of a lease (services, forwarded ports, ...)
    ///
    /// The shape depends on the provider version, so it stays untyped.
    pub async fn lease_status(
        &self,
        seqs: &Seqs,
        provider: &str,
    ) -> ClientResult<serde_json::Value> {
        self.provider_command(self.cli().provider().lease_status())
            .set_dseq(&seqs.dseq)
            .set_gseq(&seqs.gseq)
            .set_oseq(&seqs.oseq)
            .set_provider(provider)
            .execute_json()
            .await
    }

    /// Key and node options for `provider` subcommands
    fn provider_command(&self, cmd: AkashCommand) -> AkashCommand {
        cmd.set_from(&self.config.key_name)
            .set_home(&self.config.home)
            .set_keyring_backend(&self.config.keyring_backend)
            .set_node(&self.config.node)
    }
}
