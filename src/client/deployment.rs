use tracing::{debug, info};

use super::AkashClient;
use crate::errors::ClientResult;
use crate::types::{Deployment, Seqs};

impl AkashClient {
    pub async fn get_deployment(&self, dseq: &str, owner: &str) -> ClientResult<Deployment> {
        self.cli()
            .query()
            .deployment()
            .get()
            .set_owner(owner)
            .set_dseq(dseq)
            .set_chain_id(&self.config.chain_id)
            .set_node(&self.config.node)
            .output_json()
            .execute_json()
            .await
    }

    /// Create a deployment from the manifest at `manifest` and return the
    /// sequence numbers the ledger assigned to its first order
    pub async fn create_deployment(&self, manifest: &str) -> ClientResult<Seqs> {
        info!(manifest = %manifest, "Creating deployment");

        let cmd = self.cli().tx().deployment().create().manifest(manifest).default_gas();
        let cmd = match self.config.depositor_account() {
            Some(account) => cmd.set_depositor_account(account),
            None => cmd,
        };

        let tx = self.submit_tx(self.tx_options(cmd)).await?;

        let seqs = Seqs {
            dseq: tx.find_attribute("dseq")?.to_string(),
            gseq: tx.find_attribute("gseq")?.to_string(),
            oseq: tx.find_attribute("oseq")?.to_string(),
        };
        info!(
            dseq = %seqs.dseq,
            gseq = %seqs.gseq,
            oseq = %seqs.oseq,
            txhash = %tx.txhash,
            "Deployment created"
        );

        Ok(seqs)
    }

    pub async fn update_deployment(&self, dseq: &str, manifest: &str) -> ClientResult<()> {
        let cmd = self
            .cli()
            .tx()
            .deployment()
            .update()
            .manifest(manifest)
            .set_dseq(dseq)
            .default_gas()
            .set_sign_mode("amino-json");

        let tx = self.submit_tx(self.tx_options(cmd)).await?;
        debug!(dseq = %dseq, txhash = %tx.txhash, raw_log = %tx.raw_log, "Deployment updated");

        Ok(())
    }

    pub async fn delete_deployment(&self, dseq: &str, owner: &str) -> ClientResult<()> {
        let cmd = self
            .cli()
            .tx()
            .deployment()
            .close()
            .set_dseq(dseq)
            .set_owner(owner)
            .default_gas();

        let tx = self.submit_tx(self.tx_options(cmd)).await?;
        debug!(dseq = %dseq, txhash = %tx.txhash, raw_log = %tx.raw_log, "Deployment closed");

        Ok(())
    }
}
