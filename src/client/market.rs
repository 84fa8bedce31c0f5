use super::AkashClient;
use crate::errors::ClientResult;
use crate::types::{Bid, BidList};

impl AkashClient {
    /// Bids placed on every order of deployment `dseq`
    pub async fn list_bids(&self, owner: &str, dseq: &str) -> ClientResult<Vec<Bid>> {
        let list: BidList = self
            .cli()
            .query()
            .market()
            .bid()
            .list()
            .set_owner(owner)
            .set_dseq(dseq)
            .set_chain_id(&self.config.chain_id)
            .set_node(&self.config.node)
            .output_json()
            .execute_json()
            .await?;

        Ok(list.into_bids())
    }
}
