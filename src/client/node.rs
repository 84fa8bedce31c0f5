use tracing::debug;

use super::AkashClient;
use crate::errors::ClientResult;
use crate::types::NodeStatus;

impl AkashClient {
    /// Sync status of the configured node
    pub async fn node_status(&self) -> ClientResult<NodeStatus> {
        self.cli()
            .status()
            .set_node(&self.config.node)
            .execute_json()
            .await
    }

    pub async fn latest_block_height(&self) -> ClientResult<u64> {
        let status = self.node_status().await?;
        if status.is_catching_up() {
            debug!(node = %self.config.node, "Node is still catching up");
        }
        status.latest_height()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::client_with;
    use crate::cli::StaticEnv;
    use crate::errors::ClientError;
    use crate::test_utils::{ScriptedResponse, ScriptedRunner};

    fn status_json(height: &str) -> String {
        serde_json::json!({
            "SyncInfo": {
                "latest_block_height": height,
                "latest_block_time": "2024-05-01T12:00:00.5Z",
                "catching_up": false
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_latest_block_height() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::stdout(status_json("16123456"))]);
        let client = client_with(&runner, StaticEnv::new());

        assert_eq!(client.latest_block_height().await.unwrap(), 16_123_456);
        assert_eq!(runner.calls()[0], ["status", "--node", "http://node:26657"]);
    }

    #[tokio::test]
    async fn test_node_override_from_env() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::stdout(status_json("1"))]);
        let env = StaticEnv::new().with("AKASH_NODE", "http://other:26657");
        let client = client_with(&runner, env);

        client.node_status().await.unwrap();
        assert_eq!(runner.calls()[0], ["status"]);
    }

    #[tokio::test]
    async fn test_unparsable_height() {
        let runner = ScriptedRunner::new(vec![ScriptedResponse::stdout(status_json(""))]);
        let client = client_with(&runner, StaticEnv::new());

        let err = client.latest_block_height().await.unwrap_err();
        assert!(matches!(err, ClientError::Handler(_)));
    }
}
