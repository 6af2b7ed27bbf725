// arbor/client/src/http_source.rs

//! HTTP/JSON NodeSource adapter.
//!
//! Speaks the server's two endpoints, `get_tree_root` and
//! `get_tree_nodes`, with hex-encoded identifiers in query strings.
//! Applies a request timeout and nothing else; retry policy belongs to
//! the caller.

use anyhow::{bail, Context, Result};
use arbor_sync::{
    NodeHash, NodeRow, NodeSource, NodesResponse, RootResponse, RootStatus, TreeId,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RootJson {
    tree_id: String,
    node_hash: Option<String>,
    status: u8,
    generation: u64,
}

#[derive(Debug, Deserialize)]
struct NodesJson {
    root_changed: bool,
    answer: Vec<NodeRow>,
}

pub struct HttpNodeSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNodeSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn root_url(&self, tree_id: &TreeId) -> String {
        format!(
            "{}/get_tree_root?tree_id=0x{}",
            self.base_url,
            tree_id.to_hex()
        )
    }

    fn nodes_url(&self, tree_id: &TreeId, node_hash: &NodeHash, root_hash: &NodeHash) -> String {
        format!(
            "{}/get_tree_nodes?tree_id=0x{}&node_hash=0x{}&root_hash=0x{}",
            self.base_url,
            tree_id.to_hex(),
            node_hash.to_hex(),
            root_hash.to_hex()
        )
    }
}

#[async_trait]
impl NodeSource for HttpNodeSource {
    async fn get_root(&self, tree_id: &TreeId) -> Result<RootResponse> {
        let url = self.root_url(tree_id);
        let json: RootJson = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("get_tree_root request failed: {}", url))?
            .error_for_status()
            .context("get_tree_root returned an error status")?
            .json()
            .await
            .context("get_tree_root returned malformed json")?;

        let node_hash = json
            .node_hash
            .as_deref()
            .map(NodeHash::from_hex)
            .transpose()
            .context("get_tree_root returned a malformed node_hash")?;
        let Some(status) = RootStatus::from_u8(json.status) else {
            bail!("get_tree_root returned unknown status {}", json.status);
        };
        Ok(RootResponse {
            tree_id: TreeId::from_hex(&json.tree_id)
                .context("get_tree_root returned a malformed tree_id")?,
            node_hash,
            status,
            generation: json.generation,
        })
    }

    async fn get_nodes(
        &self,
        tree_id: &TreeId,
        node_hash: &NodeHash,
        root_hash: &NodeHash,
    ) -> Result<NodesResponse> {
        let url = self.nodes_url(tree_id, node_hash, root_hash);
        let json: NodesJson = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("get_tree_nodes request failed: {}", url))?
            .error_for_status()
            .context("get_tree_nodes returned an error status")?
            .json()
            .await
            .context("get_tree_nodes returned malformed json")?;

        Ok(NodesResponse {
            root_changed: json.root_changed,
            answer: json.answer,
        })
    }
}
