use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{ChainClient, RawAccountInfo};
use crate::errors::ChainError;

/// Node RPC client speaking the JSON account endpoints:
/// - `GET {rpc}/v1/blocks/{block_hash}/accounts` -> `["addr", ...]`
/// - `GET {rpc}/v1/blocks/{block_hash}/accounts/{account}` -> account info
#[derive(Clone)]
pub struct HttpChainClient {
    base_url: String,
    client: Client,
}

impl HttpChainClient {
    pub fn new(rpc_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            base_url: rpc_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ChainError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ChainError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ChainError::Request {
            url: url.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| ChainError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn list_accounts_asof(&self, block_hash: &str) -> Result<Vec<String>, ChainError> {
        let url = format!("{}/v1/blocks/{}/accounts", self.base_url, block_hash);
        let accounts: Vec<String> = self.get_json(url).await?;
        debug!("Node reports {} accounts at {}", accounts.len(), block_hash);
        Ok(accounts)
    }

    async fn get_account_info(
        &self,
        block_hash: &str,
        account_id: &str,
    ) -> Result<RawAccountInfo, ChainError> {
        let url = format!(
            "{}/v1/blocks/{}/accounts/{}",
            self.base_url, block_hash, account_id
        );
        self.get_json(url).await
    }
}
