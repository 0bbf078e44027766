//! Mock node RPC server for testing account lookups
//!
//! This simulates the node's account endpoints without requiring a real node.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockRpcServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockRpcServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub async fn mock_account_list(&self, block_hash: &str, accounts: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/blocks/{}/accounts", block_hash)))
            .respond_with(ResponseTemplate::new(200).set_body_json(accounts))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_account(&self, block_hash: &str, account_id: &str, info: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/blocks/{}/accounts/{}", block_hash, account_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(info))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, route: &str, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_raw_body(&self, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(&self.server)
            .await;
    }
}
