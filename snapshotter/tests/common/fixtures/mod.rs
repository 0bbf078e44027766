//! This module provides reusable test utilities:
//! - Mock HTTP servers (node RPC, webhook)
//! - Fakes for the pipeline collaborators with failure injection
//! - In-memory test databases
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod mock_rpc;
pub mod mock_webhook;
pub mod pipeline;
pub mod test_data;
pub mod test_database;

// Re-export commonly used items
pub use fakes::{FakeChain, FakeVcs, FlakyStore, RecordingNotifier};
pub use mock_rpc::MockRpcServer;
pub use mock_webhook::MockWebhookServer;
pub use pipeline::TestPipeline;
pub use test_data::*;
pub use test_database::test_database;
