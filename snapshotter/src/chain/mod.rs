//! Chain access for the snapshot pipeline
//!
//! This module owns everything between the node RPC and a classified account:
//! - `RawAccountInfo` and friends mirror the node's account-info JSON
//! - `ChainClient` is the seam the collector depends on
//! - `classifier` turns raw info into an `AccountState` with exactly one role
//!
//! # Role model
//!
//! ```text
//! stake absent                     -> Plain
//! stake.baker present              -> Baker(pool, commission rates, ...)
//! stake.delegator present          -> Delegator(passive | baker id)
//! stake present, both sub-kinds absent -> Plain (logged)
//! ```

pub mod classifier;
pub mod rpc_client;

pub use classifier::classify;
pub use rpc_client::HttpChainClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::errors::{AccountError, ChainError};

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Every account id that exists as of `block_hash`
    async fn list_accounts_asof(&self, block_hash: &str) -> Result<Vec<String>, ChainError>;

    async fn get_account_info(
        &self,
        block_hash: &str,
        account_id: &str,
    ) -> Result<RawAccountInfo, ChainError>;

    /// Fetch and classify one account at `block_hash`
    async fn get_account_state(
        &self,
        block_hash: &str,
        account_id: &str,
    ) -> Result<AccountState, AccountError> {
        let raw = self.get_account_info(block_hash, account_id).await?;
        Ok(classify(account_id, &raw)?)
    }
}

// ============================================================================
// Wire types (node account-info JSON)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAccountInfo {
    pub index: u64,
    #[serde(deserialize_with = "amount")]
    pub amount: u64,
    pub sequence_number: u64,
    #[serde(default)]
    pub schedule: RawReleaseSchedule,
    pub credentials: BTreeMap<String, RawCredential>,
    #[serde(default)]
    pub stake: Option<RawStake>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReleaseSchedule {
    #[serde(deserialize_with = "amount")]
    pub total: u64,
}

/// One credential entry; the node sends exactly one of the two encodings,
/// `initial` for credentials deployed at account creation by the identity provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCredential {
    #[serde(default)]
    pub initial: Option<RawCredentialValues>,
    #[serde(default)]
    pub normal: Option<RawCredentialValues>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCredentialValues {
    pub policy: RawPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPolicy {
    pub created_at: YearMonth,
    pub valid_to: YearMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStake {
    #[serde(default)]
    pub baker: Option<RawBaker>,
    #[serde(default)]
    pub delegator: Option<RawDelegator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBaker {
    #[serde(deserialize_with = "amount")]
    pub staked_amount: u64,
    pub restake_earnings: bool,
    pub baker_info: RawBakerInfo,
    #[serde(default)]
    pub pool_info: Option<RawPoolInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBakerInfo {
    pub baker_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPoolInfo {
    pub open_status: String,
    #[serde(default)]
    pub url: String,
    pub commission_rates: CommissionRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDelegator {
    #[serde(deserialize_with = "amount")]
    pub staked_amount: u64,
    pub restake_earnings: bool,
    pub target: RawDelegationTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDelegationTarget {
    #[serde(default)]
    pub passive_delegation: bool,
    #[serde(default)]
    pub baker: Option<u64>,
}

/// Amounts arrive as JSON numbers from some node versions and as strings from others
fn amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Classified account state
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    pub account_id: String,
    pub index: u64,
    pub total_balance: u64,
    pub locked_balance: u64,
    pub unlocked_balance: u64,
    pub sequence_number: u64,
    pub credential_creation_date: NaiveDate,
    pub credential_valid_to_date: NaiveDate,
    pub credential_count: usize,
    pub role: AccountRole,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountRole {
    Baker(BakerStake),
    Delegator(DelegatorStake),
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BakerStake {
    pub baker_id: u64,
    pub staked_amount: u64,
    pub restake_earnings: bool,
    /// Absent for bakers registered before pools existed
    pub pool: Option<PoolInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolInfo {
    pub open_status: String,
    pub metadata_url: String,
    pub commission_rates: CommissionRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub transaction: f64,
    pub finalization: f64,
    pub baking: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelegatorStake {
    pub staked_amount: u64,
    pub restake_earnings: bool,
    pub target: DelegationTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationTarget {
    Passive,
    Baker(u64),
}
