//! Flat, schema-stable account rows
//!
//! `AccountRecord` is the single row shape shared by the archive file, the cache
//! and the document store. Field order is the archive column order. Fields that
//! do not apply to an account's role are `None`, never zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chain::{AccountRole, AccountState, DelegationTarget};
use crate::constants::{MICRO_UNITS_PER_UNIT, PASSIVE_DELEGATION};

pub const ARCHIVE_COLUMNS: [&str; 18] = [
    "account",
    "nonce",
    "index",
    "credential_creation_date",
    "credential_valid_to_date",
    "credential_count",
    "total_balance",
    "unlocked_balance",
    "locked_balance",
    "baker_id",
    "staked_amount",
    "restake_earnings",
    "pool_status",
    "pool_metadata_url",
    "pool_transaction_commission",
    "pool_finalization_commission",
    "pool_baking_commission",
    "delegation_target",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: String,
    pub nonce: u64,
    pub index: u64,
    pub credential_creation_date: NaiveDate,
    pub credential_valid_to_date: NaiveDate,
    pub credential_count: usize,
    pub total_balance: f64,
    pub unlocked_balance: f64,
    pub locked_balance: f64,
    pub baker_id: Option<u64>,
    pub staked_amount: Option<f64>,
    pub restake_earnings: Option<bool>,
    pub pool_status: Option<String>,
    pub pool_metadata_url: Option<String>,
    pub pool_transaction_commission: Option<f64>,
    pub pool_finalization_commission: Option<f64>,
    pub pool_baking_commission: Option<f64>,
    pub delegation_target: Option<String>,
}

/// Micro-units to display units; display precision only
pub fn to_display_units(micro_units: u64) -> f64 {
    micro_units as f64 / MICRO_UNITS_PER_UNIT
}

impl From<&AccountState> for AccountRecord {
    fn from(state: &AccountState) -> Self {
        let mut record = AccountRecord {
            account: state.account_id.clone(),
            nonce: state.sequence_number,
            index: state.index,
            credential_creation_date: state.credential_creation_date,
            credential_valid_to_date: state.credential_valid_to_date,
            credential_count: state.credential_count,
            total_balance: to_display_units(state.total_balance),
            unlocked_balance: to_display_units(state.unlocked_balance),
            locked_balance: to_display_units(state.locked_balance),
            baker_id: None,
            staked_amount: None,
            restake_earnings: None,
            pool_status: None,
            pool_metadata_url: None,
            pool_transaction_commission: None,
            pool_finalization_commission: None,
            pool_baking_commission: None,
            delegation_target: None,
        };

        match &state.role {
            AccountRole::Plain => {}
            AccountRole::Baker(baker) => {
                record.baker_id = Some(baker.baker_id);
                record.staked_amount = Some(to_display_units(baker.staked_amount));
                record.restake_earnings = Some(baker.restake_earnings);
                if let Some(pool) = &baker.pool {
                    record.pool_status = Some(pool.open_status.clone());
                    record.pool_metadata_url = Some(pool.metadata_url.clone());
                    record.pool_transaction_commission = Some(pool.commission_rates.transaction);
                    record.pool_finalization_commission = Some(pool.commission_rates.finalization);
                    record.pool_baking_commission = Some(pool.commission_rates.baking);
                }
            }
            AccountRole::Delegator(delegator) => {
                record.staked_amount = Some(to_display_units(delegator.staked_amount));
                record.restake_earnings = Some(delegator.restake_earnings);
                record.delegation_target = Some(match delegator.target {
                    DelegationTarget::Passive => PASSIVE_DELEGATION.to_string(),
                    DelegationTarget::Baker(baker_id) => baker_id.to_string(),
                });
            }
        }

        record
    }
}

impl AccountRecord {
    /// Document-store shape: keyed by `_id = account`, absent fields omitted
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        let mut document: Map<String, Value> = match serde_json::to_value(self)? {
            Value::Object(fields) => fields
                .into_iter()
                .filter(|(_, value)| !value.is_null())
                .collect(),
            _ => Map::new(),
        };
        document.insert("_id".to_string(), Value::String(self.account.clone()));

        Ok(Value::Object(document))
    }
}
