//! Common test data and constants

use chrono::NaiveDate;
use serde_json::{json, Value};
use snapshotter::chain::RawAccountInfo;
use snapshotter::snapshot::SnapshotId;

pub mod accounts {
    pub const PLAIN: &str = "3Plain1111111111111111111111111111111111111111111111";
    pub const BAKER: &str = "4Baker111111111111111111111111111111111111111111111";
    pub const DELEGATOR: &str = "4Deleg111111111111111111111111111111111111111111111";
    pub const PASSIVE: &str = "3Passi111111111111111111111111111111111111111111111";
    pub const MALFORMED: &str = "3Broke111111111111111111111111111111111111111111111";
}

pub mod blocks {
    pub const HASH_A: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";
    pub const HASH_B: &str = "ffeeddccbbaa99887766554433221100ffeeddccbbaa99887766554433221100";
    pub const HEIGHT_A: u64 = 15_000_000;
    pub const HEIGHT_B: u64 = 15_086_400;
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

pub fn snapshot_id(day: &str, block_hash: &str, block_height: u64) -> SnapshotId {
    SnapshotId {
        date: date(day),
        block_hash: block_hash.to_string(),
        block_height,
    }
}

fn credentials() -> Value {
    json!({
        "0": { "normal": { "policy": {
            "created_at": { "year": 2022, "month": 3 },
            "valid_to": { "year": 2027, "month": 3 }
        }}}
    })
}

/// Account without stake; amounts as strings the way newer nodes send them
pub fn plain_account(amount: u64) -> Value {
    json!({
        "index": 11,
        "amount": amount.to_string(),
        "sequence_number": 4,
        "schedule": { "total": "0" },
        "credentials": credentials()
    })
}

pub fn baker_account(amount: u64, staked: u64, rates: (f64, f64, f64)) -> Value {
    json!({
        "index": 12,
        "amount": amount,
        "sequence_number": 90,
        "schedule": { "total": 0 },
        "credentials": {
            "0": { "initial": { "policy": {
                "created_at": { "year": 2021, "month": 6 },
                "valid_to": { "year": 2026, "month": 6 }
            }}},
            "1": { "normal": { "policy": {
                "created_at": { "year": 2022, "month": 1 },
                "valid_to": { "year": 2027, "month": 1 }
            }}}
        },
        "stake": { "baker": {
            "staked_amount": staked,
            "restake_earnings": true,
            "baker_info": { "baker_id": 72723 },
            "pool_info": {
                "open_status": "openForAll",
                "url": "https://pool.example/metadata.json",
                "commission_rates": {
                    "transaction": rates.0,
                    "finalization": rates.1,
                    "baking": rates.2
                }
            }
        }}
    })
}

/// `target_baker = None` delegates passively
pub fn delegator_account(staked: u64, target_baker: Option<u64>) -> Value {
    let target = match target_baker {
        Some(baker) => json!({ "baker": baker }),
        None => json!({ "passive_delegation": true }),
    };

    json!({
        "index": 13,
        "amount": 10_000_000u64,
        "sequence_number": 2,
        "schedule": { "total": 3_000_000u64 },
        "credentials": credentials(),
        "stake": { "delegator": {
            "staked_amount": staked,
            "restake_earnings": false,
            "target": target
        }}
    })
}

/// Credential entry with neither encoding present
pub fn malformed_account() -> Value {
    json!({
        "index": 14,
        "amount": 1,
        "sequence_number": 0,
        "credentials": { "0": {} }
    })
}

pub fn raw(value: Value) -> RawAccountInfo {
    serde_json::from_value(value).expect("valid raw account info")
}
