use chrono::NaiveDate;
use tracing::warn;

use super::{
    AccountRole, AccountState, BakerStake, DelegationTarget, DelegatorStake, PoolInfo,
    RawAccountInfo, RawBaker, RawDelegator, RawPolicy, RawStake, YearMonth,
};
use crate::constants::PRIMARY_CREDENTIAL_KEY;
use crate::errors::ClassifyError;

/// Classify the raw account info of `account_id` into an `AccountState`
pub fn classify(account_id: &str, raw: &RawAccountInfo) -> Result<AccountState, ClassifyError> {
    let policy = credential_policy(account_id, raw)?;
    let credential_creation_date = first_of_month(account_id, policy.created_at)?;
    let credential_valid_to_date = first_of_month(account_id, policy.valid_to)?;

    let total_balance = raw.amount;
    let locked_balance = raw.schedule.total;
    let unlocked_balance = total_balance.checked_sub(locked_balance).ok_or_else(|| {
        ClassifyError::LockedExceedsTotal {
            account: account_id.to_string(),
            total: total_balance,
            locked: locked_balance,
        }
    })?;

    let role = match &raw.stake {
        None => AccountRole::Plain,
        Some(stake) => classify_stake(account_id, stake)?,
    };

    Ok(AccountState {
        account_id: account_id.to_string(),
        index: raw.index,
        total_balance,
        locked_balance,
        unlocked_balance,
        sequence_number: raw.sequence_number,
        credential_creation_date,
        credential_valid_to_date,
        credential_count: raw.credentials.len(),
        role,
    })
}

/// Policy of the primary credential, preferring the `initial` encoding over `normal`
fn credential_policy<'a>(
    account_id: &str,
    raw: &'a RawAccountInfo,
) -> Result<&'a RawPolicy, ClassifyError> {
    let credential = raw.credentials.get(PRIMARY_CREDENTIAL_KEY);

    credential
        .and_then(|c| c.initial.as_ref().or(c.normal.as_ref()))
        .map(|values| &values.policy)
        .ok_or_else(|| ClassifyError::MalformedCredential {
            account: account_id.to_string(),
        })
}

fn first_of_month(account_id: &str, ym: YearMonth) -> Result<NaiveDate, ClassifyError> {
    NaiveDate::from_ymd_opt(ym.year, ym.month, 1).ok_or(ClassifyError::InvalidCredentialMonth {
        account: account_id.to_string(),
        year: ym.year,
        month: ym.month,
    })
}

fn classify_stake(account_id: &str, stake: &RawStake) -> Result<AccountRole, ClassifyError> {
    match (&stake.baker, &stake.delegator) {
        (Some(baker), None) => Ok(AccountRole::Baker(baker_stake(baker))),
        (None, Some(delegator)) => Ok(AccountRole::Delegator(delegator_stake(account_id, delegator)?)),
        (Some(baker), Some(_)) => {
            warn!(
                "Account {} reports both baker and delegator stake, keeping baker",
                account_id
            );
            Ok(AccountRole::Baker(baker_stake(baker)))
        }
        (None, None) => {
            // Stake info existed but carried no role; recorded as plain
            warn!(
                "Account {} has stake info without baker or delegator, treating as plain",
                account_id
            );
            Ok(AccountRole::Plain)
        }
    }
}

fn baker_stake(baker: &RawBaker) -> BakerStake {
    BakerStake {
        baker_id: baker.baker_info.baker_id,
        staked_amount: baker.staked_amount,
        restake_earnings: baker.restake_earnings,
        pool: baker.pool_info.as_ref().map(|pool| PoolInfo {
            open_status: pool.open_status.clone(),
            metadata_url: pool.url.clone(),
            commission_rates: pool.commission_rates,
        }),
    }
}

fn delegator_stake(
    account_id: &str,
    delegator: &RawDelegator,
) -> Result<DelegatorStake, ClassifyError> {
    let target = if delegator.target.passive_delegation {
        DelegationTarget::Passive
    } else if let Some(baker_id) = delegator.target.baker {
        DelegationTarget::Baker(baker_id)
    } else {
        return Err(ClassifyError::InvalidDelegationTarget {
            account: account_id.to_string(),
        });
    };

    Ok(DelegatorStake {
        staked_amount: delegator.staked_amount,
        restake_earnings: delegator.restake_earnings,
        target,
    })
}
