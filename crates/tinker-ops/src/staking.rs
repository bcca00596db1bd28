use std::cmp::Reverse;

use serde_json::{Map, Value};
use tinker_store::{document::dotted, paths, StoreError};
use tinker_types::{Amount, Delegator, Validator};
use tracing::{debug, info};

use crate::coins::{
    non_negative, non_negative_shares, read_amount, read_shares, str_field, write_amount,
    write_shares, Coin,
};
use crate::config::{ActiveSetPolicy, DEFAULT_MAX_VALIDATORS};
use crate::error::{OpsError, OpsResult};
use crate::mutator::GenesisMutator;

pub const BOND_STATUS_BONDED: &str = "BOND_STATUS_BONDED";
pub const BOND_STATUS_UNBONDED: &str = "BOND_STATUS_UNBONDED";

const ED25519_PUBKEY_TYPE: &str = "tendermint/PubKeyEd25519";

/// How a power change lands in the top-level validator list.
#[derive(Debug, PartialEq, Eq)]
enum PowerPlacement {
    /// Already in the list at this index.
    Update(usize),
    /// Appended as a new member.
    Insert,
    /// Replaces the member at this index.
    Evict { index: usize, power: Amount },
}

fn position(list: &[Value], key: &str, value: &str) -> Option<usize> {
    list.iter().position(|e| str_field(e, key) == Some(value))
}

fn position2(list: &[Value], keys: [(&str, &str); 2]) -> Option<usize> {
    list.iter()
        .position(|e| keys.iter().all(|(k, v)| str_field(e, k) == Some(*v)))
}

impl GenesisMutator<'_> {
    fn staking_validator_index(&self, operator_address: &str) -> OpsResult<usize> {
        let list = self.doc.array(paths::STAKING_VALIDATORS)?;
        position(list, "operator_address", operator_address).ok_or_else(|| {
            OpsError::not_found(
                paths::STAKING_VALIDATORS,
                format!("operator_address={operator_address}"),
            )
        })
    }

    fn starting_info_index(&self, delegator: &str, validator: Option<&str>) -> OpsResult<usize> {
        let list = self.doc.array(paths::STARTING_INFOS)?;
        let found = match validator {
            Some(v) => position2(list, [("delegator_address", delegator), ("validator_address", v)]),
            None => position(list, "delegator_address", delegator),
        };
        found.ok_or_else(|| {
            OpsError::not_found(paths::STARTING_INFOS, format!("delegator_address={delegator}"))
        })
    }

    fn delegation_index(&self, delegator: &str, validator: &str) -> OpsResult<usize> {
        let list = self.doc.array(paths::STAKING_DELEGATIONS)?;
        position2(list, [("delegator_address", delegator), ("validator_address", validator)])
            .ok_or_else(|| {
                OpsError::not_found(
                    paths::STAKING_DELEGATIONS,
                    format!("delegator_address={delegator},validator_address={validator}"),
                )
            })
    }

    /// Size limit of the top-level validator list under a fixed cap.
    fn active_set_cap(&self) -> OpsResult<u64> {
        if let ActiveSetPolicy::FixedCap {
            max_validators: Some(n),
        } = self.config.active_set
        {
            return Ok(n);
        }
        let params = self.doc.get(paths::STAKING_PARAMS)?;
        if params.get("max_validators").is_none() {
            return Ok(DEFAULT_MAX_VALIDATORS);
        }
        let path = dotted(paths::STAKING_PARAMS);
        let n = read_amount(params, "max_validators", &path)?;
        n.to_string().parse().map_err(|_| {
            StoreError::WrongType {
                path: format!("{path}.max_validators"),
                expected: "unsigned 64-bit integer",
            }
            .into()
        })
    }

    /// Whether a power change of `delta` leaves the top list untouched: an
    /// absent validator never enters it with zero power.
    fn stays_outside(&self, validator_address: &str, delta: &Amount) -> OpsResult<bool> {
        let top = self.doc.validators()?;
        Ok(delta.is_zero() && position(top, "address", validator_address).is_none())
    }

    /// Decide where `validator_address` goes without touching the document.
    fn place_power(&self, validator_address: &str, new_power: &Amount) -> OpsResult<PowerPlacement> {
        let top = self.doc.validators()?;
        if let Some(idx) = position(top, "address", validator_address) {
            return Ok(PowerPlacement::Update(idx));
        }
        if self.config.active_set == ActiveSetPolicy::Expand {
            return Ok(PowerPlacement::Insert);
        }
        let cap = self.active_set_cap()?;
        if (top.len() as u64) < cap {
            return Ok(PowerPlacement::Insert);
        }

        let path = dotted(paths::VALIDATORS);
        let mut smallest: Option<(usize, Amount)> = None;
        for (idx, entry) in top.iter().enumerate() {
            let power = read_amount(entry, "power", &path)?;
            // `<=` picks the lowest-ranked of equally small members.
            if smallest.as_ref().map_or(true, |(_, min)| power <= *min) {
                smallest = Some((idx, power));
            }
        }
        match smallest {
            Some((index, power)) if *new_power > power => Ok(PowerPlacement::Evict { index, power }),
            smallest => Err(OpsError::InsufficientPower {
                address: validator_address.to_string(),
                power: new_power.clone(),
                minimum: smallest.map(|(_, p)| p).unwrap_or_default(),
            }),
        }
    }

    /// Build a top-list entry from the staking record of `operator_address`.
    fn top_list_entry(&self, operator_address: &str, validator_address: &str, power: &Amount) -> OpsResult<Value> {
        let idx = self.staking_validator_index(operator_address)?;
        let record = &self.doc.array(paths::STAKING_VALIDATORS)?[idx];
        let name = record
            .pointer("/description/moniker")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let key = record
            .pointer("/consensus_pubkey/key")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                OpsError::not_found(
                    paths::STAKING_VALIDATORS,
                    format!("{operator_address}.consensus_pubkey.key"),
                )
            })?;

        let mut pub_key = Map::new();
        pub_key.insert("type".into(), Value::String(ED25519_PUBKEY_TYPE.into()));
        pub_key.insert("value".into(), Value::String(key.to_string()));
        let mut entry = Map::new();
        entry.insert("address".into(), Value::String(validator_address.to_string()));
        entry.insert("name".into(), Value::String(name.to_string()));
        entry.insert("power".into(), Value::String(power.to_string()));
        entry.insert("pub_key".into(), Value::Object(pub_key));
        Ok(Value::Object(entry))
    }

    /// Operator address of a top-list entry, matched through its consensus key.
    fn operator_of(&self, top_entry: &Value) -> OpsResult<Option<String>> {
        let Some(key) = top_entry.pointer("/pub_key/value").and_then(Value::as_str) else {
            return Ok(None);
        };
        let staking = self.doc.array(paths::STAKING_VALIDATORS)?;
        Ok(staking
            .iter()
            .find(|v| v.pointer("/consensus_pubkey/key").and_then(Value::as_str) == Some(key))
            .and_then(|v| str_field(v, "operator_address"))
            .map(str::to_string))
    }

    /// Add `delta` to a validator's consensus power.
    ///
    /// Updates the top-level validator list, the matching
    /// `last_validator_powers` entry and `last_total_power`. A validator
    /// outside the top list enters it according to the configured
    /// [`ActiveSetPolicy`].
    pub fn increase_validator_power(
        &mut self,
        operator_address: &str,
        validator_address: &str,
        delta: &Amount,
    ) -> OpsResult<()> {
        self.steps.log(format!(
            "Increasing validator power of {validator_address} by {delta}"
        ));
        if self.stays_outside(validator_address, delta)? {
            debug!(validator_address, "zero power, validator stays out of the active set");
            return Ok(());
        }
        let top_path = dotted(paths::VALIDATORS);
        let lvp_path = dotted(paths::LAST_VALIDATOR_POWERS);
        let staking_path = dotted(paths::STAKING);

        // Resolve and check everything before the first write.
        let placement = self.place_power(validator_address, delta)?;
        let (new_entry, top_power) = match &placement {
            PowerPlacement::Update(idx) => {
                let current = read_amount(&self.doc.validators()?[*idx], "power", &top_path)?;
                (None, non_negative(current + delta.clone(), &top_path, validator_address)?)
            }
            PowerPlacement::Insert | PowerPlacement::Evict { .. } => {
                let power = non_negative(delta.clone(), &top_path, validator_address)?;
                (Some(self.top_list_entry(operator_address, validator_address, &power)?), power)
            }
        };
        let evicted = match &placement {
            PowerPlacement::Evict { index, power } => {
                let entry = &self.doc.validators()?[*index];
                Some((*index, power.clone(), self.operator_of(entry)?))
            }
            _ => None,
        };
        let lvp = self.doc.array(paths::LAST_VALIDATOR_POWERS)?;
        let lvp_idx = position(lvp, "address", operator_address);
        let lvp_power = match lvp_idx {
            Some(idx) => read_amount(&lvp[idx], "power", &lvp_path)? + delta.clone(),
            None => delta.clone(),
        };
        let lvp_power = non_negative(lvp_power, &lvp_path, operator_address)?;
        let staking = self.doc.get(paths::STAKING)?;
        let mut total = read_amount(staking, "last_total_power", &staking_path)? + delta.clone();
        if let Some((_, power, _)) = &evicted {
            total = total - power.clone();
        }
        let total = non_negative(total, &staking_path, "last_total_power")?;

        // Top-level list.
        if let Some((index, power, operator)) = &evicted {
            let removed = self.doc.validators_mut()?.remove(*index);
            info!(
                address = str_field(&removed, "address").unwrap_or_default(),
                %power,
                "evicting smallest validator from the active set"
            );
            if let Some(operator) = operator {
                let lvp = self.doc.array_mut(paths::LAST_VALIDATOR_POWERS)?;
                lvp.retain(|e| str_field(e, "address") != Some(operator.as_str()));
            }
        }
        let top = self.doc.validators_mut()?;
        match (placement, new_entry) {
            (PowerPlacement::Update(idx), _) => write_amount(&mut top[idx], "power", &top_power),
            (_, Some(entry)) => top.push(entry),
            (_, None) => {}
        }
        rank_by_power(top, &top_path)?;
        let top_len = top.len();

        // last_validator_powers, located again since an eviction may have shifted it.
        let lvp = self.doc.array_mut(paths::LAST_VALIDATOR_POWERS)?;
        match position(lvp, "address", operator_address) {
            Some(idx) => write_amount(&mut lvp[idx], "power", &lvp_power),
            None => {
                let mut entry = Map::new();
                entry.insert("address".into(), Value::String(operator_address.to_string()));
                entry.insert("power".into(), Value::String(lvp_power.to_string()));
                lvp.push(Value::Object(entry));
            }
        }

        write_amount(self.doc.get_mut(paths::STAKING)?, "last_total_power", &total);

        if self.config.active_set == ActiveSetPolicy::Expand {
            let params = self.doc.get_mut(paths::STAKING_PARAMS)?;
            let cap = match params.get("max_validators") {
                Some(_) => read_amount(params, "max_validators", &dotted(paths::STAKING_PARAMS))?,
                None => Amount::from(DEFAULT_MAX_VALIDATORS),
            };
            let len = Amount::from(top_len as u64);
            if len > cap {
                debug!(max_validators = %len, "raising max_validators");
                write_amount(params, "max_validators", &len);
            }
        }
        Ok(())
    }

    /// Add `delta` tokens (and as many shares) to a staking validator.
    ///
    /// An `UNBONDED` validator becomes `BONDED`, and its existing tokens move
    /// from the not-bonded pool to the bonded pool.
    pub fn increase_validator_stake(
        &mut self,
        operator_address: &str,
        delta: &Amount,
        denom: &str,
    ) -> OpsResult<()> {
        self.steps.log(format!(
            "Increasing validator stake of {operator_address} by {delta}"
        ));
        let path = dotted(paths::STAKING_VALIDATORS);
        let idx = self.staking_validator_index(operator_address)?;
        let record = &self.doc.array(paths::STAKING_VALIDATORS)?[idx];
        let old_tokens = read_amount(record, "tokens", &path)?;
        let tokens = non_negative(&old_tokens + delta, &path, "tokens")?;
        let shares = non_negative_shares(
            read_shares(record, "delegator_shares", &path)?.add_amount(delta),
            &path,
            "delegator_shares",
        )?;
        let unbonded = str_field(record, "status") == Some(BOND_STATUS_UNBONDED);

        if unbonded {
            self.check_pool_move(&old_tokens, denom)?;
            self.steps
                .log(format!("Changing bond status to {BOND_STATUS_BONDED}"));
            let bonded = self.bonded_pool_address()?;
            let not_bonded = self.not_bonded_pool_address()?;
            self.increase_balance(&bonded, &old_tokens, denom)?;
            self.increase_balance(&not_bonded, &-&old_tokens, denom)?;
        }

        let record = &mut self.doc.array_mut(paths::STAKING_VALIDATORS)?[idx];
        if unbonded {
            if let Some(obj) = record.as_object_mut() {
                obj.insert("status".into(), Value::String(BOND_STATUS_BONDED.into()));
            }
        }
        write_amount(record, "tokens", &tokens);
        write_shares(record, "delegator_shares", &shares);
        Ok(())
    }

    /// Check that `amount` can move from the not-bonded to the bonded pool.
    fn check_pool_move(&self, amount: &Amount, denom: &str) -> OpsResult<()> {
        let path = dotted(paths::BANK_BALANCES);
        let bonded = self.bonded_pool_address()?;
        if self.balance_of(&bonded, denom)?.is_none() {
            return Err(OpsError::not_found(paths::BANK_BALANCES, format!("address={bonded}")));
        }
        let not_bonded = self.not_bonded_pool_address()?;
        let available = self
            .balance_of(&not_bonded, denom)?
            .ok_or_else(|| OpsError::not_found(paths::BANK_BALANCES, format!("address={not_bonded}")))?;
        non_negative(available - amount.clone(), &path, &not_bonded)?;
        Ok(())
    }

    /// Add `delta` to a delegator's distribution starting stake.
    ///
    /// With `validator` set only the starting info for that delegation is
    /// touched; otherwise the delegator's first starting info is.
    pub fn increase_delegator_stake(
        &mut self,
        delegator_address: &str,
        validator: Option<&str>,
        delta: &Amount,
    ) -> OpsResult<()> {
        self.steps.log(format!(
            "Increasing delegator stake of {delegator_address} by {delta}"
        ));
        let path = dotted(paths::STARTING_INFOS);
        let idx = self.starting_info_index(delegator_address, validator)?;
        let list = self.doc.array_mut(paths::STARTING_INFOS)?;
        let info = list[idx]
            .get_mut("starting_info")
            .ok_or_else(|| OpsError::not_found(paths::STARTING_INFOS, format!("{delegator_address}.starting_info")))?;
        let stake = non_negative_shares(read_shares(info, "stake", &path)?.add_amount(delta), &path, "stake")?;
        write_shares(info, "stake", &stake);
        Ok(())
    }

    /// Stake `increase` more from `delegator` to `validator`.
    ///
    /// Applies, in order: the bonded pool balance (and supply), the
    /// delegator's starting stake, the validator's tokens and shares, the
    /// validator's power (`amount / POWER_TO_TOKENS`), and the delegation's
    /// shares. Every target is resolved first, and any failure leaves the
    /// document untouched.
    pub fn increase_delegator_stake_to_validator(
        &mut self,
        delegator: &Delegator,
        validator: &Validator,
        increase: &Coin,
    ) -> OpsResult<()> {
        let delegator_address = delegator.address.as_deref().ok_or(OpsError::IncompleteIdentity {
            kind: "delegator",
            field: "address",
        })?;
        let operator = validator
            .operator_address
            .as_deref()
            .ok_or(OpsError::IncompleteIdentity {
                kind: "validator",
                field: "operator_address",
            })?;
        let consensus = validator.address.as_deref().ok_or(OpsError::IncompleteIdentity {
            kind: "validator",
            field: "address",
        })?;
        let amount = &increase.amount;
        let power = amount.to_power();

        // Preflight.
        let bonded = self.bonded_pool_address()?;
        let bonded_balance = self
            .balance_of(&bonded, &increase.denom)?
            .ok_or_else(|| OpsError::not_found(paths::BANK_BALANCES, format!("address={bonded}")))?;
        non_negative(&bonded_balance + amount, &dotted(paths::BANK_BALANCES), &bonded)?;
        self.starting_info_index(delegator_address, Some(operator))?;
        let idx = self.staking_validator_index(operator)?;
        let record = &self.doc.array(paths::STAKING_VALIDATORS)?[idx];
        if str_field(record, "status") == Some(BOND_STATUS_UNBONDED) {
            let tokens = read_amount(record, "tokens", &dotted(paths::STAKING_VALIDATORS))?;
            self.check_pool_move(&tokens, &increase.denom)?;
        }
        if !self.stays_outside(consensus, &power)? {
            if let PowerPlacement::Insert | PowerPlacement::Evict { .. } = self.place_power(consensus, &power)? {
                self.top_list_entry(operator, consensus, &power)?;
            }
        }
        let delegation = self.delegation_index(delegator_address, operator)?;

        // A negative amount can still fail part way through; restore the
        // document so the edit is all or nothing.
        let snapshot = self.doc.clone();
        let applied = self.apply_delegation(
            &bonded,
            delegator_address,
            operator,
            consensus,
            increase,
            delegation,
        );
        if applied.is_err() {
            debug!(delegator_address, operator, "delegation failed, document restored");
            *self.doc = snapshot;
        }
        applied
    }

    fn apply_delegation(
        &mut self,
        bonded: &str,
        delegator_address: &str,
        operator: &str,
        consensus: &str,
        increase: &Coin,
        delegation: usize,
    ) -> OpsResult<()> {
        let amount = &increase.amount;
        self.increase_balance(bonded, amount, &increase.denom)?;
        self.increase_delegator_stake(delegator_address, Some(operator), amount)?;
        self.increase_validator_stake(operator, amount, &increase.denom)?;
        self.increase_validator_power(operator, consensus, &amount.to_power())?;

        self.steps.log(format!(
            "Increasing delegations of {delegator_address} with {operator} by {amount}"
        ));
        let path = dotted(paths::STAKING_DELEGATIONS);
        let entry = &mut self.doc.array_mut(paths::STAKING_DELEGATIONS)?[delegation];
        let shares = non_negative_shares(read_shares(entry, "shares", &path)?.add_amount(amount), &path, "shares")?;
        write_shares(entry, "shares", &shares);
        Ok(())
    }
}

/// Stable sort of the top-level validator list by power, highest first.
fn rank_by_power(top: &mut Vec<Value>, path: &str) -> OpsResult<()> {
    let powers = top
        .iter()
        .map(|v| read_amount(v, "power", path))
        .collect::<OpsResult<Vec<_>>>()?;
    let mut ranked: Vec<(Amount, Value)> = powers.into_iter().zip(top.drain(..)).collect();
    ranked.sort_by_key(|(power, _)| Reverse(power.clone()));
    top.extend(ranked.into_iter().map(|(_, v)| v));
    Ok(())
}
