use std::fmt;

use tinker_ops::Coin;
use tinker_types::{Amount, Delegator, Validator};

/// Execution phase of a run. Moves from `Bytes` to `Json` once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Bytes,
    Json,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes => f.write_str("bytes"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Identity replacements, run as text substitutions on the scratch file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ByteTask {
    ReplaceValidator { old: Validator, new: Validator },
    ReplaceDelegator { old: Delegator, new: Delegator },
}

impl ByteTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReplaceValidator { .. } => "replace_validator",
            Self::ReplaceDelegator { .. } => "replace_delegator",
        }
    }
}

/// Structured edits on the parsed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonTask {
    SetChainId {
        chain_id: String,
    },
    SetUnbondingTime {
        unbonding_time: String,
    },
    SetVotingPeriod {
        voting_period: String,
    },
    SetMaxDepositPeriod {
        max_deposit_period: String,
    },
    SetMinDeposit {
        deposit: Coin,
    },
    SetTallyParam {
        name: String,
        value: String,
    },
    CreateCoin {
        denom: String,
        amount: Amount,
    },
    IncreaseSupply {
        denom: String,
        delta: Amount,
    },
    IncreaseBalance {
        address: String,
        delta: Amount,
        denom: String,
    },
    IncreaseValidatorPower {
        operator_address: String,
        validator_address: String,
        delta: Amount,
    },
    IncreaseValidatorStake {
        operator_address: String,
        delta: Amount,
        denom: String,
    },
    IncreaseDelegatorStake {
        delegator_address: String,
        validator_address: Option<String>,
        delta: Amount,
    },
    IncreaseDelegatorStakeToValidator {
        delegator: Delegator,
        validator: Validator,
        increase: Coin,
    },
}

impl JsonTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetChainId { .. } => "set_chain_id",
            Self::SetUnbondingTime { .. } => "set_unbonding_time",
            Self::SetVotingPeriod { .. } => "set_voting_period",
            Self::SetMaxDepositPeriod { .. } => "set_max_deposit_period",
            Self::SetMinDeposit { .. } => "set_min_deposit",
            Self::SetTallyParam { .. } => "set_tally_param",
            Self::CreateCoin { .. } => "create_coin",
            Self::IncreaseSupply { .. } => "increase_supply",
            Self::IncreaseBalance { .. } => "increase_balance",
            Self::IncreaseValidatorPower { .. } => "increase_validator_power",
            Self::IncreaseValidatorStake { .. } => "increase_validator_stake",
            Self::IncreaseDelegatorStake { .. } => "increase_delegator_stake",
            Self::IncreaseDelegatorStakeToValidator { .. } => {
                "increase_delegator_stake_to_validator"
            }
        }
    }
}

/// A bound operation, classified into the phase it runs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Bytes(ByteTask),
    Json(JsonTask),
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bytes(t) => t.name(),
            Self::Json(t) => t.name(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Bytes(_) => Phase::Bytes,
            Self::Json(_) => Phase::Json,
        }
    }

    pub fn replace_validator(old: Validator, new: Validator) -> Self {
        Self::Bytes(ByteTask::ReplaceValidator { old, new })
    }

    pub fn replace_delegator(old: Delegator, new: Delegator) -> Self {
        Self::Bytes(ByteTask::ReplaceDelegator { old, new })
    }

    pub fn set_chain_id(chain_id: impl Into<String>) -> Self {
        Self::Json(JsonTask::SetChainId {
            chain_id: chain_id.into(),
        })
    }

    pub fn increase_balance(
        address: impl Into<String>,
        delta: impl Into<Amount>,
        denom: impl Into<String>,
    ) -> Self {
        Self::Json(JsonTask::IncreaseBalance {
            address: address.into(),
            delta: delta.into(),
            denom: denom.into(),
        })
    }
}

impl From<ByteTask> for Task {
    fn from(t: ByteTask) -> Self {
        Self::Bytes(t)
    }
}

impl From<JsonTask> for Task {
    fn from(t: JsonTask) -> Self {
        Self::Json(t)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacements_run_in_byte_phase() {
        let t = Task::replace_validator(Validator::new(), Validator::new());
        assert_eq!(t.phase(), Phase::Bytes);
        assert_eq!(t.name(), "replace_validator");
        let t = Task::replace_delegator(Delegator::new(), Delegator::new());
        assert_eq!(t.phase(), Phase::Bytes);
    }

    #[test]
    fn everything_else_runs_in_json_phase() {
        let t = Task::set_chain_id("x");
        assert_eq!(t.phase(), Phase::Json);
        assert_eq!(t.to_string(), "set_chain_id");
        let t: Task = JsonTask::CreateCoin {
            denom: "ufoo".into(),
            amount: Amount::zero(),
        }
        .into();
        assert_eq!(t.phase(), Phase::Json);
    }
}
