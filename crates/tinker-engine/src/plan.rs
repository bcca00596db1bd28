use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tinker_ops::Coin;
use tinker_types::{Amount, Delegator, Validator};

use crate::config::TinkerConfig;
use crate::error::{TinkerError, TinkerResult};
use crate::task::{ByteTask, JsonTask, Task};

fn uatom() -> String {
    "uatom".into()
}

/// A run described in TOML.
///
/// Identities are declared once under `[validators.<name>]` and
/// `[delegators.<name>]` and referenced by name from `[[task]]` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub tinker: TinkerConfig,
    #[serde(default)]
    pub validators: BTreeMap<String, Validator>,
    #[serde(default)]
    pub delegators: BTreeMap<String, Delegator>,
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

/// One `[[task]]` entry, keyed by `op`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TaskSpec {
    ReplaceValidator {
        old: String,
        new: String,
    },
    ReplaceDelegator {
        old: String,
        new: String,
    },
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
        amount: Amount,
        #[serde(default = "uatom")]
        denom: String,
    },
    SetTallyParam {
        name: String,
        value: String,
    },
    CreateCoin {
        denom: String,
        #[serde(default)]
        amount: Amount,
    },
    IncreaseSupply {
        delta: Amount,
        #[serde(default = "uatom")]
        denom: String,
    },
    IncreaseBalance {
        address: String,
        delta: Amount,
        #[serde(default = "uatom")]
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
        #[serde(default = "uatom")]
        denom: String,
    },
    IncreaseDelegatorStake {
        delegator_address: String,
        validator_address: Option<String>,
        delta: Amount,
    },
    IncreaseDelegatorStakeToValidator {
        delegator: String,
        validator: String,
        amount: Amount,
        #[serde(default = "uatom")]
        denom: String,
    },
}

impl Plan {
    pub fn from_toml_str(s: &str) -> TinkerResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> TinkerResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validator(&self, name: &str) -> TinkerResult<Validator> {
        self.validators
            .get(name)
            .cloned()
            .ok_or_else(|| TinkerError::Plan(format!("unknown validator `{name}`")))
    }

    fn delegator(&self, name: &str) -> TinkerResult<Delegator> {
        self.delegators
            .get(name)
            .cloned()
            .ok_or_else(|| TinkerError::Plan(format!("unknown delegator `{name}`")))
    }

    /// Resolve every entry into a [`Task`], in plan order.
    pub fn tasks(&self) -> TinkerResult<Vec<Task>> {
        self.tasks.iter().map(|spec| self.resolve(spec)).collect()
    }

    fn resolve(&self, spec: &TaskSpec) -> TinkerResult<Task> {
        let task = match spec.clone() {
            TaskSpec::ReplaceValidator { old, new } => ByteTask::ReplaceValidator {
                old: self.validator(&old)?,
                new: self.validator(&new)?,
            }
            .into(),
            TaskSpec::ReplaceDelegator { old, new } => ByteTask::ReplaceDelegator {
                old: self.delegator(&old)?,
                new: self.delegator(&new)?,
            }
            .into(),
            TaskSpec::SetChainId { chain_id } => JsonTask::SetChainId { chain_id }.into(),
            TaskSpec::SetUnbondingTime { unbonding_time } => {
                JsonTask::SetUnbondingTime { unbonding_time }.into()
            }
            TaskSpec::SetVotingPeriod { voting_period } => {
                JsonTask::SetVotingPeriod { voting_period }.into()
            }
            TaskSpec::SetMaxDepositPeriod { max_deposit_period } => {
                JsonTask::SetMaxDepositPeriod { max_deposit_period }.into()
            }
            TaskSpec::SetMinDeposit { amount, denom } => JsonTask::SetMinDeposit {
                deposit: Coin::new(denom, amount),
            }
            .into(),
            TaskSpec::SetTallyParam { name, value } => JsonTask::SetTallyParam { name, value }.into(),
            TaskSpec::CreateCoin { denom, amount } => JsonTask::CreateCoin { denom, amount }.into(),
            TaskSpec::IncreaseSupply { delta, denom } => {
                JsonTask::IncreaseSupply { denom, delta }.into()
            }
            TaskSpec::IncreaseBalance {
                address,
                delta,
                denom,
            } => JsonTask::IncreaseBalance {
                address,
                delta,
                denom,
            }
            .into(),
            TaskSpec::IncreaseValidatorPower {
                operator_address,
                validator_address,
                delta,
            } => JsonTask::IncreaseValidatorPower {
                operator_address,
                validator_address,
                delta,
            }
            .into(),
            TaskSpec::IncreaseValidatorStake {
                operator_address,
                delta,
                denom,
            } => JsonTask::IncreaseValidatorStake {
                operator_address,
                delta,
                denom,
            }
            .into(),
            TaskSpec::IncreaseDelegatorStake {
                delegator_address,
                validator_address,
                delta,
            } => JsonTask::IncreaseDelegatorStake {
                delegator_address,
                validator_address,
                delta,
            }
            .into(),
            TaskSpec::IncreaseDelegatorStakeToValidator {
                delegator,
                validator,
                amount,
                denom,
            } => JsonTask::IncreaseDelegatorStakeToValidator {
                delegator: self.delegator(&delegator)?,
                validator: self.validator(&validator)?,
                increase: Coin::new(denom, amount),
            }
            .into(),
        };
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Phase;

    const PLAN: &str = r#"
        [tinker]
        input = "in.json"
        output = "out.json"

        [validators.old]
        address = "19CEF0E87C6FBDED2A2A486069C8F4DD51BD3981"

        [validators.new]
        address = "0000000000000000000000000000000000000ABC"

        [delegators.me]
        address = "cosmos1wvvhhfm387xvfnqshmdaunnpujjrdxznr5d5x9"

        [[task]]
        op = "replace_validator"
        old = "old"
        new = "new"

        [[task]]
        op = "set_min_deposit"
        amount = 1

        [[task]]
        op = "increase_balance"
        address = "cosmos1wvvhhfm387xvfnqshmdaunnpujjrdxznr5d5x9"
        delta = "-100000000000000000000000"

        [[task]]
        op = "increase_delegator_stake_to_validator"
        delegator = "me"
        validator = "new"
        amount = 6000000000
        denom = "ustake"
    "#;

    #[test]
    fn resolves_named_identities() {
        let plan = Plan::from_toml_str(PLAN).unwrap();
        assert_eq!(plan.tinker.input, "in.json");
        let tasks = plan.tasks().unwrap();
        let names: Vec<_> = tasks.iter().map(Task::name).collect();
        assert_eq!(
            names,
            [
                "replace_validator",
                "set_min_deposit",
                "increase_balance",
                "increase_delegator_stake_to_validator"
            ]
        );
        assert_eq!(tasks[0].phase(), Phase::Bytes);
        match &tasks[3] {
            Task::Json(JsonTask::IncreaseDelegatorStakeToValidator {
                validator, increase, ..
            }) => {
                assert_eq!(
                    validator.address.as_deref(),
                    Some("0000000000000000000000000000000000000ABC")
                );
                assert_eq!(increase, &Coin::new("ustake", 6_000_000_000i64));
            }
            other => panic!("unexpected task {other:?}"),
        }
    }

    #[test]
    fn denom_defaults_to_uatom() {
        let plan = Plan::from_toml_str(PLAN).unwrap();
        let tasks = plan.tasks().unwrap();
        assert_eq!(
            tasks[1],
            Task::Json(JsonTask::SetMinDeposit {
                deposit: Coin::new("uatom", 1i64)
            })
        );
        match &tasks[2] {
            Task::Json(JsonTask::IncreaseBalance { delta, denom, .. }) => {
                assert_eq!(denom, "uatom");
                assert!(delta.is_negative());
                assert_eq!(delta.to_string(), "-100000000000000000000000");
            }
            other => panic!("unexpected task {other:?}"),
        }
    }

    #[test]
    fn unknown_identity_is_a_plan_error() {
        let plan = Plan::from_toml_str(
            r#"
            [[task]]
            op = "replace_delegator"
            old = "ghost"
            new = "ghost"
            "#,
        )
        .unwrap();
        assert!(matches!(plan.tasks(), Err(TinkerError::Plan(_))));
    }

    #[test]
    fn unknown_op_fails_to_parse() {
        let err = Plan::from_toml_str(
            r#"
            [[task]]
            op = "burn_everything"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, TinkerError::PlanSyntax(_)));
    }

    #[test]
    fn demo_plan_is_well_formed() {
        let text = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../demos/local_testnet.toml"
        ));
        let plan = Plan::from_toml_str(text).unwrap();
        let tasks = plan.tasks().unwrap();
        assert_eq!(tasks.len(), 8);
        assert_eq!(tasks[0].phase(), Phase::Bytes);
        assert!(tasks[1..].iter().all(|t| t.phase() == Phase::Json));
    }

    #[test]
    fn empty_plan_uses_default_config() {
        let plan = Plan::from_toml_str("").unwrap();
        assert_eq!(plan.tinker, TinkerConfig::default());
        assert!(plan.tasks().unwrap().is_empty());
    }
}
