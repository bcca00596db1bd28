//! Coin values and the JSON helpers shared by the bank and staking edits.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tinker_store::StoreError;
use tinker_types::{Amount, Shares};

use crate::error::{OpsError, OpsResult};

/// A `{denom, amount}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

pub(crate) fn str_field<'v>(entry: &'v Value, key: &str) -> Option<&'v str> {
    entry.get(key).and_then(Value::as_str)
}

pub(crate) fn denom_of(coin: &Value) -> &str {
    str_field(coin, "denom").unwrap_or_default()
}

/// Read an integer stored either as a JSON string or a JSON number.
pub(crate) fn read_amount(entry: &Value, key: &str, path: &str) -> OpsResult<Amount> {
    let slot = entry
        .get(key)
        .ok_or_else(|| StoreError::MissingPath(format!("{path}.{key}")))?;
    let amount = match slot {
        Value::String(s) => Amount::parse(s)?,
        Value::Number(n) => Amount::parse(&n.to_string())?,
        _ => {
            return Err(StoreError::WrongType {
                path: format!("{path}.{key}"),
                expected: "integer",
            }
            .into())
        }
    };
    Ok(amount)
}

/// Write an integer back, keeping the JSON type the slot already had.
pub(crate) fn write_amount(entry: &mut Value, key: &str, amount: &Amount) {
    let text = amount.to_string();
    let as_number = matches!(entry.get(key), Some(Value::Number(_)));
    let value = match text.parse::<Number>() {
        Ok(n) if as_number => Value::Number(n),
        _ => Value::String(text),
    };
    if let Some(obj) = entry.as_object_mut() {
        obj.insert(key.to_string(), value);
    }
}

pub(crate) fn read_shares(entry: &Value, key: &str, path: &str) -> OpsResult<Shares> {
    let text = str_field(entry, key).ok_or_else(|| StoreError::WrongType {
        path: format!("{path}.{key}"),
        expected: "decimal string",
    })?;
    Ok(Shares::parse(text)?)
}

pub(crate) fn write_shares(entry: &mut Value, key: &str, shares: &Shares) {
    if let Some(obj) = entry.as_object_mut() {
        obj.insert(key.to_string(), Value::String(shares.to_string()));
    }
}

/// Reject negative results.
pub(crate) fn non_negative(amount: Amount, path: &str, key: &str) -> OpsResult<Amount> {
    if amount.is_negative() {
        return Err(OpsError::NegativeAmount {
            path: path.to_string(),
            key: key.to_string(),
            amount: amount.to_string(),
        });
    }
    Ok(amount)
}

pub(crate) fn non_negative_shares(shares: Shares, path: &str, key: &str) -> OpsResult<Shares> {
    if shares.is_negative() {
        return Err(OpsError::NegativeAmount {
            path: path.to_string(),
            key: key.to_string(),
            amount: shares.to_string(),
        });
    }
    Ok(shares)
}

pub(crate) fn find_coin(coins: &[Value], denom: &str) -> Option<usize> {
    coins.iter().position(|c| denom_of(c) == denom)
}

/// Insert a `{denom, amount}` entry after every entry whose denom sorts at or
/// before `denom`.
pub(crate) fn insert_sorted(coins: &mut Vec<Value>, denom: &str, amount: &Amount) -> usize {
    let idx = coins.partition_point(|c| denom_of(c) <= denom);
    let mut coin = serde_json::Map::new();
    coin.insert("denom".into(), Value::String(denom.to_string()));
    coin.insert("amount".into(), Value::String(amount.to_string()));
    coins.insert(idx, Value::Object(coin));
    idx
}
