use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::format::{to_vec_styled, OutputStyle};

/// Well-known locations inside a Cosmos genesis file.
pub mod paths {
    pub const APP_STATE: &[&str] = &["app_state"];
    pub const VALIDATORS: &[&str] = &["validators"];
    pub const GOV: &[&str] = &["app_state", "gov"];
    pub const AUTH_ACCOUNTS: &[&str] = &["app_state", "auth", "accounts"];
    pub const BANK_BALANCES: &[&str] = &["app_state", "bank", "balances"];
    pub const BANK_SUPPLY: &[&str] = &["app_state", "bank", "supply"];
    pub const STAKING: &[&str] = &["app_state", "staking"];
    pub const STAKING_PARAMS: &[&str] = &["app_state", "staking", "params"];
    pub const STAKING_VALIDATORS: &[&str] = &["app_state", "staking", "validators"];
    pub const STAKING_DELEGATIONS: &[&str] = &["app_state", "staking", "delegations"];
    pub const LAST_VALIDATOR_POWERS: &[&str] = &["app_state", "staking", "last_validator_powers"];
    pub const STARTING_INFOS: &[&str] = &["app_state", "distribution", "delegator_starting_infos"];
}

/// Render a path as `a.b.c` for error messages.
pub fn dotted(path: &[&str]) -> String {
    path.join(".")
}

/// An in-memory genesis document.
///
/// The root must be a JSON object. Accessors are path-scoped and return
/// [`StoreError::MissingPath`] rather than inventing empty containers, so a
/// mutation never silently edits a structure that was not there.
#[derive(Clone, Debug, PartialEq)]
pub struct GenesisDocument {
    root: Value,
}

impl GenesisDocument {
    /// Wrap an already-parsed tree. The root must be an object.
    pub fn from_value(root: Value) -> StoreResult<Self> {
        if !root.is_object() {
            return Err(StoreError::WrongType {
                path: "<root>".into(),
                expected: "object",
            });
        }
        Ok(Self { root })
    }

    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> StoreResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Serialize in the given style.
    pub fn to_bytes(&self, style: OutputStyle) -> StoreResult<Vec<u8>> {
        Ok(to_vec_styled(&self.root, style)?)
    }

    // ---- Generic path access ----

    /// Look up a value by path.
    pub fn get(&self, path: &[&str]) -> StoreResult<&Value> {
        let mut cur = &self.root;
        for (depth, key) in path.iter().enumerate() {
            cur = cur
                .get(*key)
                .ok_or_else(|| StoreError::MissingPath(dotted(&path[..=depth])))?;
        }
        Ok(cur)
    }

    /// Look up a value by path, mutably.
    pub fn get_mut(&mut self, path: &[&str]) -> StoreResult<&mut Value> {
        let mut cur = &mut self.root;
        for (depth, key) in path.iter().enumerate() {
            cur = cur
                .get_mut(*key)
                .ok_or_else(|| StoreError::MissingPath(dotted(&path[..=depth])))?;
        }
        Ok(cur)
    }

    pub fn array(&self, path: &[&str]) -> StoreResult<&Vec<Value>> {
        self.get(path)?.as_array().ok_or_else(|| StoreError::WrongType {
            path: dotted(path),
            expected: "array",
        })
    }

    pub fn array_mut(&mut self, path: &[&str]) -> StoreResult<&mut Vec<Value>> {
        self.get_mut(path)?
            .as_array_mut()
            .ok_or_else(|| StoreError::WrongType {
                path: dotted(path),
                expected: "array",
            })
    }

    pub fn object(&self, path: &[&str]) -> StoreResult<&Map<String, Value>> {
        self.get(path)?.as_object().ok_or_else(|| StoreError::WrongType {
            path: dotted(path),
            expected: "object",
        })
    }

    pub fn object_mut(&mut self, path: &[&str]) -> StoreResult<&mut Map<String, Value>> {
        self.get_mut(path)?
            .as_object_mut()
            .ok_or_else(|| StoreError::WrongType {
                path: dotted(path),
                expected: "object",
            })
    }

    /// Read a string leaf.
    pub fn str_at(&self, path: &[&str]) -> StoreResult<&str> {
        self.get(path)?.as_str().ok_or_else(|| StoreError::WrongType {
            path: dotted(path),
            expected: "string",
        })
    }

    // ---- Named sections ----

    pub fn chain_id(&self) -> StoreResult<&str> {
        self.str_at(&["chain_id"])
    }

    /// Overwrite `chain_id`, returning the previous value if there was one.
    pub fn set_chain_id(&mut self, chain_id: &str) -> Option<String> {
        let root = self.root.as_object_mut()?;
        root.insert("chain_id".into(), Value::String(chain_id.to_string()))
            .and_then(|old| old.as_str().map(str::to_string))
    }

    pub fn app_state(&self) -> StoreResult<&Map<String, Value>> {
        self.object(paths::APP_STATE)
    }

    pub fn gov(&self) -> StoreResult<&Map<String, Value>> {
        self.object(paths::GOV)
    }

    /// The top-level (consensus) validator set.
    pub fn validators(&self) -> StoreResult<&Vec<Value>> {
        self.array(paths::VALIDATORS)
    }

    pub fn validators_mut(&mut self) -> StoreResult<&mut Vec<Value>> {
        self.array_mut(paths::VALIDATORS)
    }

    /// Address of the module account named `name` in `app_state.auth.accounts`.
    ///
    /// Returns `Ok(None)` if no such module account exists.
    pub fn module_account_address(&self, name: &str) -> StoreResult<Option<String>> {
        let accounts = self.array(paths::AUTH_ACCOUNTS)?;
        Ok(accounts
            .iter()
            .find(|acct| acct.get("name").and_then(Value::as_str) == Some(name))
            .and_then(|acct| acct.pointer("/base_account/address"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}
