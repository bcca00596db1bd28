use std::fmt;

use serde::{Deserialize, Serialize};

/// A named field of an identity record.
///
/// Declaration order here is the order substitutions are planned in; the
/// byte-phase rewriter then reorders by literal length so that no field is
/// partially rewritten by a shorter one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    SelfDelegationAddress,
    SelfDelegationPublicKey,
    Address,
    PublicKey,
    OperatorAddress,
    ConsensusAddress,
}

impl IdentityField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelfDelegationAddress => "self_delegation_address",
            Self::SelfDelegationPublicKey => "self_delegation_public_key",
            Self::Address => "address",
            Self::PublicKey => "public_key",
            Self::OperatorAddress => "operator_address",
            Self::ConsensusAddress => "consensus_address",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An actor identified by several correlated string fields.
pub trait Identity {
    /// Lower-case kind label used in logs ("validator", "delegator").
    const KIND: &'static str;

    /// Every field this identity type declares, in declaration order.
    fn fields() -> &'static [IdentityField];

    /// Value of a field, or `None` if unset or not declared by this type.
    fn field(&self, field: IdentityField) -> Option<&str>;

    /// Short label for log lines: the primary address, if set.
    fn label(&self) -> &str {
        self.field(IdentityField::Address).unwrap_or("<unset>")
    }
}

/// Validator identity.
///
/// `address` is the hex consensus address found in the top-level validator
/// list; `operator_address` is the `valoper` address used by staking and
/// distribution; `consensus_address` is the `valcons` address used by
/// slashing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Validator {
    pub self_delegation_address: Option<String>,
    pub self_delegation_public_key: Option<String>,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub operator_address: Option<String>,
    pub consensus_address: Option<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self_delegation_address(mut self, v: impl Into<String>) -> Self {
        self.self_delegation_address = Some(v.into());
        self
    }

    pub fn with_self_delegation_public_key(mut self, v: impl Into<String>) -> Self {
        self.self_delegation_public_key = Some(v.into());
        self
    }

    pub fn with_address(mut self, v: impl Into<String>) -> Self {
        self.address = Some(v.into());
        self
    }

    pub fn with_public_key(mut self, v: impl Into<String>) -> Self {
        self.public_key = Some(v.into());
        self
    }

    pub fn with_operator_address(mut self, v: impl Into<String>) -> Self {
        self.operator_address = Some(v.into());
        self
    }

    pub fn with_consensus_address(mut self, v: impl Into<String>) -> Self {
        self.consensus_address = Some(v.into());
        self
    }

    /// The delegator record for this validator's self-delegation account.
    pub fn self_delegator(&self) -> Delegator {
        Delegator {
            address: self.self_delegation_address.clone(),
            public_key: self.self_delegation_public_key.clone(),
        }
    }
}

impl Identity for Validator {
    const KIND: &'static str = "validator";

    fn fields() -> &'static [IdentityField] {
        &[
            IdentityField::SelfDelegationAddress,
            IdentityField::SelfDelegationPublicKey,
            IdentityField::Address,
            IdentityField::PublicKey,
            IdentityField::OperatorAddress,
            IdentityField::ConsensusAddress,
        ]
    }

    fn field(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::SelfDelegationAddress => self.self_delegation_address.as_deref(),
            IdentityField::SelfDelegationPublicKey => self.self_delegation_public_key.as_deref(),
            IdentityField::Address => self.address.as_deref(),
            IdentityField::PublicKey => self.public_key.as_deref(),
            IdentityField::OperatorAddress => self.operator_address.as_deref(),
            IdentityField::ConsensusAddress => self.consensus_address.as_deref(),
        }
    }
}

/// Delegator identity: an account address and its public key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Delegator {
    pub address: Option<String>,
    pub public_key: Option<String>,
}

impl Delegator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, v: impl Into<String>) -> Self {
        self.address = Some(v.into());
        self
    }

    pub fn with_public_key(mut self, v: impl Into<String>) -> Self {
        self.public_key = Some(v.into());
        self
    }
}

impl Identity for Delegator {
    const KIND: &'static str = "delegator";

    fn fields() -> &'static [IdentityField] {
        &[IdentityField::Address, IdentityField::PublicKey]
    }

    fn field(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::Address => self.address.as_deref(),
            IdentityField::PublicKey => self.public_key.as_deref(),
            _ => None,
        }
    }
}
