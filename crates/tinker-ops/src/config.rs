use serde::{Deserialize, Serialize};

/// Active-set size used when neither the policy nor the genesis names one.
pub const DEFAULT_MAX_VALIDATORS: u64 = 150;

/// What happens when a validator outside the active set gains power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ActiveSetPolicy {
    /// Keep the set at a fixed size. A full set admits the newcomer only by
    /// evicting its smallest member, and only if the newcomer's power is
    /// strictly larger.
    ///
    /// `max_validators = None` reads `app_state.staking.params.max_validators`,
    /// falling back to [`DEFAULT_MAX_VALIDATORS`].
    FixedCap {
        #[serde(default)]
        max_validators: Option<u64>,
    },
    /// Always admit, raising `staking.params.max_validators` when needed.
    Expand,
}

impl Default for ActiveSetPolicy {
    fn default() -> Self {
        Self::FixedCap {
            max_validators: None,
        }
    }
}

/// Settings that shape mutation behaviour.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub active_set: ActiveSetPolicy,
    /// Overrides the `bonded_tokens_pool` module account lookup.
    pub bonded_pool_address: Option<String>,
    /// Overrides the `not_bonded_tokens_pool` module account lookup.
    pub not_bonded_pool_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_cap_from_genesis() {
        assert_eq!(
            MutationConfig::default().active_set,
            ActiveSetPolicy::FixedCap {
                max_validators: None
            }
        );
    }

    #[test]
    fn policy_parses_from_toml() {
        let cfg: MutationConfig = toml::from_str(
            r#"
            bonded_pool_address = "cosmos1pool"
            active_set = { policy = "fixed_cap", max_validators = 175 }
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.active_set,
            ActiveSetPolicy::FixedCap {
                max_validators: Some(175)
            }
        );
        assert_eq!(cfg.bonded_pool_address.as_deref(), Some("cosmos1pool"));

        let cfg: MutationConfig = toml::from_str(r#"active_set = { policy = "expand" }"#).unwrap();
        assert_eq!(cfg.active_set, ActiveSetPolicy::Expand);
    }
}
