use serde_json::Value;
use tinker_store::{paths, GenesisDocument};
use tinker_types::StepLog;

use crate::config::MutationConfig;
use crate::error::{OpsError, OpsResult};
use crate::gov::check_duration;

const BONDED_POOL: &str = "bonded_tokens_pool";
const NOT_BONDED_POOL: &str = "not_bonded_tokens_pool";

/// Applies mutations to a parsed genesis document.
///
/// Operations are additive: calling one twice applies it twice. Each logs a
/// numbered step before touching the document.
pub struct GenesisMutator<'a> {
    pub(crate) doc: &'a mut GenesisDocument,
    pub(crate) config: &'a MutationConfig,
    pub(crate) steps: &'a mut StepLog,
}

impl<'a> GenesisMutator<'a> {
    pub fn new(
        doc: &'a mut GenesisDocument,
        config: &'a MutationConfig,
        steps: &'a mut StepLog,
    ) -> Self {
        Self { doc, config, steps }
    }

    /// Overwrite the top-level `chain_id`.
    pub fn set_chain_id(&mut self, chain_id: &str) -> OpsResult<()> {
        let old = self.doc.chain_id().unwrap_or("<none>").to_string();
        self.steps
            .log(format!("Changing chain id from \"{old}\" to \"{chain_id}\""));
        self.doc.set_chain_id(chain_id);
        Ok(())
    }

    /// Overwrite `app_state.staking.params.unbonding_time`.
    pub fn set_unbonding_time(&mut self, unbonding_time: &str) -> OpsResult<()> {
        check_duration(unbonding_time)?;
        self.steps
            .log(format!("Swapping staking unbonding_time to {unbonding_time}"));
        let params = self.doc.object_mut(paths::STAKING_PARAMS)?;
        params.insert(
            "unbonding_time".into(),
            Value::String(unbonding_time.to_string()),
        );
        Ok(())
    }

    /// Address of the bonded tokens pool, honouring the configured override.
    pub fn bonded_pool_address(&self) -> OpsResult<String> {
        self.pool_address(self.config.bonded_pool_address.as_deref(), BONDED_POOL)
    }

    /// Address of the not-bonded tokens pool, honouring the configured override.
    pub fn not_bonded_pool_address(&self) -> OpsResult<String> {
        self.pool_address(
            self.config.not_bonded_pool_address.as_deref(),
            NOT_BONDED_POOL,
        )
    }

    fn pool_address(&self, configured: Option<&str>, name: &'static str) -> OpsResult<String> {
        if let Some(address) = configured {
            return Ok(address.to_string());
        }
        self.doc
            .module_account_address(name)?
            .ok_or(OpsError::MissingPool(name))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const FIXTURE: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../testdata/minimal_genesis.json"
    ));

    pub(crate) const BONDED: &str = "cosmos1fl48vsnmsdzcv85q5d2q4z5ajdha8yu34mf0eh";
    pub(crate) const NOT_BONDED: &str = "cosmos1tygms3xhhs3yv487phx3dw4a95jn7t7lpm470r";

    pub(crate) fn fixture() -> GenesisDocument {
        GenesisDocument::from_slice(FIXTURE.as_bytes()).unwrap()
    }

    /// Run `f` against a fresh mutator over `doc`.
    pub(crate) fn with_mutator<T>(
        doc: &mut GenesisDocument,
        config: &MutationConfig,
        f: impl FnOnce(&mut GenesisMutator<'_>) -> T,
    ) -> T {
        let mut steps = StepLog::new();
        let mut m = GenesisMutator::new(doc, config, &mut steps);
        f(&mut m)
    }

    #[test]
    fn set_chain_id_overwrites() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            m.set_chain_id("local-testnet").unwrap();
        });
        assert_eq!(doc.chain_id().unwrap(), "local-testnet");
    }

    #[test]
    fn set_unbonding_time_validates_duration() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            m.set_unbonding_time("1s").unwrap();
            assert!(matches!(
                m.set_unbonding_time("3 weeks"),
                Err(OpsError::InvalidDuration(_))
            ));
        });
        assert_eq!(
            doc.str_at(&["app_state", "staking", "params", "unbonding_time"]).unwrap(),
            "1s"
        );
    }

    #[test]
    fn pool_addresses_come_from_module_accounts() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            assert_eq!(m.bonded_pool_address().unwrap(), BONDED);
            assert_eq!(m.not_bonded_pool_address().unwrap(), NOT_BONDED);
        });
    }

    #[test]
    fn pool_address_override_wins() {
        let mut doc = fixture();
        let config = MutationConfig {
            bonded_pool_address: Some("cosmos1override".into()),
            ..Default::default()
        };
        with_mutator(&mut doc, &config, |m| {
            assert_eq!(m.bonded_pool_address().unwrap(), "cosmos1override");
        });
    }

    #[test]
    fn missing_pool_account_is_reported() {
        let mut doc = GenesisDocument::from_slice(br#"{"app_state": {"auth": {"accounts": []}}}"#).unwrap();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            assert!(matches!(
                m.bonded_pool_address(),
                Err(OpsError::MissingPool("bonded_tokens_pool"))
            ));
        });
    }
}
