use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tinker_store::paths;
use tinker_types::Shares;

use crate::coins::{str_field, Coin};
use crate::error::{OpsError, OpsResult};
use crate::mutator::GenesisMutator;

/// Where governance parameters live in `app_state.gov`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GovLayout {
    /// `deposit_params`, `voting_params` and `tally_params` sections.
    Legacy,
    /// A single flat `params` object.
    Params,
}

impl GovLayout {
    pub fn detect(gov: &Map<String, Value>) -> Self {
        match gov.get("params") {
            Some(Value::Object(_)) => Self::Params,
            _ => Self::Legacy,
        }
    }

    fn section(&self, legacy: &'static str) -> &'static str {
        match self {
            Self::Legacy => legacy,
            Self::Params => "params",
        }
    }
}

/// Tally parameters that may be overwritten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyParam {
    Quorum,
    Threshold,
    VetoThreshold,
    ExpeditedThreshold,
}

impl TallyParam {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Quorum => "quorum",
            Self::Threshold => "threshold",
            Self::VetoThreshold => "veto_threshold",
            Self::ExpeditedThreshold => "expedited_threshold",
        }
    }
}

impl FromStr for TallyParam {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quorum" => Ok(Self::Quorum),
            "threshold" => Ok(Self::Threshold),
            "veto_threshold" => Ok(Self::VetoThreshold),
            "expedited_threshold" => Ok(Self::ExpeditedThreshold),
            other => Err(OpsError::UnknownTallyParam(other.to_string())),
        }
    }
}

impl fmt::Display for TallyParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accept protobuf-JSON durations in seconds: `"1209600s"`, `"0.5s"`.
pub(crate) fn check_duration(value: &str) -> OpsResult<()> {
    let invalid = || OpsError::InvalidDuration(value.to_string());
    let secs = value.strip_suffix('s').ok_or_else(invalid)?;
    let (whole, frac) = match secs.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (secs, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || frac.is_some_and(|f| !digits(f)) {
        return Err(invalid());
    }
    Ok(())
}

impl GenesisMutator<'_> {
    pub fn gov_layout(&self) -> OpsResult<GovLayout> {
        Ok(GovLayout::detect(self.doc.gov()?))
    }

    fn gov_section(&mut self, legacy: &'static str) -> OpsResult<&mut Map<String, Value>> {
        let section = self.gov_layout()?.section(legacy);
        let path = [paths::GOV[0], paths::GOV[1], section];
        Ok(self.doc.object_mut(&path)?)
    }

    pub fn set_voting_period(&mut self, voting_period: &str) -> OpsResult<()> {
        check_duration(voting_period)?;
        self.steps
            .log(format!("Swapping governance voting period to {voting_period}"));
        self.gov_section("voting_params")?.insert(
            "voting_period".into(),
            Value::String(voting_period.to_string()),
        );
        Ok(())
    }

    pub fn set_max_deposit_period(&mut self, max_deposit_period: &str) -> OpsResult<()> {
        check_duration(max_deposit_period)?;
        self.steps.log(format!(
            "Swapping governance max deposit period to {max_deposit_period}"
        ));
        self.gov_section("deposit_params")?.insert(
            "max_deposit_period".into(),
            Value::String(max_deposit_period.to_string()),
        );
        Ok(())
    }

    fn min_deposit_list(&mut self) -> OpsResult<&mut Vec<Value>> {
        self.gov_section("deposit_params")?
            .get_mut("min_deposit")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| OpsError::not_found(paths::GOV, "min_deposit"))
    }

    /// Set the minimum deposit for `deposit.denom`, appending the denom when
    /// it is not listed yet.
    pub fn set_min_deposit(&mut self, deposit: &Coin) -> OpsResult<()> {
        self.steps.log(format!(
            "Swapping min governance deposit amount to {deposit}"
        ));
        let amount = Value::String(deposit.amount.to_string());
        let mut found = false;
        for entry in self.min_deposit_list()?.iter_mut() {
            if str_field(entry, "denom") == Some(deposit.denom.as_str()) {
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("amount".into(), amount.clone());
                }
                found = true;
            }
        }
        if !found {
            self.steps.log(format!(
                "Adding new deposit denomination since {} was not found",
                deposit.denom
            ));
            let mut entry = Map::new();
            entry.insert("amount".into(), amount);
            entry.insert("denom".into(), Value::String(deposit.denom.clone()));
            self.min_deposit_list()?.push(Value::Object(entry));
        }
        Ok(())
    }

    /// Overwrite a tally parameter. `value` must be a decimal such as
    /// `"0.334000000000000000"`; it is stored as given.
    pub fn set_tally_param(&mut self, name: &str, value: &str) -> OpsResult<()> {
        let param: TallyParam = name.parse()?;
        Shares::parse(value)?;
        self.steps
            .log(format!("Swapping tally parameter {param} to {value}"));
        self.gov_section("tally_params")?
            .insert(param.key().into(), Value::String(value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MutationConfig;
    use crate::mutator::tests::{fixture, with_mutator};
    use tinker_store::GenesisDocument;

    fn params_layout() -> GenesisDocument {
        GenesisDocument::from_slice(
            br#"{"app_state": {"gov": {"params": {
                "min_deposit": [{"denom": "stake", "amount": "10"}],
                "max_deposit_period": "172800s",
                "voting_period": "172800s",
                "quorum": "0.334",
                "threshold": "0.5",
                "veto_threshold": "0.334",
                "expedited_threshold": "0.667"
            }}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn durations() {
        for ok in ["1209600s", "0s", "1.5s"] {
            assert!(check_duration(ok).is_ok(), "{ok}");
        }
        for bad in ["", "s", "10", "1.s", ".5s", "-1s", "10m", "1h0s"] {
            assert!(check_duration(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn layout_detection() {
        let doc = fixture();
        assert_eq!(GovLayout::detect(doc.gov().unwrap()), GovLayout::Legacy);
        let doc = params_layout();
        assert_eq!(GovLayout::detect(doc.gov().unwrap()), GovLayout::Params);
    }

    #[test]
    fn legacy_layout_updates() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            m.set_voting_period("60s").unwrap();
            m.set_max_deposit_period("120s").unwrap();
            m.set_tally_param("quorum", "0.000000000000000001").unwrap();
        });
        assert_eq!(
            doc.str_at(&["app_state", "gov", "voting_params", "voting_period"]).unwrap(),
            "60s"
        );
        assert_eq!(
            doc.str_at(&["app_state", "gov", "deposit_params", "max_deposit_period"]).unwrap(),
            "120s"
        );
        assert_eq!(
            doc.str_at(&["app_state", "gov", "tally_params", "quorum"]).unwrap(),
            "0.000000000000000001"
        );
    }

    #[test]
    fn params_layout_updates() {
        let mut doc = params_layout();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            m.set_voting_period("60s").unwrap();
            m.set_tally_param("expedited_threshold", "0.9").unwrap();
            m.set_min_deposit(&Coin::new("stake", 1u64)).unwrap();
        });
        let params = doc.object(&["app_state", "gov", "params"]).unwrap();
        assert_eq!(params["voting_period"], "60s");
        assert_eq!(params["expedited_threshold"], "0.9");
        assert_eq!(params["min_deposit"][0]["amount"], "1");
        assert!(!doc.gov().unwrap().contains_key("voting_params"));
    }

    #[test]
    fn min_deposit_updates_or_appends() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            m.set_min_deposit(&Coin::new("uatom", 1u64)).unwrap();
            m.set_min_deposit(&Coin::new("stake", 5u64)).unwrap();
        });
        let list = doc.array(&["app_state", "gov", "deposit_params", "min_deposit"]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["amount"], "1");
        assert_eq!(list[1]["denom"], "stake");
        assert_eq!(list[1]["amount"], "5");
    }

    #[test]
    fn unknown_tally_param_is_rejected() {
        let mut doc = fixture();
        with_mutator(&mut doc, &MutationConfig::default(), |m| {
            assert!(matches!(
                m.set_tally_param("burn_vote_quorum", "0.1"),
                Err(OpsError::UnknownTallyParam(_))
            ));
            assert!(matches!(
                m.set_tally_param("quorum", "a third"),
                Err(OpsError::Type(_))
            ));
        });
    }
}
