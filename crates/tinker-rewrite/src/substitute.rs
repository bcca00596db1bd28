use tinker_types::{Delegator, Identity, IdentityField, StepLog, Validator};
use tracing::{debug, warn};

use crate::error::{RewriteError, RewriteResult};
use crate::normalize::sort_balance_coins;
use crate::scratch::ScratchFile;

/// A single literal replacement derived from one identity field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub field: IdentityField,
    pub old: String,
    pub new: String,
}

/// Per-field match counts from one replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub counts: Vec<(IdentityField, usize)>,
}

impl SubstitutionReport {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn count(&self, field: IdentityField) -> Option<usize> {
        self.counts
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, n)| *n)
    }
}

/// Build the ordered substitution list for replacing `old` with `new`.
///
/// Fields unset on `old` are skipped. The result is stably sorted by the
/// length of the old literal, longest first, so a literal that is a
/// substring of another can never clip it.
pub fn plan_substitutions<I: Identity>(old: &I, new: &I) -> RewriteResult<Vec<Substitution>> {
    let mut subs = Vec::with_capacity(I::fields().len());
    for &field in I::fields() {
        let Some(old_value) = old.field(field) else {
            debug!(kind = I::KIND, %field, "field unset on old identity, skipping");
            continue;
        };
        let new_value = new.field(field).ok_or(RewriteError::MissingField {
            kind: I::KIND,
            field,
        })?;
        check_literal(field, old_value)?;
        check_literal(field, new_value)?;
        subs.push(Substitution {
            field,
            old: old_value.to_string(),
            new: new_value.to_string(),
        });
    }
    subs.sort_by(|a, b| b.old.len().cmp(&a.old.len()));

    for (i, earlier) in subs.iter().enumerate() {
        for later in &subs[i + 1..] {
            if earlier.new.contains(later.old.as_str()) {
                warn!(
                    field = %earlier.field,
                    later = %later.field,
                    "replacement text contains a later search literal and will be rewritten again"
                );
            }
        }
    }
    Ok(subs)
}

/// A literal must be non-empty and must not contain characters that are
/// escaped inside JSON strings.
fn check_literal(field: IdentityField, literal: &str) -> RewriteResult<()> {
    let bad = literal.is_empty()
        || literal
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_control());
    if bad {
        return Err(RewriteError::InvalidLiteral {
            field,
            literal: literal.to_string(),
        });
    }
    Ok(())
}

/// Apply `subs` to `text` in order, returning the new text and the match
/// count of each substitution.
pub fn apply_substitutions(text: &str, subs: &[Substitution]) -> (String, SubstitutionReport) {
    let mut out = text.to_string();
    let mut report = SubstitutionReport::default();
    for sub in subs {
        let n = out.matches(sub.old.as_str()).count();
        if n > 0 {
            out = out.replace(sub.old.as_str(), &sub.new);
        }
        debug!(field = %sub.field, matches = n, "substituted");
        report.counts.push((sub.field, n));
    }
    (out, report)
}

fn rewrite<I: Identity>(scratch: &mut ScratchFile, old: &I, new: &I) -> RewriteResult<SubstitutionReport> {
    let subs = plan_substitutions(old, new)?;
    let text = scratch.read_string()?;
    let (text, report) = apply_substitutions(&text, &subs);
    scratch.write(text.as_bytes())?;
    Ok(report)
}

/// Replace every field of validator `old` with `new` in the scratch file,
/// then re-sort balance coin lists.
pub fn replace_validator(
    scratch: &mut ScratchFile,
    old: &Validator,
    new: &Validator,
    steps: &mut StepLog,
) -> RewriteResult<SubstitutionReport> {
    steps.log(format!(
        "Replacing validator {} with {}",
        old.label(),
        new.label()
    ));
    let report = rewrite(scratch, old, new)?;

    let mut tree = scratch.parse()?;
    let sorted = sort_balance_coins(&mut tree)?;
    scratch.store(&tree)?;
    debug!(accounts = sorted, "balance coins re-sorted");
    Ok(report)
}

/// Replace every field of delegator `old` with `new` in the scratch file.
pub fn replace_delegator(
    scratch: &mut ScratchFile,
    old: &Delegator,
    new: &Delegator,
    steps: &mut StepLog,
) -> RewriteResult<SubstitutionReport> {
    steps.log(format!(
        "Replacing delegator {} with {}",
        old.label(),
        new.label()
    ));
    rewrite(scratch, old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    const FIXTURE: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../testdata/minimal_genesis.json"
    ));

    fn old_validator() -> Validator {
        Validator::new()
            .with_self_delegation_address("cosmos1lj54q70v2mt9e7c5mtp5xgg5n9c0hkas60kec9")
            .with_self_delegation_public_key("Aiu5OMUoNnBnWiWOC/Z/Luyq2XFROqubW5oP4Y8y/Lzz")
            .with_address("19CEF0E87C6FBDED2A2A486069C8F4DD51BD3981")
            .with_public_key("T6bqYkfRS1toJAFN8R34MByeuj1siCx0/0GdIgX8SmI=")
            .with_operator_address("cosmosvaloper1lj54q70v2mt9e7c5mtp5xgg5n9c0hkaslmzv5k")
            .with_consensus_address("cosmosvalcons1r880p6rud7776232fpsxnj85m4gm6wvpe2pkp2")
    }

    fn new_validator() -> Validator {
        Validator::new()
            .with_self_delegation_address("cosmos1aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
            .with_self_delegation_public_key("AnewSelfDelegationKeyAAAAAAAAAAAAAAAAAAAAAAA")
            .with_address("0000000000000000000000000000000000000ABC")
            .with_public_key("NEWconsensusKeyAAAAAAAAAAAAAAAAAAAAAAAAAAA=")
            .with_operator_address("cosmosvaloper1bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
            .with_consensus_address("cosmosvalcons1cccccccccccccccccccccccccccccccccccccc")
    }

    #[test]
    fn plan_orders_longest_literal_first() {
        let subs = plan_substitutions(&old_validator(), &new_validator()).unwrap();
        let lens: Vec<_> = subs.iter().map(|s| s.old.len()).collect();
        let mut sorted = lens.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted);
        assert_eq!(subs.len(), 6);
    }

    #[test]
    fn plan_is_stable_for_equal_lengths() {
        let old = Delegator::new().with_address("aaaa").with_public_key("bbbb");
        let new = Delegator::new().with_address("cccc").with_public_key("dddd");
        let subs = plan_substitutions(&old, &new).unwrap();
        assert_eq!(subs[0].field, IdentityField::Address);
        assert_eq!(subs[1].field, IdentityField::PublicKey);
    }

    #[test]
    fn unset_old_fields_are_skipped() {
        let old = Delegator::new().with_address("cosmos1old");
        let new = Delegator::new().with_address("cosmos1new");
        let subs = plan_substitutions(&old, &new).unwrap();
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn missing_new_field_is_an_error() {
        let old = Delegator::new().with_address("cosmos1old").with_public_key("key");
        let new = Delegator::new().with_address("cosmos1new");
        let err = plan_substitutions(&old, &new).unwrap_err();
        assert!(matches!(
            err,
            RewriteError::MissingField {
                kind: "delegator",
                field: IdentityField::PublicKey
            }
        ));
    }

    #[test]
    fn literals_that_break_json_are_rejected() {
        for bad in ["", "a\"b", "a\\b", "a\nb"] {
            let old = Delegator::new().with_address("cosmos1old");
            let new = Delegator::new().with_address(bad);
            let err = plan_substitutions(&old, &new).unwrap_err();
            assert!(matches!(err, RewriteError::InvalidLiteral { .. }), "{bad:?}");
        }
    }

    #[test]
    fn longer_field_is_not_clipped_by_its_substring() {
        let old = Delegator::new().with_address("abc").with_public_key("abcdef");
        let new = Delegator::new().with_address("X").with_public_key("Y");
        let subs = plan_substitutions(&old, &new).unwrap();
        let (out, report) = apply_substitutions("abcdef abc", &subs);
        assert_eq!(out, "Y X");
        assert_eq!(report.count(IdentityField::PublicKey), Some(1));
        assert_eq!(report.count(IdentityField::Address), Some(1));
    }

    #[test]
    fn zero_matches_are_reported_not_failed() {
        let old = Delegator::new().with_address("nowhere");
        let new = Delegator::new().with_address("somewhere");
        let subs = plan_substitutions(&old, &new).unwrap();
        let (out, report) = apply_substitutions("{}", &subs);
        assert_eq!(out, "{}");
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn replace_validator_rewrites_every_location() {
        let mut scratch = ScratchFile::create(FIXTURE.as_bytes(), None, false).unwrap();
        let mut steps = StepLog::new();
        let old = old_validator();
        let new = new_validator();
        let report = replace_validator(&mut scratch, &old, &new, &mut steps).unwrap();
        assert_eq!(steps.count(), 1);
        assert!(report.total() > 0);

        let text = scratch.read_string().unwrap();
        for &field in Validator::fields() {
            let old_value = old.field(field).unwrap();
            let new_value = new.field(field).unwrap();
            assert!(!text.contains(old_value), "{field} still present");
            assert!(text.contains(new_value), "{field} not inserted");
        }

        let tree: Value = serde_json::from_str(&text).unwrap();
        let app = &tree["app_state"];
        assert_eq!(tree["validators"][1]["address"], "0000000000000000000000000000000000000ABC");
        assert_eq!(
            app["staking"]["validators"][1]["operator_address"],
            "cosmosvaloper1bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
        );
        assert_eq!(
            app["slashing"]["missed_blocks"][0]["address"],
            "cosmosvalcons1cccccccccccccccccccccccccccccccccccccc"
        );
        assert_eq!(
            app["slashing"]["signing_infos"][0]["validator_signing_info"]["address"],
            "cosmosvalcons1cccccccccccccccccccccccccccccccccccccc"
        );
        assert_eq!(
            app["distribution"]["delegator_starting_infos"][0]["delegator_address"],
            "cosmos1aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
        assert_eq!(
            app["genutil"]["gen_txs"][0]["body"]["memo"],
            "0000000000000000000000000000000000000ABC@10.0.0.1:26656;operator=cosmosvaloper1bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
        );
    }

    #[test]
    fn replace_delegator_touches_only_delegator_fields() {
        let mut scratch = ScratchFile::create(FIXTURE.as_bytes(), None, false).unwrap();
        let mut steps = StepLog::new();
        let old = Delegator::new().with_address("cosmos10v6wvdenee8r9l6wlsphcgur2ltl8ztkvhc8fw");
        let new = Delegator::new().with_address("cosmos1dddddddddddddddddddddddddddddddddddddd");
        let report = replace_delegator(&mut scratch, &old, &new, &mut steps).unwrap();
        // auth account, bank balance, starting info, delegation
        assert_eq!(report.total(), 4);
        let text = scratch.read_string().unwrap();
        assert!(text.contains("cosmosvaloper10v6wvdenee8r9l6wlsphcgur2ltl8ztkfrvj9a"));
    }

    proptest! {
        #[test]
        fn applying_no_substitutions_is_identity(text in "[ -~]{0,64}") {
            let (out, report) = apply_substitutions(&text, &[]);
            prop_assert_eq!(out, text);
            prop_assert_eq!(report.total(), 0);
        }
    }
}
