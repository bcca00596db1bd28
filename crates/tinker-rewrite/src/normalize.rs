use serde_json::Value;
use tinker_store::{paths, GenesisDocument, StoreError};

use crate::error::RewriteResult;

/// Stably sort every `app_state.bank.balances[].coins` list by denom.
///
/// Returns the number of accounts visited.
pub fn sort_balance_coins(tree: &mut Value) -> RewriteResult<usize> {
    let mut doc = GenesisDocument::from_value(std::mem::take(tree))?;
    let result = sort_in(&mut doc);
    *tree = doc.into_value();
    result
}

fn sort_in(doc: &mut GenesisDocument) -> RewriteResult<usize> {
    let balances = doc.array_mut(paths::BANK_BALANCES)?;
    for (i, balance) in balances.iter_mut().enumerate() {
        let coins = balance
            .get_mut("coins")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| StoreError::WrongType {
                path: format!("app_state.bank.balances.{i}.coins"),
                expected: "array",
            })?;
        coins.sort_by(|a, b| denom(a).cmp(denom(b)));
    }
    Ok(balances.len())
}

fn denom(coin: &Value) -> &str {
    coin.get("denom").and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn genesis_with_coins(coins: Value) -> Value {
        json!({"app_state": {"bank": {"balances": [{"address": "cosmos1x", "coins": coins}]}}})
    }

    #[test]
    fn sorts_coins_by_denom() {
        let mut tree = genesis_with_coins(json!([
            {"denom": "uosmo", "amount": "1"},
            {"denom": "uatom", "amount": "2"}
        ]));
        assert_eq!(sort_balance_coins(&mut tree).unwrap(), 1);
        let coins = &tree["app_state"]["bank"]["balances"][0]["coins"];
        assert_eq!(coins[0]["denom"], "uatom");
        assert_eq!(coins[1]["denom"], "uosmo");
    }

    #[test]
    fn missing_bank_is_an_error_and_tree_is_kept() {
        let mut tree = json!({"app_state": {}});
        assert!(sort_balance_coins(&mut tree).is_err());
        assert_eq!(tree, json!({"app_state": {}}));
    }

    proptest! {
        #[test]
        fn result_is_sorted_and_a_permutation(denoms in proptest::collection::vec("[a-z]{1,6}", 0..12)) {
            let coins: Vec<Value> = denoms
                .iter()
                .enumerate()
                .map(|(i, d)| json!({"denom": d, "amount": i.to_string()}))
                .collect();
            let mut tree = genesis_with_coins(Value::Array(coins));
            sort_balance_coins(&mut tree).unwrap();
            let sorted = tree["app_state"]["bank"]["balances"][0]["coins"].as_array().unwrap();
            let got: Vec<&str> = sorted.iter().map(denom).collect();
            let mut expected: Vec<&str> = denoms.iter().map(String::as_str).collect();
            expected.sort();
            prop_assert_eq!(got, expected);
        }
    }
}
