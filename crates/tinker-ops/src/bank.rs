use tinker_store::{document::dotted, paths};
use tinker_types::Amount;

use crate::coins::{find_coin, insert_sorted, non_negative, read_amount, str_field, write_amount};
use crate::error::{OpsError, OpsResult};
use crate::mutator::GenesisMutator;

impl GenesisMutator<'_> {
    /// Add `denom` to the supply list with `amount`, keeping the list sorted.
    /// An existing denom is left untouched.
    pub fn create_coin(&mut self, denom: &str, amount: &Amount) -> OpsResult<()> {
        self.steps
            .log(format!("Creating new coin {denom} valued at {amount}"));
        let supply = self.doc.array_mut(paths::BANK_SUPPLY)?;
        if find_coin(supply, denom).is_none() {
            non_negative(amount.clone(), &dotted(paths::BANK_SUPPLY), denom)?;
            insert_sorted(supply, denom, amount);
        }
        Ok(())
    }

    /// Add a signed `delta` to the total supply of `denom`, creating the coin
    /// when it is not listed.
    pub fn increase_supply(&mut self, delta: &Amount, denom: &str) -> OpsResult<()> {
        self.steps
            .log(format!("Increasing supply of {denom} by {delta}"));
        let path = dotted(paths::BANK_SUPPLY);
        let supply = self.doc.array_mut(paths::BANK_SUPPLY)?;
        match find_coin(supply, denom) {
            Some(idx) => {
                let coin = &mut supply[idx];
                let updated = non_negative(read_amount(coin, "amount", &path)? + delta.clone(), &path, denom)?;
                write_amount(coin, "amount", &updated);
                Ok(())
            }
            None => self.create_coin(denom, delta),
        }
    }

    /// Add a signed `delta` to one account's `denom` balance and move the
    /// denom's supply by the same amount.
    ///
    /// The account must already have a balance entry. Both the new balance
    /// and the new supply are checked before either is written.
    pub fn increase_balance(&mut self, address: &str, delta: &Amount, denom: &str) -> OpsResult<()> {
        self.steps.log(format!(
            "Increasing balance of {address} by {delta} {denom}"
        ));
        let path = dotted(paths::BANK_BALANCES);

        let supply_after = {
            let supply = self.doc.array(paths::BANK_SUPPLY)?;
            match find_coin(supply, denom) {
                Some(idx) => read_amount(&supply[idx], "amount", &dotted(paths::BANK_SUPPLY))? + delta.clone(),
                None => delta.clone(),
            }
        };
        non_negative(supply_after, &dotted(paths::BANK_SUPPLY), denom)?;

        let balances = self.doc.array_mut(paths::BANK_BALANCES)?;
        let balance = balances
            .iter_mut()
            .find(|b| str_field(b, "address") == Some(address))
            .ok_or_else(|| OpsError::not_found(paths::BANK_BALANCES, format!("address={address}")))?;
        let coins = balance
            .get_mut("coins")
            .and_then(serde_json::Value::as_array_mut)
            .ok_or_else(|| OpsError::not_found(paths::BANK_BALANCES, format!("{address}.coins")))?;
        match find_coin(coins, denom) {
            Some(idx) => {
                let coin = &mut coins[idx];
                let updated = non_negative(read_amount(coin, "amount", &path)? + delta.clone(), &path, denom)?;
                write_amount(coin, "amount", &updated);
            }
            None => {
                non_negative(delta.clone(), &path, denom)?;
                insert_sorted(coins, denom, delta);
            }
        }

        self.increase_supply(delta, denom)
    }

    /// Current `denom` balance of `address`, or `None` without a balance entry.
    pub fn balance_of(&self, address: &str, denom: &str) -> OpsResult<Option<Amount>> {
        let balances = self.doc.array(paths::BANK_BALANCES)?;
        let Some(balance) = balances.iter().find(|b| str_field(b, "address") == Some(address)) else {
            return Ok(None);
        };
        let coins = balance
            .get("coins")
            .and_then(serde_json::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        match find_coin(coins, denom) {
            Some(idx) => Ok(Some(read_amount(&coins[idx], "amount", &dotted(paths::BANK_BALANCES))?)),
            None => Ok(Some(Amount::zero())),
        }
    }
}
