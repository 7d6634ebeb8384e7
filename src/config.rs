use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::ir::{AccountType, BeancountAccount};

/// Mapping from sui.com account names, currencies and categories onto a beancount ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// sui.com account name -> beancount account
    pub accounts: BTreeMap<String, String>,
    /// sui.com account name -> currency
    pub currencies: BTreeMap<String, String>,
    /// sui.com category -> beancount account
    pub categories: BTreeMap<String, String>,
    pub asset_adjustment_account: String,
    pub liability_adjustment_account: String,
    pub receivable_adjustment_account: String,
    /// sui.com accounts that hold money owed to us (债权)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub receivable_accounts: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountClass {
    Asset,
    Liability,
    Receivable,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| anyhow!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| anyhow!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, account) in &self.accounts {
            BeancountAccount::parse(account)
                .with_context(|| anyhow!("Error in account {}: {}", name, account))?;
        }
        for (name, category) in &self.categories {
            BeancountAccount::parse(category)
                .with_context(|| anyhow!("Error in category {}: {}", name, category))?;
        }
        for (key, account) in [
            ("asset_adjustment_account", &self.asset_adjustment_account),
            ("liability_adjustment_account", &self.liability_adjustment_account),
            ("receivable_adjustment_account", &self.receivable_adjustment_account),
        ] {
            BeancountAccount::parse(account)
                .with_context(|| anyhow!("Error in {}: {}", key, account))?;
        }
        for (name, currency) in &self.currencies {
            validate_currency(currency)
                .with_context(|| anyhow!("Error in currency of account {}", name))?;
        }
        if let Some(currency) = &self.default_currency {
            validate_currency(currency).context("Error in default_currency")?;
        }
        Ok(())
    }

    pub fn lookup_account(&self, name: &str) -> Result<BeancountAccount> {
        let account = self
            .accounts
            .get(name)
            .with_context(|| anyhow!("Account not found in config: {}", name))?;
        BeancountAccount::parse(account)
    }

    pub fn lookup_currency(&self, name: &str) -> Result<String> {
        self.currencies
            .get(name)
            .or(self.default_currency.as_ref())
            .cloned()
            .with_context(|| {
                anyhow!(
                    "No currency configured for account {} and no default_currency set",
                    name
                )
            })
    }

    /// Returns `None` if the category isn't mapped.
    pub fn lookup_category(&self, label: &str) -> Result<Option<BeancountAccount>> {
        self.categories
            .get(label)
            .map(|category| BeancountAccount::parse(category))
            .transpose()
    }

    pub fn classify(&self, name: &str) -> Result<AccountClass> {
        if self.receivable_accounts.contains(name) {
            return Ok(AccountClass::Receivable);
        }
        Ok(match self.lookup_account(name)?.ty {
            AccountType::Liabilities => AccountClass::Liability,
            _ => AccountClass::Asset,
        })
    }

    pub fn adjustment_account(&self, class: AccountClass) -> Result<BeancountAccount> {
        BeancountAccount::parse(match class {
            AccountClass::Asset => &self.asset_adjustment_account,
            AccountClass::Liability => &self.liability_adjustment_account,
            AccountClass::Receivable => &self.receivable_adjustment_account,
        })
    }
}

fn validate_currency(currency: &str) -> Result<()> {
    let chars: Vec<char> = currency.chars().collect();
    let valid = match chars.as_slice() {
        [] => false,
        [single] => single.is_ascii_uppercase(),
        [first, middle @ .., last] => {
            first.is_ascii_uppercase()
                && middle.len() <= 22
                && middle
                    .iter()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || "'._-".contains(*c))
                && (last.is_ascii_uppercase() || last.is_ascii_digit())
        }
    };
    if !valid {
        bail!("Invalid currency {:?}", currency);
    }
    Ok(())
}

pub fn prompt_edit_config(
    imported_account_names: impl Iterator<Item = String>,
    imported_categories: impl Iterator<Item = String>,
) -> Result<Config> {
    let account_names: Vec<String> = imported_account_names.collect();
    let initial_config = Config {
        accounts: account_names
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect(),
        currencies: account_names
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect(),
        categories: imported_categories
            .map(|category| (category, String::new()))
            .collect(),
        asset_adjustment_account: "Equity:Adjustments:Assets".to_string(),
        liability_adjustment_account: "Equity:Adjustments:Liabilities".to_string(),
        receivable_adjustment_account: "Equity:Adjustments:Receivables".to_string(),
        receivable_accounts: BTreeSet::new(),
        default_currency: None,
    };
    let serialized = serde_yaml::to_string(&initial_config)?;
    let Some(edited) = dialoguer::Editor::new().edit(&serialized)? else {
        return Err(anyhow!("You did not save the edits, please try again"));
    };
    Config::parse(&edited)
}
