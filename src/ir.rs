use std::collections::BTreeMap;
use std::fmt::{self, Display};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u64,
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub payee: Option<String>,
    pub narration: String,
    pub postings: Vec<Posting>,
    pub source: SourceLocation,
}

impl Transaction {
    /// A transaction is balanced if its postings sum to zero in every currency.
    pub fn is_balanced(&self) -> bool {
        let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
        for posting in &self.postings {
            *sums.entry(posting.currency.as_str()).or_default() += posting.amount;
        }
        sums.values().all(|sum| sum.is_zero())
    }

    pub fn has_flagged_postings(&self) -> bool {
        self.postings.iter().any(|posting| posting.flagged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub account: BeancountAccount,
    pub amount: Decimal,
    pub currency: String,
    /// Set when the posting needs manual review, rendered as a `!` posting flag.
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeancountAccount {
    pub ty: AccountType,
    pub name_parts: Vec<String>,
}

impl BeancountAccount {
    pub fn parse(name: &str) -> Result<Self> {
        let mut parts = name.split(':');
        let ty = match parts.next() {
            Some("Assets") => AccountType::Assets,
            Some("Liabilities") => AccountType::Liabilities,
            Some("Equity") => AccountType::Equity,
            Some("Income") => AccountType::Income,
            Some("Expenses") => AccountType::Expenses,
            _ => bail!(
                "Account must start with one of: Assets:, Liabilities:, Equity:, Income:, Expenses:"
            ),
        };
        let name_parts: Vec<String> = parts.map(str::to_string).collect();
        if name_parts.is_empty() {
            bail!("Account {name:?} needs at least one component after the account type");
        }
        if let Some(part) = name_parts.iter().find(|part| part.trim().is_empty()) {
            bail!("Account {name:?} has an empty component {part:?}");
        }
        Ok(Self { ty, name_parts })
    }

    pub fn beancount_name(&self) -> String {
        format!("{}:{}", self.ty.name(), self.name_parts.join(":"))
    }
}

impl Display for BeancountAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.beancount_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

impl AccountType {
    pub fn name(self) -> &'static str {
        match self {
            AccountType::Assets => "Assets",
            AccountType::Liabilities => "Liabilities",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expenses => "Expenses",
        }
    }
}
