use anyhow::{anyhow, Context as _, Result};
use rust_decimal::Decimal;

use super::row::{SuiRow, TransactionType};
use crate::config::{AccountClass, Config};
use crate::ir::{BeancountAccount, Posting, SourceLocation, Transaction};

/// Maps a row of the export onto a beancount transaction using the account, currency and
/// category tables of the config.
pub fn row_to_transaction(
    config: &Config,
    row: SuiRow,
    source: SourceLocation,
) -> Result<Transaction> {
    let postings = match row.ty {
        TransactionType::Expense => {
            let (account, currency) = account_and_currency(config, &row.account1)?;
            let category = category_or_adjustment(config, &row, &source)?;
            vec![
                posting(account, negate(row.amount), &currency),
                category.into_posting(row.amount, currency),
            ]
        }
        TransactionType::Income => {
            let (account, currency) = account_and_currency(config, &row.account1)?;
            let category = category_or_adjustment(config, &row, &source)?;
            vec![
                posting(account, row.amount, &currency),
                category.into_posting(negate(row.amount), currency),
            ]
        }
        TransactionType::Transfer => transfer_postings(config, &row)?,
        TransactionType::AssetAdjustment => {
            let (account, currency) = account_and_currency(config, &row.account1)?;
            vec![
                posting(account, row.amount, &currency),
                posting(
                    config.adjustment_account(AccountClass::Asset)?,
                    negate(row.amount),
                    &currency,
                ),
            ]
        }
        TransactionType::ReceivableAdjustment => {
            let (account, currency) = account_and_currency(config, &row.account1)?;
            vec![
                posting(account, row.amount, &currency),
                posting(
                    config.adjustment_account(AccountClass::Receivable)?,
                    negate(row.amount),
                    &currency,
                ),
            ]
        }
        TransactionType::LiabilityAdjustment => {
            let (account, currency) = account_and_currency(config, &row.account1)?;
            vec![
                posting(account, negate(row.amount), &currency),
                posting(
                    config.adjustment_account(AccountClass::Liability)?,
                    row.amount,
                    &currency,
                ),
            ]
        }
    };
    Ok(Transaction {
        date: row.date,
        payee: row.payee,
        narration: row.narration.unwrap_or_default(),
        postings,
        source,
    })
}

fn transfer_postings(config: &Config, row: &SuiRow) -> Result<Vec<Posting>> {
    let (from_account, from_currency) = account_and_currency(config, &row.account1)?;
    let to_name = row
        .account2
        .as_deref()
        .ok_or_else(|| anyhow!("Transfer is missing the second account"))?;
    let (to_account, to_currency) = account_and_currency(config, to_name)?;

    let from = posting(from_account, negate(row.amount), &from_currency);
    let to = if from_currency == to_currency {
        posting(to_account, row.amount, &to_currency)
    } else {
        // The export only has the amount in the source currency
        Posting {
            account: to_account,
            amount: Decimal::ZERO,
            currency: to_currency,
            flagged: true,
        }
    };
    Ok(vec![from, to])
}

fn account_and_currency(config: &Config, name: &str) -> Result<(BeancountAccount, String)> {
    Ok((config.lookup_account(name)?, config.lookup_currency(name)?))
}

enum OtherSide {
    Category(BeancountAccount),
    Fallback(BeancountAccount),
}

impl OtherSide {
    fn into_posting(self, amount: Decimal, currency: String) -> Posting {
        let (account, flagged) = match self {
            OtherSide::Category(account) => (account, false),
            OtherSide::Fallback(account) => (account, true),
        };
        Posting {
            account,
            amount,
            currency,
            flagged,
        }
    }
}

fn category_or_adjustment(
    config: &Config,
    row: &SuiRow,
    source: &SourceLocation,
) -> Result<OtherSide> {
    if let Some(label) = &row.category {
        if let Some(category) = config
            .lookup_category(label)
            .with_context(|| anyhow!("Invalid mapping for category {}", label))?
        {
            return Ok(OtherSide::Category(category));
        }
    }
    let class = config.classify(&row.account1)?;
    let fallback = config.adjustment_account(class)?;
    log::warn!(
        "{}: Category {:?} is not mapped, posting to {}",
        source,
        row.category.as_deref().unwrap_or(""),
        fallback,
    );
    Ok(OtherSide::Fallback(fallback))
}

/// Negation that keeps zero amounts positive, so they don't render as `-0.00`.
fn negate(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        amount.abs()
    } else {
        -amount
    }
}

fn posting(account: BeancountAccount, amount: Decimal, currency: &str) -> Posting {
    Posting {
        account,
        amount,
        currency: currency.to_string(),
        flagged: false,
    }
}
