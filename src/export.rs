use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use beancount_core::{Directive, Flag, IncompleteAmount};
use common_macros::{hash_map, hash_set};

use crate::ir::{AccountType, BeancountAccount, Ledger, Posting, Transaction};

pub fn write_exported_transactions(writer: &mut impl Write, ledger: &Ledger) -> Result<()> {
    let ledger = beancount_core::Ledger {
        directives: ledger
            .transactions
            .iter()
            .map(transaction_to_beancount)
            .collect(),
    };
    if ledger.directives.is_empty() {
        log::warn!("No transactions to export");
    }
    beancount_render::render(writer, &ledger)?;
    Ok(())
}

fn transaction_to_beancount(transaction: &Transaction) -> Directive<'_> {
    let flag = if transaction.is_balanced() && !transaction.has_flagged_postings() {
        Flag::Okay
    } else {
        Flag::Warning
    };
    Directive::Transaction(beancount_core::Transaction {
        date: transaction.date.into(),
        flag,
        payee: transaction.payee.as_deref().map(Cow::Borrowed),
        tags: hash_set![],
        links: hash_set![],
        narration: Cow::Borrowed(transaction.narration.as_str()),
        postings: transaction
            .postings
            .iter()
            .map(posting_to_beancount)
            .collect(),
        meta: hash_map![],
        source: None,
    })
}

fn posting_to_beancount(posting: &Posting) -> beancount_core::Posting<'_> {
    beancount_core::Posting {
        account: account_to_beancount(&posting.account),
        units: IncompleteAmount {
            num: Some(posting.amount),
            currency: Some(Cow::Borrowed(posting.currency.as_str())),
        },
        cost: None,
        price: None,
        flag: posting.flagged.then_some(Flag::Warning),
        meta: hash_map![],
    }
}

fn account_to_beancount(account: &BeancountAccount) -> beancount_core::Account<'_> {
    let ty = match account.ty {
        AccountType::Assets => beancount_core::AccountType::Assets,
        AccountType::Liabilities => beancount_core::AccountType::Liabilities,
        AccountType::Equity => beancount_core::AccountType::Equity,
        AccountType::Income => beancount_core::AccountType::Income,
        AccountType::Expenses => beancount_core::AccountType::Expenses,
    };
    let parts = account
        .name_parts
        .iter()
        .map(|v| Cow::Borrowed(v.as_str()))
        .collect();
    beancount_core::Account { ty, parts }
}
