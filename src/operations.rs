use crate::ir::Ledger;

/// Stable sort, transactions on the same date keep the order they had in the export.
pub fn sort_transactions_by_date(mut ledger: Ledger) -> Ledger {
    ledger
        .transactions
        .sort_by_key(|transaction| transaction.date);
    ledger
}

pub fn concat(ledgers: impl IntoIterator<Item = Ledger>) -> Ledger {
    Ledger {
        transactions: ledgers
            .into_iter()
            .flat_map(|ledger| ledger.transactions)
            .collect(),
    }
}

/// Logs a warning for every transaction whose postings don't sum up to zero, and returns how many
/// there were.
pub fn warn_about_unbalanced_transactions(ledger: &Ledger) -> usize {
    let mut num_unbalanced = 0;
    for transaction in &ledger.transactions {
        if !transaction.is_balanced() {
            num_unbalanced += 1;
            log::warn!(
                "{}: Transaction on {} is not balanced: {:?}",
                transaction.source,
                transaction.date,
                transaction.postings,
            );
        }
    }
    num_unbalanced
}

pub fn count_flagged_transactions(ledger: &Ledger) -> usize {
    ledger
        .transactions
        .iter()
        .filter(|transaction| transaction.has_flagged_postings() || !transaction.is_balanced())
        .count()
}
