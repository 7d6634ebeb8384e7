use anyhow::{anyhow, bail, Context as _, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use super::header::{ColumnSchema, COLUMN_ACCOUNT1, COLUMN_AMOUNT, COLUMN_DATE, COLUMN_TYPE};
use super::utils::{parse_amount, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Expense,
    Income,
    Transfer,
    AssetAdjustment,
    LiabilityAdjustment,
    ReceivableAdjustment,
}

impl TransactionType {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(match content {
            "支出" => Self::Expense,
            "收入" => Self::Income,
            "转账" => Self::Transfer,
            "余额变更" => Self::AssetAdjustment,
            "负债变更" => Self::LiabilityAdjustment,
            "债权变更" => Self::ReceivableAdjustment,
            _ => bail!("Unknown transaction type: {:?}", content),
        })
    }
}

/// One data row of a sui.com export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiRow {
    pub ty: TransactionType,
    pub date: NaiveDate,
    pub account1: String,
    pub account2: Option<String>,
    pub amount: Decimal,
    pub category: Option<String>,
    pub payee: Option<String>,
    pub narration: Option<String>,
}

impl SuiRow {
    pub fn parse(schema: &ColumnSchema, record: &StringRecord) -> Result<Self> {
        let required = |index: usize, column: &str| {
            optional_cell(record, Some(index))
                .ok_or_else(|| anyhow!("Missing value in column {}", column))
        };
        let ty = TransactionType::parse(required(schema.ty, COLUMN_TYPE)?)?;
        let date = parse_date(required(schema.date, COLUMN_DATE)?)?;
        let account1 = required(schema.account1, COLUMN_ACCOUNT1)?.to_string();
        let amount = parse_amount(required(schema.amount, COLUMN_AMOUNT)?)
            .with_context(|| anyhow!("Invalid value in column {}", COLUMN_AMOUNT))?;
        Ok(Self {
            ty,
            date,
            account1,
            account2: optional_cell(record, schema.account2).map(str::to_string),
            amount,
            category: optional_cell(record, schema.category).map(str::to_string),
            payee: optional_cell(record, schema.payee).map(str::to_string),
            narration: optional_cell(record, schema.narration).map(str::to_string),
        })
    }
}

fn optional_cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|index| record.get(index))
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn schema() -> ColumnSchema {
        ColumnSchema::from_header_row(&StringRecord::from(vec![
            "交易类型", "日期", "子分类", "账户1", "账户2", "金额", "商家", "备注",
        ]))
        .unwrap()
    }

    #[rstest]
    #[case("支出", TransactionType::Expense)]
    #[case("收入", TransactionType::Income)]
    #[case("转账", TransactionType::Transfer)]
    #[case("余额变更", TransactionType::AssetAdjustment)]
    #[case("负债变更", TransactionType::LiabilityAdjustment)]
    #[case("债权变更", TransactionType::ReceivableAdjustment)]
    fn transaction_types(#[case] input: &str, #[case] expected: TransactionType) {
        assert_eq!(expected, TransactionType::parse(input).unwrap());
    }

    #[test]
    fn unknown_transaction_type() {
        let err = TransactionType::parse("退款").unwrap_err();
        assert_eq!("Unknown transaction type: \"退款\"", err.to_string());
    }

    #[test]
    fn parse_expense_row() {
        let record = StringRecord::from(vec![
            "支出",
            "2023-01-05 12:00",
            "食品杂货",
            "Chase Checking",
            "",
            "42.50",
            " Whole Foods ",
            "",
        ]);
        assert_eq!(
            SuiRow {
                ty: TransactionType::Expense,
                date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
                account1: "Chase Checking".to_string(),
                account2: None,
                amount: Decimal::new(4250, 2),
                category: Some("食品杂货".to_string()),
                payee: Some("Whole Foods".to_string()),
                narration: None,
            },
            SuiRow::parse(&schema(), &record).unwrap()
        );
    }

    #[test]
    fn short_row_treats_missing_cells_as_empty() {
        let record = StringRecord::from(vec!["转账", "2023-01-05", "", "现金", "招行", "10"]);
        let row = SuiRow::parse(&schema(), &record).unwrap();
        assert_eq!(Some("招行".to_string()), row.account2);
        assert_eq!(None, row.payee);
        assert_eq!(None, row.narration);
    }

    #[test]
    fn missing_account() {
        let record = StringRecord::from(vec!["支出", "2023-01-05", "食品杂货", " ", "", "1"]);
        let err = SuiRow::parse(&schema(), &record).unwrap_err();
        assert_eq!("Missing value in column 账户1", err.to_string());
    }

    #[test]
    fn invalid_amount() {
        let record = StringRecord::from(vec!["支出", "2023-01-05", "食品杂货", "现金", "", "abc"]);
        let err = SuiRow::parse(&schema(), &record).unwrap_err();
        assert_eq!("Invalid value in column 金额", err.to_string());
    }

    #[test]
    fn invalid_date() {
        let record = StringRecord::from(vec!["支出", "2023-02-30", "食品杂货", "现金", "", "1"]);
        let err = SuiRow::parse(&schema(), &record).unwrap_err();
        assert_eq!("Failed to parse date \"2023-02-30\"", err.to_string());
    }
}
