use csv::StringRecord;

pub const COLUMN_TYPE: &str = "交易类型";
pub const COLUMN_DATE: &str = "日期";
pub const COLUMN_ACCOUNT1: &str = "账户1";
pub const COLUMN_ACCOUNT2: &str = "账户2";
pub const COLUMN_AMOUNT: &str = "金额";
pub const COLUMN_CATEGORY: &str = "子分类";
pub const COLUMN_PAYEE: &str = "商家";
pub const COLUMN_NARRATION: &str = "备注";

/// Column indices of a sui.com export, taken from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub ty: usize,
    pub date: usize,
    pub account1: usize,
    pub amount: usize,
    pub account2: Option<usize>,
    pub category: Option<usize>,
    pub payee: Option<usize>,
    pub narration: Option<usize>,
}

impl ColumnSchema {
    /// Returns `None` if the record isn't a header row, i.e. doesn't name all required columns.
    pub fn from_header_row(record: &StringRecord) -> Option<Self> {
        let find = |name: &str| record.iter().position(|cell| cell.trim() == name);
        Some(Self {
            ty: find(COLUMN_TYPE)?,
            date: find(COLUMN_DATE)?,
            account1: find(COLUMN_ACCOUNT1)?,
            amount: find(COLUMN_AMOUNT)?,
            account2: find(COLUMN_ACCOUNT2),
            category: find(COLUMN_CATEGORY),
            payee: find(COLUMN_PAYEE),
            narration: find(COLUMN_NARRATION),
        })
    }
}
