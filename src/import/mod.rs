use anyhow::{anyhow, Context as _, Result};
use csv::StringRecord;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

mod header;
mod mapper;
mod row;
mod utils;

use header::ColumnSchema;
use row::SuiRow;

use crate::config::Config;
use crate::ir::{Ledger, SourceLocation};

/// A parsed export file, before any mapping onto beancount accounts happened.
#[derive(Debug)]
pub struct SuiExport {
    pub file_name: String,
    pub rows: Vec<(SourceLocation, SuiRow)>,
}

impl SuiExport {
    /// Names of all accounts referenced by the export, sorted.
    pub fn account_names(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|(_, row)| {
                std::iter::once(row.account1.as_str()).chain(row.account2.as_deref())
            })
            .collect()
    }

    /// Labels of all categories referenced by the export, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .filter_map(|(_, row)| row.category.as_deref())
            .collect()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

pub const DEFAULT_DELIMITER: u8 = b',';

pub fn load_file(path: &Path, delimiter: u8) -> Result<SuiExport> {
    let file = std::fs::File::open(path)
        .with_context(|| anyhow!("Failed to open {}", path.display()))?;
    load(path.display().to_string(), file, delimiter)
}

pub fn load(file_name: String, mut input_stream: impl Read, delimiter: u8) -> Result<SuiExport> {
    let mut content = String::new();
    input_stream
        .read_to_string(&mut content)
        .with_context(|| anyhow!("Failed to read {} as UTF-8", file_name))?;
    let content = maybe_remove_byte_order_mark(content);

    let mut records = reader(&content, delimiter).into_records();
    let schema = loop {
        let Some(record) = records.next() else {
            return Err(anyhow!(
                "{} is not a sui.com export, couldn't find the header row",
                file_name
            ));
        };
        let record = record.with_context(|| anyhow!("Failed to read {}", file_name))?;
        match ColumnSchema::from_header_row(&record) {
            Some(schema) => break schema,
            None => log::debug!("{}: Skipping preamble line {:?}", file_name, record),
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.with_context(|| anyhow!("Failed to read {}", file_name))?;
        if should_skip(&record) {
            continue;
        }
        let source = SourceLocation {
            file: file_name.clone(),
            line: record.position().map(|position| position.line()).unwrap_or(0),
        };
        log::debug!("{}: {:?}", source, record);
        let row = SuiRow::parse(&schema, &record)
            .with_context(|| anyhow!("Failed to parse row at {}", source))?;
        rows.push((source, row));
    }
    Ok(SuiExport { file_name, rows })
}

/// Maps all rows of an export to beancount transactions, in file order.
pub fn to_ir(export: SuiExport, config: &Config) -> Result<Ledger> {
    let transactions = export
        .rows
        .into_iter()
        .map(|(source, row)| {
            let location = source.to_string();
            mapper::row_to_transaction(config, row, source)
                .with_context(|| anyhow!("Failed to import row at {}", location))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Ledger { transactions })
}

/// Returns true if the file has the header row of a sui.com export.
pub fn identify(path: &Path, delimiter: u8) -> Result<bool> {
    let content = std::fs::read(path)
        .with_context(|| anyhow!("Failed to read {}", path.display()))?;
    let Ok(content) = String::from_utf8(content) else {
        return Ok(false);
    };
    let content = maybe_remove_byte_order_mark(content);
    Ok(reader(&content, delimiter)
        .into_records()
        .map_while(|record| record.ok())
        .any(|record| ColumnSchema::from_header_row(&record).is_some()))
}

fn reader(content: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes())
}

fn should_skip(record: &StringRecord) -> bool {
    if record.iter().all(|cell| cell.trim().is_empty()) {
        return true;
    }
    record
        .get(0)
        .map(|cell| cell.trim_start().starts_with('#'))
        .unwrap_or(false)
}

fn maybe_remove_byte_order_mark(mut content: String) -> String {
    if content.starts_with("\u{FEFF}") {
        content.remove(0);
    }
    content
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;

    use super::row::TransactionType;
    use super::*;
    use crate::config::tests::example_config;

    const EXPORT: &str = "\u{FEFF}随手记导出文件
交易类型,日期,类别,子分类,账户1,账户2,金额,成员,商家,项目,备注
支出,2023-01-05 12:30:00,食品,食品杂货,Chase Checking,,42.50,,Whole Foods,,weekly shopping

# a comment
收入,2023-01-06,职业收入,工资收入,Chase Checking,,\"1,000.00\",,ACME,,
转账,2023-01-07,,,现金,招行信用卡,200.00,,,,
";

    #[test]
    fn load_export() {
        let export = load("export.csv".to_string(), EXPORT.as_bytes(), DEFAULT_DELIMITER).unwrap();
        assert_eq!("export.csv", export.file_name);
        assert_eq!(3, export.num_rows());

        let (source, first) = &export.rows[0];
        assert_eq!(
            SourceLocation {
                file: "export.csv".to_string(),
                line: 3,
            },
            *source
        );
        assert_eq!(TransactionType::Expense, first.ty);
        assert_eq!(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(), first.date);
        assert_eq!(Some("weekly shopping"), first.narration.as_deref());

        let (source, second) = &export.rows[1];
        assert_eq!(6, source.line);
        assert_eq!(Decimal::new(100000, 2), second.amount);
        assert_eq!(None, second.narration);

        let (_, third) = &export.rows[2];
        assert_eq!(TransactionType::Transfer, third.ty);
        assert_eq!(Some("招行信用卡"), third.account2.as_deref());
    }

    #[test]
    fn account_names_and_categories() {
        let export = load("export.csv".to_string(), EXPORT.as_bytes(), DEFAULT_DELIMITER).unwrap();
        assert_eq!(
            vec!["Chase Checking", "招行信用卡", "现金"],
            export.account_names().into_iter().collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["工资收入", "食品杂货"],
            export.categories().into_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn import_export() {
        let export = load("export.csv".to_string(), EXPORT.as_bytes(), DEFAULT_DELIMITER).unwrap();
        let ledger = to_ir(export, &example_config()).unwrap();
        assert_eq!(3, ledger.transactions.len());
        assert_eq!(
            vec![
                NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 6).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(),
            ],
            ledger
                .transactions
                .iter()
                .map(|t| t.date)
                .collect::<Vec<_>>()
        );
        assert!(ledger.transactions.iter().all(|t| t.is_balanced()));
    }

    #[test]
    fn missing_header() {
        let err = load(
            "export.csv".to_string(),
            "支出,2023-01-05,食品杂货,现金,,1\n".as_bytes(),
            DEFAULT_DELIMITER,
        )
        .unwrap_err();
        assert_eq!(
            "export.csv is not a sui.com export, couldn't find the header row",
            err.to_string()
        );
    }

    #[test]
    fn malformed_row_names_file_and_line() {
        let input = "交易类型,日期,子分类,账户1,金额\n支出,2023-01-05,食品杂货,现金,1\n支出,not a date,食品杂货,现金,1\n";
        let err = load("export.csv".to_string(), input.as_bytes(), DEFAULT_DELIMITER).unwrap_err();
        assert_eq!("Failed to parse row at export.csv:3", err.to_string());
        assert_eq!(
            "Failed to parse date \"not a date\"",
            err.root_cause().to_string()
        );
    }

    #[test]
    fn unmapped_account_names_file_and_line() {
        let input = "交易类型,日期,子分类,账户1,金额\n支出,2023-01-05,食品杂货,不存在,1\n";
        let export = load("export.csv".to_string(), input.as_bytes(), DEFAULT_DELIMITER).unwrap();
        let err = to_ir(export, &example_config()).unwrap_err();
        assert_eq!("Failed to import row at export.csv:2", err.to_string());
        assert_eq!(
            "Account not found in config: 不存在",
            err.root_cause().to_string()
        );
    }

    #[test]
    fn identify_files() {
        let dir = tempfile::tempdir().unwrap();
        let sui = dir.path().join("sui.csv");
        std::fs::write(&sui, EXPORT).unwrap();
        let other = dir.path().join("other.csv");
        std::fs::write(&other, "Date,Description,Amount\n2023-01-05,Coffee,3.50\n").unwrap();
        let binary = dir.path().join("binary.csv");
        std::fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();

        assert!(identify(&sui, DEFAULT_DELIMITER).unwrap());
        assert!(!identify(&other, DEFAULT_DELIMITER).unwrap());
        assert!(!identify(&binary, DEFAULT_DELIMITER).unwrap());
    }

    #[rstest]
    #[case(b',', ",")]
    #[case(b'\t', "\t")]
    #[case(b';', ";")]
    fn load_with_delimiter(#[case] delimiter: u8, #[case] separator: &str) {
        let input = [
            vec!["交易类型", "日期", "子分类", "账户1", "金额", "备注"],
            vec!["支出", "2023-01-05", "食品杂货", "现金", "1,000.00", "rent, january"],
        ]
        .iter()
        .map(|cells| cells.join(separator))
        .collect::<Vec<_>>()
        .join("\n");
        // Cells containing the separator itself would need quoting
        let input = if delimiter == b',' {
            input
                .replace("1,000.00", "\"1,000.00\"")
                .replace("rent, january", "\"rent, january\"")
        } else {
            input
        };
        let export = load("export.tsv".to_string(), input.as_bytes(), delimiter).unwrap();
        assert_eq!(1, export.num_rows());
        let (_, row) = &export.rows[0];
        assert_eq!(Decimal::new(100000, 2), row.amount);
        assert_eq!(Some("rent, january"), row.narration.as_deref());
    }

    #[test]
    fn identify_tab_separated_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sui.tsv");
        std::fs::write(&path, "交易类型\t日期\t账户1\t金额\n支出\t2023-01-05\t现金\t1\n").unwrap();

        assert!(identify(&path, b'\t').unwrap());
        assert!(!identify(&path, DEFAULT_DELIMITER).unwrap());
        let err = load_file(&path, DEFAULT_DELIMITER).unwrap_err();
        assert!(err.to_string().contains("is not a sui.com export"));
    }
}
