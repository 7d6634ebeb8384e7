use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parses the date cell of an export. Exports contain a date, sometimes followed by a time of
/// day which we drop.
pub fn parse_date(content: &str) -> Result<NaiveDate> {
    let content = content.trim();
    for date_format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(content, date_format) {
            return Ok(date);
        }
        for time_format in TIME_FORMATS {
            let format = format!("{date_format} {time_format}");
            if let Ok(datetime) = NaiveDateTime::parse_from_str(content, &format) {
                return Ok(datetime.date());
            }
        }
    }
    Err(anyhow!("Failed to parse date {:?}", content))
}
