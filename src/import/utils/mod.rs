mod amount;
mod date;

pub use amount::parse_amount;
pub use date::parse_date;
