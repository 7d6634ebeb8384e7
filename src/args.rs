use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Import transactions from sui.com (随手记) CSV exports and export them to beancount.
#[derive(Parser, Debug)]
pub struct Args {
    /// Log every parsed row
    #[clap(long, global = true)]
    pub debug: bool,

    /// Field delimiter of the CSV exports, a single ASCII character or "tab"
    #[clap(long, global = true, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the transactions of the given exports as beancount entries to stdout
    Extract {
        /// Path to the YAML file mapping accounts, currencies and categories
        #[clap(short, long)]
        config: PathBuf,

        /// Sort transactions by date instead of keeping the order of the exports
        #[clap(long)]
        sort_by_date: bool,

        /// sui.com CSV exports
        #[clap(required = true)]
        csv_files: Vec<PathBuf>,
    },

    /// Check which of the given files are sui.com CSV exports
    Identify {
        #[clap(required = true)]
        csv_files: Vec<PathBuf>,
    },

    /// Create a config file for the accounts and categories found in the given exports
    InitConfig {
        /// Where to write the config file
        #[clap(short, long)]
        config: PathBuf,

        /// sui.com CSV exports
        #[clap(required = true)]
        csv_files: Vec<PathBuf>,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [delimiter] if delimiter.is_ascii() => Ok(*delimiter),
            _ => Err(format!("Delimiter must be a single ASCII character, got {value:?}")),
        },
    }
}
