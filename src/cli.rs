use anyhow::{bail, Context as _, Result};
use console::{style, StyledObject};
use std::collections::BTreeSet;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use crate::args::{Args, Command};
use crate::config::{self, Config};
use crate::ir::Ledger;
use crate::{export, import, operations};

pub fn main(args: Args) -> Result<()> {
    match args.command {
        Command::Extract {
            config,
            sort_by_date,
            csv_files,
        } => {
            let summary = main_extract(
                &config,
                &csv_files,
                args.delimiter,
                sort_by_date,
                &mut stdout().lock(),
            )?;
            print_summary(&summary);
        }
        Command::Identify { csv_files } => main_identify(&csv_files, args.delimiter)?,
        Command::InitConfig { config, csv_files } => {
            main_init_config(&config, &csv_files, args.delimiter)?
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub num_files: usize,
    pub num_transactions: usize,
    pub num_flagged: usize,
}

/// Imports all files with the given config and writes the beancount entries to `output`.
pub fn main_extract(
    config_path: &Path,
    csv_files: &[PathBuf],
    delimiter: u8,
    sort_by_date: bool,
    output: &mut impl Write,
) -> Result<ExtractSummary> {
    let config = Config::load(config_path)?;
    let ledger = extract_ledger(&config, csv_files, delimiter)?;
    let ledger = if sort_by_date {
        operations::sort_transactions_by_date(ledger)
    } else {
        ledger
    };
    operations::warn_about_unbalanced_transactions(&ledger);

    export::write_exported_transactions(output, &ledger)?;
    output.flush()?;

    Ok(ExtractSummary {
        num_files: csv_files.len(),
        num_transactions: ledger.transactions.len(),
        num_flagged: operations::count_flagged_transactions(&ledger),
    })
}

fn extract_ledger(config: &Config, csv_files: &[PathBuf], delimiter: u8) -> Result<Ledger> {
    let ledgers = csv_files
        .iter()
        .map(|path| {
            let export = import::load_file(path, delimiter)?;
            log::info!("{}: {} rows", export.file_name, export.num_rows());
            import::to_ir(export, config)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(operations::concat(ledgers))
}

fn main_identify(csv_files: &[PathBuf], delimiter: u8) -> Result<()> {
    for path in csv_files {
        let status = if import::identify(path, delimiter)? {
            style("sui.com export").green()
        } else {
            style("not a sui.com export").red()
        };
        println!("{}: {}", path.display(), status);
    }
    Ok(())
}

fn main_init_config(config_path: &Path, csv_files: &[PathBuf], delimiter: u8) -> Result<()> {
    if config_path.exists() {
        bail!("Config file {} already exists", config_path.display());
    }
    let exports = csv_files
        .iter()
        .map(|path| import::load_file(path, delimiter))
        .collect::<Result<Vec<_>>>()?;
    let account_names: BTreeSet<String> = exports
        .iter()
        .flat_map(|export| export.account_names())
        .map(str::to_string)
        .collect();
    let categories: BTreeSet<String> = exports
        .iter()
        .flat_map(|export| export.categories())
        .map(str::to_string)
        .collect();

    let config = config::prompt_edit_config(account_names.into_iter(), categories.into_iter())?;
    std::fs::write(config_path, serde_yaml::to_string(&config)?)
        .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
    eprintln!(
        "{} {}",
        style_header("Wrote config file"),
        config_path.display()
    );
    Ok(())
}

fn print_summary(summary: &ExtractSummary) {
    eprintln!(
        "{} {} transactions from {} files",
        style_header("Imported"),
        summary.num_transactions,
        summary.num_files,
    );
    if summary.num_flagged > 0 {
        eprintln!(
            "{}",
            style(format!(
                "{} transactions are flagged with '!' and need review",
                summary.num_flagged
            ))
            .yellow()
        );
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}
