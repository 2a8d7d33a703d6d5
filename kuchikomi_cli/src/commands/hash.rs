use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kuchikomi_lib::validation;
use kuchikomi_lib::{hash_columns, TextEncoding};

use crate::output::{
    hashed_to_json, print_hashed_csv, print_hashed_markdown, print_hashed_table, print_json,
    OutputFormat,
};

#[derive(Args)]
pub struct HashArgs {
    /// CSV file to read
    #[arg(long)]
    pub input: PathBuf,

    /// Comma-separated column names to hash (e.g. 氏名,email)
    #[arg(long)]
    pub columns: String,

    /// Encoding of the input and of the written file
    #[arg(long, default_value = "shift_jis")]
    pub encoding: String,

    /// Write the hashed CSV to this file instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &HashArgs, format: &OutputFormat) -> Result<()> {
    let encoding: TextEncoding = args.encoding.parse()?;
    let columns = validation::validate_columns(&args.columns)?;
    let input = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let table = hash_columns(&input, encoding, &columns)?;

    if let Some(path) = &args.out {
        std::fs::write(path, table.encode(encoding)?)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!(
            "Hashed {} row(s) of {} to {} ({})",
            table.rows.len(),
            columns.join(", "),
            path.display(),
            encoding
        );
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_hashed_table(&table),
        OutputFormat::Json => print_json(&hashed_to_json(&table)),
        OutputFormat::Csv => print_hashed_csv(&table)?,
        OutputFormat::Markdown => print_hashed_markdown(&table),
    }

    Ok(())
}
