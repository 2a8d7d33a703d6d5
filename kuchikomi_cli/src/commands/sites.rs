use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kuchikomi_lib::SiteAdapter;

use crate::output::{
    print_json, print_sites_csv, print_sites_markdown, print_sites_table, OutputFormat,
};

#[derive(Args)]
pub struct SitesArgs {
    /// TOML file with extra or replacement site adapters
    #[arg(long)]
    pub adapters: Option<PathBuf>,
}

pub fn run(args: &SitesArgs, format: &OutputFormat) -> Result<()> {
    let registry = super::load_registry(args.adapters.as_deref())?;
    let adapters: Vec<SiteAdapter> = registry.iter().cloned().collect();

    match format {
        OutputFormat::Table => print_sites_table(&adapters),
        OutputFormat::Json => print_json(&adapters),
        OutputFormat::Csv => print_sites_csv(&adapters)?,
        OutputFormat::Markdown => print_sites_markdown(&adapters),
    }

    Ok(())
}
