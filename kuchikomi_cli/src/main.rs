mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "kuchikomi")]
#[command(about = "Collect product reviews from Japanese review sites")]
struct Cli {
    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reviews for one product
    Reviews(Box<commands::reviews::ReviewsArgs>),
    /// List the available site adapters
    Sites(commands::sites::SitesArgs),
    /// Replace selected CSV columns with SHA-256 digests
    Hash(commands::hash::HashArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kuchikomi=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Reviews(args) => commands::reviews::run(args.as_ref(), &format).await?,
        Commands::Sites(args) => commands::sites::run(args, &format)?,
        Commands::Hash(args) => commands::hash::run(args, &format)?,
    }

    Ok(())
}
