mod render;
mod scan;
mod session;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use skuscan_core::{Identifier, SitesFile};
use tracing_subscriber::EnvFilter;

use crate::render::View;
use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "skuscan")]
#[command(about = "Look up a product code across catalog sites and compare prices")]
struct Cli {
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Site definitions file (defaults to `SKUSCAN_SITES_PATH`).
    #[arg(long, global = true, value_name = "PATH")]
    sites: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look a code up on one site (the first configured site by default).
    Lookup {
        identifier: String,
        /// Site name or slug.
        #[arg(long)]
        site: Option<String>,
    },
    /// Look a code up on every configured site and compare prices.
    Compare { identifier: String },
    /// Read scanner output from stdin and look up each new code.
    Scan {
        /// Restrict scanning lookups to one site.
        #[arg(long)]
        site: Option<String>,
    },
    /// List configured sites.
    Sites,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let config = skuscan_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let sites_path = cli.sites.unwrap_or_else(|| config.sites_path.clone());
    let sites = skuscan_core::load_sites(&sites_path)
        .with_context(|| format!("loading site definitions from {}", sites_path.display()))?;
    tracing::debug!(
        env = %config.env,
        sites = sites.sites.len(),
        match_mode = %config.match_mode,
        "configuration loaded"
    );

    match command {
        Commands::Lookup { identifier, site } => {
            let session = Session::single(&config, &sites, site.as_deref())?;
            run_once(&session, &identifier, cli.json).await
        }
        Commands::Compare { identifier } => {
            let session = Session::all(&config, &sites)?;
            run_once(&session, &identifier, cli.json).await
        }
        Commands::Scan { site } => {
            let session = match site.as_deref() {
                Some(name) => Session::single(&config, &sites, Some(name))?,
                None => Session::all(&config, &sites)?,
            };
            tracing::info!(sites = session.site_count(), "waiting for scanner input on stdin");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            scan::scan_loop(
                stdin,
                |identifier| session.search_boxed(identifier),
                |result| present(result, cli.json),
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sites => {
            print_sites(&sites, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_once(session: &Session, raw: &str, json: bool) -> anyhow::Result<ExitCode> {
    let Ok(identifier) = Identifier::new(raw) else {
        render::write_text(&View::NoInput, &mut std::io::stdout(), &mut std::io::stderr())?;
        return Ok(View::NoInput.exit_code());
    };
    let result = session.search(identifier).await;
    present(&result, json)?;
    Ok(View::of(&result).exit_code())
}

fn present(result: &skuscan_core::ComparisonResult, json: bool) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, result)?;
        writeln!(out)?;
    } else {
        render::write_text(&View::of(result), &mut out, &mut std::io::stderr())?;
    }
    Ok(())
}

fn print_sites(sites: &SitesFile, json: bool) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &sites.sites)?;
        writeln!(out)?;
        return Ok(());
    }
    for site in &sites.sites {
        writeln!(out, "{} ({})", site.name, site.slug())?;
        writeln!(out, "  search: {}", site.search_url)?;
        writeln!(out, "  model labels: {}", site.model_labels.join(", "))?;
        if let Some(notes) = &site.notes {
            writeln!(out, "  notes: {notes}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
