use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use attsweep_cli::config::{CliConfig, Command};
use attsweep_cli::render::{render_catalog, render_report, render_stats};
use attsweep_cli::select::{is_confirmation, parse_selection_key};
use attsweep_client::{HttpClient, TrackerClient};
use attsweep_engine::{CancelToken, Session};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CliConfig::parse();
    let client = Arc::new(
        HttpClient::new(&config.base_url, config.api_key.clone(), config.timeout())
            .context("building http client")?,
    );

    match &config.command {
        Command::Check => check(client.as_ref()).await,
        Command::Projects => projects(client.as_ref()).await,
        Command::Scan { project, from, to } => {
            scan(client, &config, *project, from, to).await
        }
        Command::Sweep {
            project,
            from,
            to,
            all,
            key,
            yes,
        } => sweep(client, &config, *project, from, to, *all, key, *yes).await,
    }
}

async fn check(client: &HttpClient) -> Result<()> {
    client.test_connection().await.context("connection test")?;
    println!("connection ok");
    projects(client).await
}

async fn projects(client: &HttpClient) -> Result<()> {
    let projects = client.list_projects().await.context("listing projects")?;
    if projects.is_empty() {
        println!("no accessible projects");
        return Ok(());
    }
    for p in projects {
        println!("{}  {}  {}", p.id, p.project_key, p.name);
    }
    Ok(())
}

async fn scan(
    client: Arc<HttpClient>,
    config: &CliConfig,
    project: u64,
    from: &str,
    to: &str,
) -> Result<()> {
    let mut session = Session::new(client, config.engine_config());
    session
        .search(project, range_arg(from, to), &CancelToken::new())
        .await
        .context("building catalog")?;

    print!("{}", render_catalog(session.catalog()));
    println!("{}", render_stats(&session.stats()));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn sweep(
    client: Arc<HttpClient>,
    config: &CliConfig,
    project: u64,
    from: &str,
    to: &str,
    all: bool,
    keys: &[String],
    yes: bool,
) -> Result<()> {
    if !all && keys.is_empty() {
        bail!("nothing to delete: pass --all or at least one --key");
    }

    let mut session = Session::new(client, config.engine_config());
    session
        .search(project, range_arg(from, to), &CancelToken::new())
        .await
        .context("building catalog")?;

    if all {
        session.toggle_all();
    } else {
        for raw in keys {
            let key = parse_selection_key(raw)?;
            session
                .toggle(key)
                .with_context(|| format!("selecting {raw}"))?;
        }
    }

    let stats = session.stats();
    if stats.selected_count == 0 {
        println!("no attachments matched, nothing to delete");
        return Ok(());
    }
    println!("{}", render_stats(&stats));

    if !yes && !confirm_on_stdin(stats.selected_count)? {
        println!("aborted");
        return Ok(());
    }

    info!("deleting {} attachments", stats.selected_count);
    let outcome = session.sweep(&CancelToken::new()).await?;
    print!("{}", render_report(&outcome.report));

    if let Some(e) = outcome.refresh_error {
        warn!("catalog refresh failed: {e}");
        println!("warning: deletions finished but the catalog refresh failed: {e}");
    } else {
        println!("remaining: {}", render_stats(&session.stats()));
    }

    if outcome.report.failure_count() > 0 {
        bail!("{} deletions failed", outcome.report.failure_count());
    }
    Ok(())
}

fn range_arg<'a>(from: &'a str, to: &'a str) -> Option<(&'a str, &'a str)> {
    if from.trim().is_empty() && to.trim().is_empty() {
        None
    } else {
        Some((from, to))
    }
}

fn confirm_on_stdin(count: usize) -> Result<bool> {
    print!("delete {count} attachments? this cannot be undone [y/N] ");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading confirmation")?;
    Ok(is_confirmation(&line))
}
