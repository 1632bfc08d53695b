mod auth;
mod cli;
mod discovery;
mod docker;
mod error;
mod logging;
mod models;
mod output;
mod ranking;
mod refresh;
mod registry;
#[cfg(test)]
mod testutil;

use std::process;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use docker::{ContainerCli, DockerCli};
use logging::Logger;
use models::{RegistryHost, RunTotals};
use refresh::TagRefresher;
use registry::{EcrRegistry, RegistryApi};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new(cli.verbose, cli.log_file.as_deref())?;
    let host = RegistryHost::new(&cli.account_id, &cli.region);
    let registry = EcrRegistry::connect(&cli.region, cli.profile.as_deref(), logger.clone()).await;
    let docker = DockerCli::new(logger.clone());

    let totals = execute(&registry, &docker, &host, &logger, &cli.prefix, cli.dry_run).await?;

    if totals.failed > 0 {
        process::exit(1);
    }

    Ok(())
}

/// The whole run over the two capability traits: authenticate unless
/// dry-run, discover repositories, refresh their recent tags, log the
/// summary. Login and listing failures are logged at CRITICAL and
/// returned; per-tag failures only show up in the totals.
async fn execute(
    registry: &dyn RegistryApi,
    docker: &dyn ContainerCli,
    host: &RegistryHost,
    logger: &Logger,
    prefix: &str,
    dry_run: bool,
) -> Result<RunTotals> {
    // A registry we cannot log into is not worth enumerating. Dry runs
    // never push, so they skip the login and work unauthenticated.
    if !dry_run {
        if let Err(e) = auth::login_to_registry(registry, docker, host, logger).await {
            logger.critical(format!("Docker login failed: {:#}", e));
            return Err(e);
        }
    }

    let repos = match discovery::discover_repositories(registry, prefix, logger).await {
        Ok(repos) => repos,
        Err(e) => {
            logger.critical(format!("Repository listing failed: {:#}", e));
            return Err(e);
        }
    };

    let refresher = TagRefresher {
        registry,
        docker,
        host,
        logger,
        dry_run,
    };
    let totals = refresher.refresh_repositories(&repos).await;

    output::log_summary(logger, &totals, dry_run);

    Ok(totals)
}
