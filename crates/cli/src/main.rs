//! dayfetch entry point.
//!
//! Resolves today's dataset file (or the nearest earlier one) and prints a
//! summary. Logging goes to stderr so stdout only carries progress and the
//! summary.

use std::process::ExitCode;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use dayfetch_client::{FetchClient, FetchConfig, check_root};
use dayfetch_core::{FsStore, Resolver};
use tracing_subscriber::EnvFilter;

mod args;
mod report;

use args::Args;
use report::ConsoleReporter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    check_root(&config.url_root)?;

    let client = FetchClient::new(FetchConfig::from(&config))?;
    tracing::debug!(timeout = ?client.config().timeout, retry_limit = config.retry_limit, "starting run");

    let resolver = Resolver::new(&config, client, FsStore).with_reporter(ConsoleReporter);
    let today = Local::now().date_naive();

    match resolver.resolve(today).await {
        Ok(outcome) => {
            report::print_summary(&report::summary(&outcome));
            Ok(ExitCode::from(report::exit_code(&outcome, config.exhausted_exit_code)))
        }
        Err(err) => {
            report::print_summary(&report::error_summary(&err));
            match report::error_exit_code(&err) {
                Some(code) => {
                    eprintln!("Error: {err}");
                    Ok(ExitCode::from(code))
                }
                None => Err(err.into()),
            }
        }
    }
}
