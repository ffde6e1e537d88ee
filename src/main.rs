mod app_dirs;
mod cli;
mod settings;
mod workflow;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use cli::{OutputFormat, parse_cli, print_event};
use tracing_subscriber::EnvFilter;
use workflow::SuggestWorkflow;

const DEFAULT_LOG_DIRECTIVE: &str = "predictive_search=warn,suggest=warn";

fn main() -> Result<()> {
    init_tracing();

    let cli = parse_cli();
    let resolved = settings::load(&cli)?;

    if cli.print_config {
        resolved.print_summary();
        if cli.queries.is_empty() {
            return Ok(());
        }
    }

    let mut workflow = SuggestWorkflow::from_config(resolved, cli.type_ahead)?;

    if cli.queries.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read query from stdin")?;
            run_query(&mut workflow, cli.output, &line)?;
        }
    } else {
        for query in &cli.queries {
            run_query(&mut workflow, cli.output, query)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout only carries events.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_query(workflow: &mut SuggestWorkflow, format: OutputFormat, query: &str) -> Result<()> {
    for event in workflow.run(query) {
        print_event(format, &event)?;
    }
    if let Some(seconds) = workflow.retry_after() {
        tracing::warn!(retry_after = seconds, "endpoint asked to slow down");
    }
    Ok(())
}
