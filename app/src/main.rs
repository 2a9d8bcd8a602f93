//! Command-line front end for the persisted todo list.

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use todolist::cli::{self, Cli, Command};
use todolist::{open_store, Config, TodoState};
use todolist_runtime::{metrics, InitialValue, LoadOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = &args.store {
        config = config.with_store_path(path);
    }
    if let Some(key) = &args.key {
        config = config.with_storage_key(key);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let prometheus = if args.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("installing metrics recorder")?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    let initial = if args.empty_default {
        InitialValue::Value(TodoState::new())
    } else {
        InitialValue::lazy(TodoState::starter)
    };

    tracing::debug!(
        path = %config.storage.path.display(),
        key = %config.storage.key,
        "Opening todo store"
    );
    let store = open_store(config.storage.open(), config.storage.key.clone(), initial)
        .with_context(|| format!("opening {}", config.storage.path.display()))?;

    if let LoadOutcome::Recovered { error } = store.load_outcome().await {
        eprintln!("warning: stored todos were unreadable and have been reset ({error})");
    }

    let command = args.command.unwrap_or(Command::List);
    let outcome = cli::execute(command, &store).await?;
    print!("{}", outcome.output);

    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }

    Ok(())
}
