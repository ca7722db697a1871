//! dockerup - main entry point.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dockerup::{
    Config, Workflow, WorkflowError,
    cli::{Cli, run_check_command},
    container::{DockerRuntime, connect_hint},
    db::MySqlSession,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::load_from(None, std::env::args_os()).unwrap_or_else(|e| e.exit());
    init_tracing(cli.log_json);

    let result = if cli.should_run_workflow() {
        run_workflow(&cli).await
    } else {
        run_check_command().await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dockerup=info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn run_workflow(cli: &Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("invalid configuration")?;
    config
        .apply(&cli.overrides())
        .context("invalid command-line override")?;

    let runtime = match DockerRuntime::connect().await {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::warn!("{}", connect_hint(&e));
            return Err(WorkflowError::Setup(e).into());
        }
    };
    let database = MySqlSession::open(&config.database);

    // First Ctrl-C cancels the run, a second one exits immediately.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling...");
            signal_token.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let report = Workflow::new(Arc::new(runtime), Arc::new(database), config)
        .with_cancellation(cancel)
        .run()
        .await?;

    tracing::info!("ALL DONE!!!");
    println!("{}", report.stored_id);
    Ok(())
}
