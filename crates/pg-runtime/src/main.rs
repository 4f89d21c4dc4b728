//! provisioning-gate - operator CLI for registration and key-change requests

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pg_03_provisioner::ProvisionerError;
use pg_04_lifecycle::LifecycleError;
use pg_runtime::{execute, Cli, GateConfig, GateContainer, Output};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = GateConfig::from_env();
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let gate = GateContainer::build(config)?;
    let output = execute(&gate, cli.command)?;

    let mut stdout = std::io::stdout().lock();
    match output {
        Output::Json(value) => {
            serde_json::to_writer_pretty(&mut stdout, &value).context("failed to write output")?;
            writeln!(stdout).context("failed to write output")?;
        }
        Output::Raw(bytes) => stdout.write_all(&bytes).context("failed to write output")?,
    }
    Ok(())
}

/// Lifecycle errors print their kind and every message as JSON on stderr.
fn report(err: &anyhow::Error) {
    let body = if let Some(e) = err.downcast_ref::<LifecycleError>() {
        json!({ "error": e.kind().as_str(), "messages": e.messages() })
    } else if let Some(e) = err.downcast_ref::<ProvisionerError>() {
        json!({ "error": "provisioner", "messages": [e.to_string()] })
    } else {
        json!({ "error": "internal", "messages": [format!("{:#}", err)] })
    };
    eprintln!("{}", body);
}
