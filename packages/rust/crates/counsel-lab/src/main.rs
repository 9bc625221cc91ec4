//! counsel-lab CLI: gateway, console, or export mode.
//!
//! Settings from `packages/conf/counsel-lab.yaml` merged with the user file
//! under the config home (override with `--conf <dir>`).
//!
//! Logging: set `RUST_LOG=counsel_lab=info` (or `warn`, `debug`) to see lab logs on stderr.

mod cli;
mod lab_builder;
mod nodes;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use counsel_lab::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::lab_builder::{LabOverrides, build_lab_config};
use crate::nodes::{run_console_mode, run_export_mode, run_gateway_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "counsel_lab=debug"
        } else {
            "counsel_lab=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime_settings = load_runtime_settings();
    let config = build_lab_config(
        LabOverrides {
            model: cli.model,
            prompt_file: cli.prompt_file,
            log_path: cli.log_path,
        },
        &runtime_settings,
    )?;

    match cli.command {
        Command::Gateway { bind, turn_timeout } => {
            run_gateway_mode(bind, turn_timeout, config).await
        }
        Command::Console { name } => run_console_mode(name, config).await,
        Command::Export { output } => run_export_mode(output, &config),
    }
}
