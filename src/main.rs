// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   compare | reorder | prune | status
//! ```

use std::process::ExitCode;

use reflow::cli::global::GlobalOptions;
use reflow::cli::{self, Command};
use reflow::cmd::compare::run_compare_command;
use reflow::cmd::prune::run_prune_command;
use reflow::cmd::reorder::run_reorder_command;
use reflow::cmd::status::run_status_command;
use reflow::config::Config;
use reflow::config::loader::ConfigLoader;
use reflow::logging::{LogConfig, LogLevel, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&cli.global, &config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

/// CLI flags override the `[global]` config section.
fn build_log_config(global: &GlobalOptions, config: &Config) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.log_level);

    let log_file = global
        .log_file
        .clone()
        .or_else(|| config.global.log_file.clone())
        .map(|p| p.display().to_string());

    LogConfig::builder()
        .with_console_level(console_level)
        .maybe_with_log_file(log_file)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let dry_run = cli.global.dry || config.global.dry_run;

    let result = match &cli.command {
        Some(Command::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Compare(args)) => run_compare_command(args, &cli.global, config).await,
        Some(Command::Reorder(args)) => run_reorder_command(args, &cli.global, dry_run).await,
        Some(Command::Prune(args)) => run_prune_command(args, &cli.global, config, dry_run).await,
        Some(Command::Status(args)) => run_status_command(args, &cli.global).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(global: &GlobalOptions) -> reflow::error::Result<Config> {
    let mut loader = ConfigLoader::new().add_toml_file_optional("reflow.toml");
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix("REFLOW").build()
}
