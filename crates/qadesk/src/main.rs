// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! qadesk - QA bug and retest reports from the terminal.
//!
//! This is the binary entry point.

mod app;
mod commands;
mod logging;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qadesk_config::QadeskConfig;
use qadesk_core::QadeskError;
use qadesk_export::ExportFormat;

use crate::app::RunOptions;

/// qadesk - QA bug and retest reports from the terminal.
#[derive(Parser, Debug)]
#[command(name = "qadesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep drafts and history in memory only.
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Start offline; submissions become drafts until /online.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive report session (default).
    Shell,
    /// Inspect or delete offline drafts.
    Drafts {
        #[command(subcommand)]
        action: DraftsCommand,
    },
    /// Print generated reports.
    History {
        /// Delete the history instead of printing it.
        #[arg(long)]
        clear: bool,
    },
    /// Print a generated report as plain, emphasized or structured text.
    Export {
        /// Output format: plain, emphasized (markdown) or structured (json).
        #[arg(default_value = "plain")]
        format: ExportFormat,
        /// Id of the history entry; defaults to the latest report.
        #[arg(long)]
        message: Option<String>,
    },
    /// Manage qadesk configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DraftsCommand {
    /// List stored drafts.
    List,
    /// Delete a draft without opening it.
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration and print a summary.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => qadesk_config::load_and_validate_path(path),
        None => qadesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            qadesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    logging::init_tracing(&config.app.log_level, secrets(&config));

    let options = RunOptions {
        ephemeral: cli.ephemeral,
        offline: cli.offline,
    };
    if let Err(e) = run(cli.command.unwrap_or(Commands::Shell), config, options).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: QadeskConfig,
    options: RunOptions,
) -> Result<(), QadeskError> {
    match command {
        Commands::Shell => shell::run_shell(config, options).await,
        Commands::Drafts { action } => {
            let mut store = app::open_drafts(&config, options).await?;
            match action {
                DraftsCommand::List => {
                    commands::list_drafts(&store);
                    Ok(())
                }
                DraftsCommand::Remove { id } => commands::remove_draft(&mut store, &id).await,
            }
        }
        Commands::History { clear } => {
            let mut store = app::open_drafts(&config, options).await?;
            commands::history(&mut store, clear).await
        }
        Commands::Export { format, message } => {
            let store = app::open_drafts(&config, options).await?;
            commands::export(&store, format, message.as_deref())
        }
        Commands::Config {
            action: ConfigCommand::Check,
        } => {
            commands::config_check(&config);
            Ok(())
        }
    }
}

/// Values masked in log output: the configured key and the env fallbacks.
fn secrets(config: &QadeskConfig) -> Vec<String> {
    config
        .generator
        .api_key
        .iter()
        .cloned()
        .chain(
            qadesk_gemini::API_KEY_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok()),
        )
        .filter(|s| !s.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["qadesk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["qadesk", "shell", "--offline", "--ephemeral"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Shell)));
        assert!(cli.offline);
        assert!(cli.ephemeral);
    }

    #[test]
    fn export_parses_format_aliases() {
        let cli = Cli::try_parse_from(["qadesk", "export", "json", "--message", "m-1"]).unwrap();
        match cli.command {
            Some(Commands::Export { format, message }) => {
                assert_eq!(format, ExportFormat::Structured);
                assert_eq!(message.as_deref(), Some("m-1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["qadesk", "export"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Export {
                format: ExportFormat::Plain,
                ..
            })
        ));
        assert!(Cli::try_parse_from(["qadesk", "export", "pdf"]).is_err());
    }

    #[test]
    fn drafts_remove_requires_id() {
        assert!(Cli::try_parse_from(["qadesk", "drafts", "remove"]).is_err());
        let cli = Cli::try_parse_from(["qadesk", "drafts", "remove", "1700000000000"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Drafts {
                action: DraftsCommand::Remove { .. }
            })
        ));
    }

    #[test]
    fn config_file_flag() {
        let cli = Cli::try_parse_from(["qadesk", "--config", "/tmp/q.toml", "config", "check"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/q.toml")));
    }

    #[test]
    fn secrets_include_configured_key() {
        let mut config = QadeskConfig::default();
        config.generator.api_key = Some("AIza-configured".to_string());
        assert!(secrets(&config).contains(&"AIza-configured".to_string()));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = qadesk_config::load_config_from_str("").expect("default config should be valid");
        assert_eq!(config.app.log_level, "warn");
    }
}
