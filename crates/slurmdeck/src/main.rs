// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slurmdeck - plugin host for an HPC job-scheduler dashboard.
//!
//! This is the binary entry point.

mod builtin;
mod plugins;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use slurmdeck_config::{ConfigError, SlurmdeckConfig};

/// Slurmdeck - plugin host for an HPC job-scheduler dashboard.
#[derive(Parser, Debug)]
#[command(name = "slurmdeck", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the plugin manager until SIGINT or SIGTERM.
    Serve,
    /// Enable the configured plugins and print their state.
    Plugins,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and report every problem.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

fn load_config(path: Option<&Path>) -> Result<SlurmdeckConfig, Vec<ConfigError>> {
    match path {
        Some(path) => slurmdeck_config::load_and_validate_path(path),
        None => slurmdeck_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            slurmdeck_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Plugins) => plugins::run_plugins(config).await,
        Some(Commands::Config {
            action: ConfigCommand::Check,
        }) => {
            println!(
                "slurmdeck: configuration OK ({} plugin(s) enabled, health check every {}s, {} restart(s) allowed)",
                config.plugins.enabled.len(),
                config.plugins.health_check_interval_secs,
                config.plugins.max_restarts,
            );
            Ok(())
        }
        Some(Commands::Config {
            action: ConfigCommand::Show,
        }) => match config.to_toml_string() {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => {
                slurmdeck_config::render_errors(&[e]);
                std::process::exit(1);
            }
        },
        None => {
            println!("slurmdeck: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("slurmdeck: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_config_check_with_path() {
        let cli = Cli::try_parse_from(["slurmdeck", "config", "check", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommand::Check
            })
        ));
    }

    #[test]
    fn binary_loads_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slurmdeck.toml");
        std::fs::write(&path, "[plugins]\nenabled = [\"session-clock\"]\n").unwrap();

        let config = load_config(Some(&path)).expect("file should load");
        assert_eq!(config.plugins.enabled, vec!["session-clock"]);
    }
}
