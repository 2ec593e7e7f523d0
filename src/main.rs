use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lam_chat::config::{Config, Overrides};
use lam_chat::{BackendClient, Mode, commands, logging, tui};

#[derive(Parser)]
#[command(name = "lam-chat")]
#[command(version)]
#[command(about = "Chat with the lam-agent backend", long_about = None)]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Mode to start in (offline, web, hybrid)
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Config file to use instead of ~/.lam-chat/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask { message: String },
    /// Print the backend status line
    Health {
        /// Print the raw health document instead
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Save it to the config file instead of printing it
        #[arg(long)]
        write: bool,
    },
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value
        .parse()
        .map_err(|_| format!("unknown mode '{value}' (expected offline, web or hybrid)"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let overrides = Overrides {
        backend_url: cli.backend_url,
        mode: cli.mode,
    };
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(Some(&config_path), &overrides)?;

    let Some(command) = cli.command else {
        let _guard = logging::init_file_logger(&config.log_dir);
        tui::run(&config).await?;
        return Ok(true);
    };

    logging::init_stderr_logger();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    match command {
        Commands::Ask { message } => {
            let client = BackendClient::from_config(&config).context("Failed to create HTTP client")?;
            commands::ask(&client, &message, config.default_mode, &mut stdout, &mut stderr).await
        }
        Commands::Health { json } => {
            let client = BackendClient::from_config(&config).context("Failed to create HTTP client")?;
            commands::health(&client, json, &mut stdout, &mut stderr).await
        }
        Commands::Config { write: false } => {
            commands::print_config(&config, &mut stdout)?;
            Ok(true)
        }
        Commands::Config { write: true } => {
            commands::write_config(&config, &config_path, &mut stdout)?;
            Ok(true)
        }
    }
}
