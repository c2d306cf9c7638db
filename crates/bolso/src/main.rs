// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! bolso - WhatsApp intake relay for Meu Bolso.
//!
//! This is the binary entry point.

mod doctor;
mod serve;
mod shutdown;

use std::path::PathBuf;

use bolso_config::BolsoConfig;
use clap::{Parser, Subcommand};

/// bolso - turn WhatsApp messages into Meu Bolso transactions.
#[derive(Parser, Debug)]
#[command(name = "bolso", version, about, long_about = None)]
struct Cli {
    /// Explicit config file (defaults to the standard search path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Check configuration, storage, WAHA and Gemini.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> BolsoConfig {
    let result = match path {
        Some(path) => bolso_config::load_and_validate_path(path),
        None => bolso_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            bolso_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
