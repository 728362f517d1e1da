// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Montandon - maps prospecting and WhatsApp campaign server.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Montandon - maps prospecting and WhatsApp campaign server.
#[derive(Parser, Debug)]
#[command(name = "montandon", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API and campaign dispatcher (default).
    Serve,
    /// Print the normalized form of a phone number.
    Normalize {
        /// Phone number in any format, e.g. "(11) 99999-0001".
        phone: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match montandon_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            montandon_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Normalize { phone } => {
            let normalized =
                montandon_core::normalize_phone(&phone, &config.phone.default_country_code);
            if normalized.is_empty() {
                eprintln!("error: `{phone}` contains no digits");
                std::process::exit(1);
            }
            println!("{normalized}");
        }
    }
}
