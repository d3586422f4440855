//! wls - command-line client for the White Label Shopping search API
//!
//! Signs URLs offline or runs signed searches. Credentials come from flags,
//! environment variables or a TOML configuration file, in that order of
//! precedence.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "WLS_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL for the API endpoint
    #[arg(long, global = true, env = "WLS_BASE_URL")]
    base_url: Option<String>,

    /// Public key, sent with every request
    #[arg(long, global = true, env = "WLS_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Private key used to sign requests
    #[arg(long, global = true, env = "WLS_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Hash the URL without its scheme
    #[arg(long, global = true)]
    without_scheme: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the signed form of a URL
    Sign {
        /// URL to sign, including any query parameters
        url: String,

        /// Epoch seconds to sign at (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Run a search and print the response
    Search {
        /// Search parameters as key=value pairs
        #[arg(value_parser = commands::parse_param)]
        params: Vec<(String, String)>,

        /// Print the response body as received instead of pretty JSON
        #[arg(long)]
        raw: bool,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("{} {e:#}", "Error:".bright_red());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = commands::build_config(&args)?;

    match args.command {
        Command::Sign { url, timestamp } => {
            println!("{}", commands::sign(&config, &url, timestamp)?);
        }
        Command::Search {
            params,
            raw,
            timeout,
        } => {
            println!("{}", commands::search(config, params, raw, timeout).await?);
        }
    }

    Ok(())
}
