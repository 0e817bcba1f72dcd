//! Chirper CLI - terminal front-end for the Chirper feed.
//!
//! Shows the feed, publishes and edits chirps, and follows authors through
//! the `chirper-core` library.

mod commands;
mod render;

use anyhow::Result;
use chirper_core::ClientSettings;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "chirper")]
#[command(about = "Read and write Chirper from the terminal")]
struct Args {
    /// API base URL
    #[arg(
        long,
        global = true,
        env = "CHIRPER_API_URL",
        default_value = "http://localhost:8000/api"
    )]
    base_url: String,

    /// Bearer token for the API
    #[arg(long, global = true, env = "CHIRPER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CHIRPER_TIMEOUT_SECS", default_value = "15")]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Show the feed
    Feed {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Publish a chirp
    Post { message: String },
    /// Change the text of one of your chirps
    Edit { id: u64, message: String },
    /// Delete one of your chirps
    Delete { id: u64 },
    /// Follow an author
    Follow { user_id: u64 },
    /// Stop following an author
    Unfollow { user_id: u64 },
    /// List the ids of authors you follow
    Followings,
    /// Show the feed and keep it fresh until Ctrl-C
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "900", value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so `--json` output stays clean. RUST_LOG wins over --debug.
    let default_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!("Using API at {}", args.base_url);

    let settings = ClientSettings::new(&args.base_url)?
        .with_token(args.token)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let ctx = commands::Context::connect(&settings, args.json)?;
    commands::run(&ctx, args.command).await
}
