//! cdnjs-import CLI entry point.
//!
//! Parses arguments, configures logging from the `-v` flags (or `RUST_LOG`
//! when set), runs the requested imports, and renders failures as
//! user-friendly colored errors.

use anyhow::Result;
use cdnjs_importer::cli::{Cli, Verbosity};
use cdnjs_importer::core::error::user_friendly_error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive().unwrap_or("off")));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
