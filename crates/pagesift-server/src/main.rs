//! Pagesift server binary
//!
//! Reads `.env`, parses flags and environment variables, and starts the
//! HTTP server.

use clap::Parser;
use pagesift_server::{cli::Cli, start_server, ServerError};
use std::process;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = Cli::parse().into_config()?;
    start_server(config).await
}
