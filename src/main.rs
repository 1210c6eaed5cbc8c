#![allow(clippy::doc_markdown)]

mod api;
mod cli;
mod credentials;
mod dashboard;
mod export;
mod fetch;
mod prelude;
mod table;
mod tables;

use std::process::ExitCode;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Fetch(args) => {
            if args.run().await.is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Serve(args) => {
            args.run().await?;
        }
    }

    info!("done!");
    Ok(ExitCode::SUCCESS)
}
