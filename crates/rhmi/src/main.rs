// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::args::Commands;
use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod args;
mod rules;
mod server;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = args::Args::parse();
    match args.command {
        Commands::Server(args) => server::main(args).await,
        Commands::Rules => rules::print_rules(),
    }
}
