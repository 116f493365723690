// SPDX-License-Identifier: MIT OR Apache-2.0
//! shadenet binary entry point.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("shadenet_cli=info".parse().unwrap())
        .add_directive("shadenet_gen=info".parse().unwrap())
        .add_directive("shadenet_graph=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
