mod cli;
mod commands;
mod config;
mod file_io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode {
            input,
            output,
            boundary,
            pretty,
        } => {
            commands::convert::decode(&input, output.as_deref(), &boundary, pretty)?;
        }

        Commands::Encode { input, output } => {
            commands::convert::encode(input.as_deref(), output.as_deref())?;
        }

        Commands::Verify { input, boundary } => {
            commands::convert::verify(&input, &boundary)?;
        }

        Commands::Info { input, boundary } => {
            commands::convert::info(&input, &boundary)?;
        }

        Commands::Configure {
            property_count,
            pretty,
            show,
        } => {
            commands::configure::handle(property_count, pretty, show)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for piped JSON and container bytes
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gvas=debug" } else { "gvas=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
