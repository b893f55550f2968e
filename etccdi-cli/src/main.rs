mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::CliArgs;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let default_filter = if args.verbose {
        "etccdi=debug,etccdi_netcdf=debug"
    } else {
        "etccdi=info,etccdi_netcdf=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run(args)
}
