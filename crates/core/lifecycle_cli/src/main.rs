#![forbid(unsafe_code)]

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    host_utils::logging::initialise_tracing_subscriber(args.debug);
    cli::run(args)
}
