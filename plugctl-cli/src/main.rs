mod commands;
mod opts;

use anyhow::Result;
use opts::Command;
use plugctl::{ChipTool, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = opts::parse_args();

    init_tracing(args.verbose, args.quiet);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(chip_tool) = args.chip_tool {
        config.chip_tool = chip_tool;
    }
    tracing::debug!(?config, "resolved settings");
    let tool = ChipTool::new(&config.chip_tool);

    match args.command {
        Command::Setup(c) => commands::setup::handle(c, &config, &tool).await,
        Command::Payload(c) => commands::payload::handle(c, &tool).await,
        Command::Power(c) => commands::power::handle(c, &config, &tool).await,
        Command::Labels(c) => commands::labels::handle(c, &config),
    }
}

/// `RUST_LOG` wins, otherwise start at `warn` and move one level per `-v`/`-q`
fn init_tracing(verbose: u8, quiet: u8) {
    let level = match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => "off",
        -1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
