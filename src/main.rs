use clap::Parser;
use tracing_subscriber::EnvFilter;

use preset_index::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("preset_index=debug,info")
    } else {
        EnvFilter::new("preset_index=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Match(args) => {
            cli::match_tags::run(args, &cli.index, cli.format, cli.verbose)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, &cli.index, cli.format, cli.verbose)?;
        }
        cli::Commands::Classify(args) => {
            cli::classify::run(args, &cli.index, cli.format, cli.verbose)?;
        }
        cli::Commands::Defaults(args) => {
            cli::defaults::run(args, &cli.index, cli.format, cli.verbose)?;
        }
        cli::Commands::Recents(args) => {
            cli::recents::run(args, &cli.index, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
