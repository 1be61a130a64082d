use clap::{Args, Parser, Subcommand};
use config::Config;
use std::error::Error;
use std::path::{Path, PathBuf};

mod config;
mod observability;

#[derive(Parser)]
#[command(version, about = "Redirects requests by path")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve redirects
    Run(ConfigArgs),
    /// Check the configuration and decode every file-backed source
    Validate(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, default_value = "shortener.yaml")]
    config_file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match &cli.command {
        CliCommand::Run(args) => run(&args.config_file),
        CliCommand::Validate(args) => validate(&args.config_file),
    }
}

fn run(config_file: &Path) -> Result<(), Box<dyn Error>> {
    let config = Config::from_file(config_file)?;

    // Held until exit so pending sentry events are flushed
    let _sentry = observability::init_logging(config.common.logging.as_ref())?;
    observability::init_metrics(config.common.metrics.as_ref())?;

    tracing::info!(config_file = %config_file.display(), "Starting urlshort");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(urlshort::run(config.urlshort))?;

    Ok(())
}

fn validate(config_file: &Path) -> Result<(), Box<dyn Error>> {
    let config = Config::from_file(config_file)?;
    config.urlshort.validate()?;

    for source in &config.urlshort.sources {
        match source.file() {
            Some((path, format)) => {
                let redirects = urlshort::sources::load_file(path, format)?;
                println!(
                    "{}: {} redirects in {}",
                    source.kind(),
                    redirects.len(),
                    path.display()
                );
            }
            None => println!("{}: ok", source.kind()),
        }
    }

    println!("Configuration is valid");
    Ok(())
}
