use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;

use distpack::config::Config;
use distpack::orchestrator::BuildOrchestrator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Build profile to run
    #[arg(short, long)]
    profile: String,

    /// Print the assembled bundle to stdout instead of writing artifacts
    #[arg(long)]
    stdout: bool,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the source root module references resolve against
    #[arg(long)]
    src: Option<PathBuf>,

    /// Override the artifact destination root
    #[arg(long)]
    dist: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "warn",  // Default: warnings and errors only
        1 => "info",  // -v: informational messages
        2 => "debug", // -vv: debug messages
        _ => "trace", // -vvv or more: trace messages
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );
    info!("Starting distpack bundle build");

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    // Apply CLI overrides on top of the loaded configuration
    if let Some(src) = cli.src {
        config.src = src;
    }
    if let Some(dist) = cli.dist {
        config.dist = dist;
    }

    debug!("Configuration: {:?}", config);

    let mut orchestrator = BuildOrchestrator::new(config);

    if cli.stdout {
        // Output the assembled bundle to stdout; nothing is written or minified
        let bundle = orchestrator.assemble_to_string(&cli.profile)?;
        print!("{}", bundle);
        info!("Bundle output to stdout");
    } else {
        let report = orchestrator.build(&cli.profile)?;
        info!(
            "Build of profile '{}' produced {} artifact(s)",
            report.profile,
            report.artifacts.len()
        );
    }

    Ok(())
}
