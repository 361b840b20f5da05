use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use release_runner::{config, pipeline};

#[derive(clap::Parser)]
#[command(
    name = "release-runner",
    about = "Bump the project version, run the publish step and archive the build output"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase logging verbosity")]
    verbose: u8,

    #[arg(long, help = "Validate the configuration and exit")]
    check: bool,

    #[arg(short = 'V', long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("release-runner {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(args.verbose);

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let mut settings = match config.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // The pipeline entry point does not validate on its own
    if let Err(e) = settings.validate() {
        eprintln!("Invalid settings: {}", e);
        std::process::exit(1);
    }

    if args.check {
        println!("Configuration OK.");
        return Ok(());
    }

    let success = pipeline::create_release(&mut settings);
    if !success {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}
