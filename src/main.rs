//! salesdash main entry point

use anyhow::Context;
use clap::Parser;
use salesdash_api::start_server;
use salesdash_config::Config;
use salesdash_parser::{ParserOptions, ParserRef, PipeCsvParser};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "salesdash")]
#[command(version = "0.1.0")]
#[command(about = "A password-gated dashboard for pipe-delimited sales CSV uploads", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = Config::load_or_default(&args.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::error!(
                "Failed to load configuration from {} [{}]: {}",
                args.config.display(),
                e.code(),
                e
            );
            for suggestion in e.suggestions() {
                log::error!("  - {}", suggestion);
            }
            std::process::exit(1);
        }
    };

    log::info!(
        "Config loaded: bind={}, upload limit={} bytes, delimiter='{}'",
        config.bind_address(),
        config.upload.max_bytes,
        config.upload.delimiter
    );

    // delimiter is validated to be ASCII
    let options = ParserOptions {
        delimiter: config.upload.delimiter as u8,
        date_formats: config.upload.date_formats.clone(),
    };
    let parser: ParserRef = Arc::new(PipeCsvParser::new(options));

    let rt = Runtime::new().context("failed to start the async runtime")?;
    rt.block_on(start_server(config, parser))
        .context("server terminated with an error")?;

    Ok(())
}
