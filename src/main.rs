use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tate::config::{ConfigOverrides, TateConfig};
use tate::shell::Shell;
use tate::{Catalog, Executor};
use tracing_subscriber::EnvFilter;

/// Tate interactive shell
#[derive(Parser, Debug)]
#[command(name = "tate")]
#[command(about = "A minimal columnar database", long_about = None)]
struct Args {
    /// Data directory (default: ~/.tate)
    #[arg(short = 'd', long = "data")]
    data_dir: Option<PathBuf>,

    /// Config file (default: ./tate.toml if present)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let overrides = ConfigOverrides {
        config_file: args.config,
        data_dir: args.data_dir,
        log_level: args.log_level,
    };

    let config = match TateConfig::load(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // logs go to stderr so they never interleave with query output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = match Catalog::open(&config.data_dir) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!("Error initializing catalog: {e}");
            return ExitCode::FAILURE;
        }
    };
    let executor = Executor::new(catalog, &config.data_dir);

    let shell = Shell::new(executor, config.data_dir, config.history_file);
    if let Err(e) = shell.run() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
