use std::path::PathBuf;
use std::process::ExitCode;

use bpbind::commands::{self, OutputFormat};
use bpbind::{diagnostics, watch};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bpbind", version, about = "Bind C# breakpoints to namespace, type and method")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log binding decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind breakpoint locations (path:line[:col][-endline[:endcol]])
    Bind {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// One-based source locations
        #[arg(required = true)]
        locations: Vec<String>,
        /// Re-read and re-parse every file for every location
        #[arg(long)]
        no_cache: bool,
    },
    /// List every bindable method scope in files or directories
    Scopes {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Files or directories to list
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Bind locations, then re-bind whenever their files change
    Watch {
        /// One-based source locations
        #[arg(required = true)]
        locations: Vec<String>,
        /// Re-read and re-parse every file on each round
        #[arg(long)]
        no_cache: bool,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "bpbind=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Bind { format, locations, no_cache } => commands::bind(&locations, format, no_cache),
        Commands::Scopes { format, paths } => commands::scopes(&paths, format).map(|()| return ExitCode::SUCCESS),
        Commands::Watch { locations, no_cache } => watch::run(&locations, no_cache),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}
