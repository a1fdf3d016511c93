use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "marvin")]
#[command(about = "MARVIN - store, analyze and tidy up source files over HTTP")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.marvin/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Directory for stored files (overrides config)
        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },

    /// Analyze a local file and print the JSON report
    Analyze {
        /// File to analyze
        path: PathBuf,

        /// Language label (defaults to the one detected from the extension)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Optimize a local file and print the result
    Optimize {
        /// File to optimize
        path: PathBuf,

        /// remove_debug, strip_whitespace, collapse_blank_lines or all
        #[arg(short = 't', long = "type", default_value = "all")]
        optimization_type: String,

        /// Write the optimized code back to the file instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            storage_dir,
        }) => {
            let overrides = cli::serve::ServeOverrides {
                host,
                port,
                storage_dir,
            };
            cli::serve::serve_command(config_path.as_deref(), overrides).await?;
        }
        Some(Commands::Analyze { path, language }) => {
            cli::analyze::analyze_command(config_path.as_deref(), &path, language.as_deref())
                .await?;
        }
        Some(Commands::Optimize {
            path,
            optimization_type,
            write,
        }) => {
            cli::analyze::optimize_command(&path, &optimization_type, write).await?;
        }
        Some(Commands::Init { force }) => {
            cli::init::init_command(config_path, force).await?;
        }
        None => {
            // Default: run the server with the configured settings
            cli::serve::serve_command(config_path.as_deref(), Default::default()).await?;
        }
    }

    Ok(())
}
