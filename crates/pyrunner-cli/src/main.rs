//! pyrunner CLI
//!
//! A command-line tool and HTTP server for running untrusted Python snippets.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pyrunner::{Config, EXAMPLE_CONFIG, ExecutionRequest, Inputs, Runner, TrackingAllocator};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

mod server;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator::new();

#[derive(Parser)]
#[command(name = "pyrunner")]
#[command(about = "A tool for running untrusted Python snippets in isolated processes")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: pyrunner.toml)
        #[arg(short, long, default_value = "pyrunner.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a snippet once per input and print the report as JSON
    Run {
        /// Source file to run
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Inputs, one per line
        #[arg(short, long, conflicts_with = "input_file")]
        inputs: Option<String>,

        /// File with inputs, one per line
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// Time limit per run in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,
    },

    /// Print the time complexity verdict of a snippet
    Analyze {
        /// Source file to analyze
        #[arg(value_name = "FILE")]
        source: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Run {
            source,
            inputs,
            input_file,
            time_limit,
        } => run_snippet(config, &source, inputs, input_file.as_deref(), time_limit).await,
        Commands::Analyze { source } => analyze(&config, &source).await,
        Commands::Serve { bind } => server::serve(Runner::new(config), bind).await,
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_snippet(
    mut config: Config,
    source: &Path,
    inputs: Option<String>,
    input_file: Option<&Path>,
    time_limit: Option<f64>,
) -> Result<()> {
    if let Some(seconds) = time_limit {
        config = config.with_time_limit(seconds);
        config.validate().context("invalid time limit")?;
    }

    let code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    let inputs = match (inputs, input_file) {
        (Some(text), _) => Inputs::Text(text),
        (None, Some(path)) => Inputs::Text(
            tokio::fs::read_to_string(path)
                .await
                .context("failed to read input file")?,
        ),
        (None, None) => Inputs::none(),
    };

    let request = ExecutionRequest::new(Some(code), inputs)?;
    info!(runs = request.inputs().len().max(1), "running snippet");

    let report = Runner::new(config).execute(&request).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    // Exit with appropriate code
    if report.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn analyze(config: &Config, source: &Path) -> Result<()> {
    let code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    let runner = Runner::new(config.clone());
    println!("{}", runner.analyze(&code));
    Ok(())
}

fn show_config(config: &Config) {
    println!("Time limit: {}s", config.time_limit);
    println!("Run command: {}", config.run_command.join(" "));
    println!("Max parallel runs: {}", config.max_parallel_runs);
    match &config.temp_dir {
        Some(dir) => println!("Temp dir: {}", dir.display()),
        None => println!("Temp dir: {}", std::env::temp_dir().display()),
    }
    println!();

    let mut env: Vec<_> = config.env.iter().collect();
    env.sort();
    println!("Environment:");
    for (key, value) in env {
        println!("  {key}={value}");
    }
    println!();

    println!("Forbidden patterns:");
    for pattern in &config.forbidden_patterns {
        println!("  {pattern}");
    }
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
