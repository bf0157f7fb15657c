

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use kis_core::Config;

mod commands;
use commands::tasks::TaskCommands;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "kis-cli")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Collect OHLCV price histories from the broker
  Collect(commands::collect::CollectArgs),

  /// Run the descending-trendline strategy family
  Analyze(commands::analyze::AnalyzeArgs),

  /// Run the moving-average strategy family
  AnalyzeMa(commands::analyze::AnalyzeArgs),

  /// Inspect and control running tasks
  Tasks {
    #[command(subcommand)]
    cmd: TaskCommands,
  },

  /// Reconcile stale running tasks left behind by a crash
  Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let config = Config::from_env()?;

  // Execute command
  match cli.command {
    Commands::Collect(args) => commands::collect::execute(args, config).await?,
    Commands::Analyze(args) => commands::analyze::execute(args, config, false).await?,
    Commands::AnalyzeMa(args) => commands::analyze::execute(args, config, true).await?,
    Commands::Tasks { cmd } => commands::tasks::execute(cmd, config).await?,
    Commands::Sweep => commands::tasks::sweep(config).await?,
  }

  Ok(())
}
