//! eduverse-grade CLI: grade learner submissions from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "eduverse-grade",
    version,
    about = "Grade learner code submissions against scenario harnesses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one submission and print the verdict as JSON
    Grade {
        /// Scenario week
        #[arg(long)]
        week: u32,

        /// Cycle index within the week (0-based)
        #[arg(long)]
        cycle: usize,

        /// Learner id (as listed in the profile file)
        #[arg(long)]
        learner: String,

        /// File holding the submitted source
        #[arg(long)]
        source: PathBuf,

        /// Override the per-run time limit in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Append a submission-log record to this JSON-lines file
        #[arg(long)]
        log: Option<PathBuf>,

        #[command(flatten)]
        data: commands::DataArgs,
    },

    /// Grade a JSON array of submissions concurrently
    Batch {
        /// JSON file holding an array of submission payloads
        #[arg(long)]
        submissions: PathBuf,

        /// Max concurrent gradings (defaults to the configured value)
        #[arg(long)]
        parallelism: Option<usize>,

        #[command(flatten)]
        data: commands::DataArgs,
    },

    /// Print the learner-facing view of a week or a single cycle
    Show {
        /// Scenario week
        #[arg(long)]
        week: u32,

        /// Only this cycle
        #[arg(long)]
        cycle: Option<usize>,

        /// Learner level: beginner or advanced
        #[arg(long, default_value = "beginner")]
        level: String,

        /// Scenario file or directory
        #[arg(long)]
        scenarios: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate scenario files
    Validate {
        /// Scenario file or directory
        #[arg(long)]
        scenarios: PathBuf,
    },

    /// Create starter config, scenario and profile files
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eduverse=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            week,
            cycle,
            learner,
            source,
            timeout,
            log,
            data,
        } => commands::grade::execute(week, cycle, learner, source, timeout, log, data).await,
        Commands::Batch {
            submissions,
            parallelism,
            data,
        } => commands::batch::execute(submissions, parallelism, data).await,
        Commands::Show {
            week,
            cycle,
            level,
            scenarios,
            config,
        } => commands::show::execute(week, cycle, level, scenarios, config),
        Commands::Validate { scenarios } => commands::validate::execute(scenarios),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
