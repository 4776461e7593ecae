//! archetype CLI — take and score behaviour archetype questionnaires.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::SimulationArgs;

#[derive(Parser)]
#[command(
    name = "archetype",
    version,
    about = "D-Type and I-Type behaviour archetype assessments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a questionnaire interactively
    Take {
        /// Instrument .toml file or legacy data directory
        #[arg(long)]
        instrument: Option<PathBuf>,

        /// Monte Carlo trials
        #[arg(long)]
        trials: Option<u32>,

        /// Noise standard deviation, in scale units
        #[arg(long)]
        noise: Option<f64>,

        /// Seed for reproducible stability estimates
        #[arg(long)]
        seed: Option<u64>,

        /// Never log responses, even when logging is enabled
        #[arg(long)]
        no_consent: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score an answer file
    Score {
        /// Instrument .toml file or legacy data directory
        #[arg(long)]
        instrument: Option<PathBuf>,

        /// Answers as JSON or TOML (question id -> 1..5)
        #[arg(long)]
        answers: PathBuf,

        /// Monte Carlo trials
        #[arg(long)]
        trials: Option<u32>,

        /// Noise standard deviation, in scale units
        #[arg(long)]
        noise: Option<f64>,

        /// Seed for reproducible stability estimates
        #[arg(long)]
        seed: Option<u64>,

        /// Output format: text, json, html, markdown, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for report files
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not log this response
        #[arg(long)]
        no_consent: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate instrument files
    Validate {
        /// Instrument file or directory
        #[arg(long)]
        instrument: PathBuf,
    },

    /// Browse the archetype catalog
    Explore {
        /// Instrument file or legacy data directory
        #[arg(long)]
        instrument: PathBuf,

        /// Show one archetype in detail
        #[arg(long)]
        archetype: Option<String>,
    },

    /// Compare two saved assessment reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum dimension change to report, in points on a 0-100 scale
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if the profile shifted
        #[arg(long)]
        fail_on_shift: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter config and the built-in instruments
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("archetype=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            instrument,
            trials,
            noise,
            seed,
            no_consent,
            config,
        } => commands::take::execute(
            instrument,
            SimulationArgs {
                trials,
                noise,
                seed,
            },
            no_consent,
            config,
        ),
        Commands::Score {
            instrument,
            answers,
            trials,
            noise,
            seed,
            format,
            output,
            no_consent,
            config,
        } => commands::score::execute(
            instrument,
            answers,
            SimulationArgs {
                trials,
                noise,
                seed,
            },
            format,
            output,
            no_consent,
            config,
        ),
        Commands::Validate { instrument } => commands::validate::execute(instrument),
        Commands::Explore {
            instrument,
            archetype,
        } => commands::explore::execute(instrument, archetype),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_shift,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_shift, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
