//! Skyward CLI: flight simulation, benchmarking, and inspection.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "skyward")]
#[command(version, about = "Skyward: multi-stage model rocket flight simulator")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a rocket flight.
    Simulate {
        /// Preset name (alpha, beta, gamma, delta) or path to a rocket TOML file.
        #[arg(short, long, default_value = "alpha")]
        rocket: String,

        /// Path to simulation options (TOML). Defaults are used when omitted.
        #[arg(short, long)]
        options: Option<String>,

        /// Write a binary snapshot of the results.
        #[arg(long)]
        snapshot: Option<String>,

        /// Write the flight data of every branch as CSV.
        #[arg(long)]
        csv: Option<String>,

        /// Log every flight event through the telemetry bus.
        #[arg(long)]
        telemetry: bool,
    },

    /// Run benchmark scenarios.
    Benchmark {
        /// Which scenario to run (single_stage, two_stage, three_stage, windy, strap_on, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Number of random seeds per scenario.
        #[arg(long, default_value_t = 1)]
        seeds: u64,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect a results snapshot.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },

    /// Validate a rocket or simulation options file.
    Validate {
        /// Path to a TOML file.
        path: String,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Simulate {
            rocket,
            options,
            snapshot,
            csv,
            telemetry,
        } => commands::simulate(&rocket, options.as_deref(), snapshot.as_deref(), csv.as_deref(), telemetry),
        Commands::Benchmark { scenario, seeds, output } => commands::benchmark(&scenario, seeds, output.as_deref()),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
