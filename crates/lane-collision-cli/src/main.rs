use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use lane_collision::selftest::DEFAULT_SEED;

mod commands;

/// Top-level CLI argument parser for the `lanes` command
#[derive(Parser)]
#[command(
    name = "lanes",
    about = "lane-collision — duplicate detection across a lockstep lane group",
    version
)]
struct Cli {
    /// Log dispatch and launch details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Group, backend and output options shared by the lane subcommands
#[derive(Args, Debug, Clone)]
struct LaunchArgs {
    /// Lanes in the group: a power of two up to 64
    #[arg(long, default_value_t = lane_collision::WARP_SIZE)]
    group_size: usize,
    /// Execution backend: scalar or threaded
    #[arg(long, default_value = "threaded")]
    backend: String,
    /// Output format: text (default) or json
    #[arg(long, default_value = "text")]
    format: String,
}

/// Available subcommands for the `lanes` CLI
#[derive(Subcommand)]
enum Commands {
    /// Report whether any two lanes hold equal values
    Check {
        /// One value per lane
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// Build the collision mask of the lanes
    Mask {
        /// One value per lane
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// Order the lanes with the bitonic network
    Sort {
        /// One value per lane
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        /// Sort largest first
        #[arg(long)]
        descending: bool,
        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// Run sort, check and mask from a YAML launch config
    Run {
        /// Path to the launch config YAML file
        config: PathBuf,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the seeded self-test of every kernel
    Selftest {
        /// Random seed for the generated lane values
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// Emit PTX source for a 32-lane warp kernel
    Ptx {
        /// Kernel to emit: sort, collision (default), or mask
        #[arg(long, default_value = "collision")]
        kernel: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Check { values, launch } => {
            let target = commands::LaunchTarget::parse(launch.group_size, &launch.backend, &launch.format)?;
            commands::check::run(&values, &target)
        }
        Commands::Mask { values, launch } => {
            let target = commands::LaunchTarget::parse(launch.group_size, &launch.backend, &launch.format)?;
            commands::mask::run(&values, &target)
        }
        Commands::Sort {
            values,
            descending,
            launch,
        } => {
            let target = commands::LaunchTarget::parse(launch.group_size, &launch.backend, &launch.format)?;
            commands::sort::run(&values, descending, &target)
        }
        Commands::Run { config, format } => {
            match commands::OutputFormat::from_str(&format) {
                Ok(fmt) => commands::run::run(&config, fmt),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Selftest { seed, launch } => {
            let target = commands::LaunchTarget::parse(launch.group_size, &launch.backend, &launch.format)?;
            commands::selftest::run(seed, &target)
        }
        Commands::Ptx { kernel, output } => match commands::ptx::PtxKernel::from_str(&kernel) {
            Ok(k) => commands::ptx::run(k, output.as_deref()),
            Err(e) => Err(e.into()),
        },
    }
}

/// Install a stderr subscriber when `verbose` is set.
///
/// The library logs through the `log` facade; the subscriber's log bridge
/// forwards those records. Returns whether a subscriber was installed.
fn init_logging(verbose: bool) -> bool {
    if !verbose {
        return false;
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
