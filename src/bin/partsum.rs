//! Command-line driver for the fork-join reductions
//!
//! ```bash
//! # 12 workers, even ids yield every million samples
//! partsum pi --samples 120000000 --threads 12 --mode mixed
//!
//! # Basel series with a sequential cross-check
//! partsum basel --terms 1000000000 --threads 10
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use partsum::{BaselSeries, Job, JobConfig, Kernel, Mode, MonteCarloPi, Result, UnitTerms};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "partsum", version, about = "Fork-join numeric reductions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate π by sampling points in the unit square
    Pi(PiArgs),

    /// Sum the Basel series Σ 1/n²
    Basel(BaselArgs),
}

#[derive(Args, Debug)]
struct PiArgs {
    /// Total number of samples, split across threads
    #[arg(long, default_value_t = 120_000_000)]
    samples: u64,

    /// Number of worker threads
    #[arg(long, default_value_t = 12)]
    threads: u32,

    /// Scheduling behaviour of the workers
    #[arg(long, value_enum, default_value_t = ModeArg::Mixed)]
    mode: ModeArg,

    /// Cooperative workers yield every this many samples (0 = never)
    #[arg(long, default_value_t = 1_000_000)]
    yield_every: u64,

    /// Base seed of the per-worker generators, defaults to the current time
    #[arg(long)]
    seed: Option<u64>,

    /// Also run a single-threaded estimate over all samples
    #[arg(long)]
    cross_check: bool,
}

#[derive(Args, Debug)]
struct BaselArgs {
    /// Number of series terms
    #[arg(long, default_value_t = 100_000_000)]
    terms: u64,

    /// Number of worker threads
    #[arg(long, default_value_t = 10)]
    threads: u32,

    /// Sum unit terms instead, the result must equal the number of terms
    #[arg(long)]
    check_terms: bool,

    /// Skip the sequential reference computation
    #[arg(long)]
    no_cross_check: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Competitive,
    Cooperative,
    Mixed,
}
//
impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Competitive => Mode::Competitive,
            ModeArg::Cooperative => Mode::Cooperative,
            ModeArg::Mixed => Mode::Mixed,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Pi(args) => {
            let seed = args.seed.unwrap_or_else(clock_seed);
            let config = JobConfig::new(args.samples, args.threads)?
                .with_mode(args.mode.into())
                .with_yield_every(args.yield_every)
                .with_seed(seed);
            execute(config, MonteCarloPi, args.cross_check)
        }
        Command::Basel(args) => {
            let config = JobConfig::new(args.terms, args.threads)?;
            if args.check_terms {
                execute(config, UnitTerms, !args.no_cross_check)
            } else {
                execute(config, BaselSeries, !args.no_cross_check)
            }
        }
    }
}

fn execute(config: JobConfig, kernel: impl Kernel, cross_check: bool) -> Result<()> {
    let mut outcome = Job::new(config, kernel).run(cross_check)?;
    print!("{}", outcome.report());
    Ok(())
}

/// Seed derived from the wall clock, logged so that a run can be replayed
fn clock_seed() -> u64 {
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(JobConfig::DEFAULT_SEED, |d| d.as_secs());
    tracing::info!(seed, "no seed given, using the clock");
    seed
}
