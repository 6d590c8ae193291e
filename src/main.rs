use std::{io, process::ExitCode, time::Duration};

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use rrsim::{IoPolicy, Reporter, Sim, SimConfig};

/// Round-robin scheduler simulation: a dispatcher and a set of autonomous
/// workload units, driven by a periodic tick.
#[derive(Debug, Parser)]
#[clap(version)]
struct Opts {
    /// Time quantum in ticks (positive integer).
    #[clap(value_parser = clap::value_parser!(u32).range(1..))]
    quantum: u32,

    /// Number of workload units.
    #[clap(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    workloads: u64,

    /// Tick period in milliseconds.
    #[clap(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// What an I/O request does to the unit that issued it.
    #[clap(long, value_enum, default_value_t = IoPolicy::Resume)]
    io_policy: IoPolicy,

    /// Run without wall clock or threads, one tick right after another.
    #[clap(long)]
    lockstep: bool,

    /// Enable verbose output on stderr. Specify multiple times to increase
    /// verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_log(verbose: u8) -> Result<()> {
    let llv = match verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Info,
        2 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn run(opts: Opts) -> Result<()> {
    init_log(opts.verbose)?;

    let mut config = SimConfig::new(opts.quantum);
    config.workloads = opts.workloads as usize;
    config.tick_period = Duration::from_millis(opts.tick_ms);
    config.io_policy = opts.io_policy;
    let sim = Sim::new(config)?;

    let mut reporter = Reporter::new(io::stdout().lock());
    if opts.lockstep {
        sim.run_lockstep(&mut reporter)?;
    } else {
        sim.run(&mut reporter)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) => {
            // Usage problems exit 1; --help and --version are not failures.
            let _ = err.print();
            // Value errors don't carry the usage line on their own.
            if err.kind() == ErrorKind::ValueValidation {
                eprintln!("\n{}", Opts::command().render_usage());
            }
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
