//! pagesim - replay a request stream through LRU and Belady caches
//!
//! Input: `capacity count key...` as whitespace-separated integers, from a
//! file or stdin. Output: one `<engine> hits: h/n` line per engine.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use pagesim::policy::optimal::Lookahead;
use pagesim::simulate::{SimulationMode, SimulationOptions, simulate};
use pagesim::workload::Workload;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workload file; reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// How the optimal cache looks up next uses
    #[arg(short, long, value_enum, default_value_t = LookaheadArg::Indexed)]
    lookahead: LookaheadArg,

    /// Run the two engines on separate threads
    #[arg(short, long)]
    parallel: bool,

    /// Print time spent in each engine
    #[arg(short, long)]
    timing: bool,

    /// Override the capacity declared in the workload
    #[arg(short, long)]
    capacity: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LookaheadArg {
    Scan,
    Indexed,
}

impl From<LookaheadArg> for Lookahead {
    fn from(arg: LookaheadArg) -> Self {
        match arg {
            LookaheadArg::Scan => Lookahead::Scan,
            LookaheadArg::Indexed => Lookahead::Indexed,
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let mut text = String::new();
    match path {
        Some(path) if path.as_os_str() != "-" => {
            text = std::fs::read_to_string(path)
                .with_context(|| format!("reading workload from {}", path.display()))?;
        }
        _ => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading workload from stdin")?;
        }
    }
    Ok(text)
}

fn main() -> Result<()> {
    // stdout carries the report; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let text = read_input(args.input.as_ref())?;
    let mut workload = Workload::parse(&text).context("malformed workload")?;
    if let Some(capacity) = args.capacity {
        info!(declared = workload.capacity, capacity, "capacity overridden");
        workload.capacity = capacity;
    }
    if workload.capacity == 0 {
        bail!("cache capacity must be at least 1");
    }

    let options = SimulationOptions {
        lookahead: args.lookahead.into(),
        mode: if args.parallel {
            SimulationMode::Parallel
        } else {
            SimulationMode::Lockstep
        },
    };
    let report = simulate(&workload, &options).context("simulation failed")?;

    println!();
    println!("{}", report.render());
    if args.timing {
        println!("{}", report.render_timing());
    }
    Ok(())
}
