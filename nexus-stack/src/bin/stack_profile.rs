//! Validates and profiles every stack container.
//!
//! ```text
//! stack-profile --repeats 8 --size 1000 --threads 4 --validate 100000
//! stack-profile --kind doubly-tail-list --kind array-amortized
//! RUST_LOG=debug stack-profile
//! ```

use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use nexus_stack::profile::{ProfileConfig, ProfileReport, profile_push_pop};
use nexus_stack::workload::{CommandGenerator, WorkloadConfig, run_workload};
use nexus_stack::{
    Amortized, Array, DoublyList, DoublyTailList, Exact, ExactGrow, SinglyList, SinglyTailList,
    Stack,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(version, about)]
struct Options {
    /// Push/pop cycles per container. Each cycle is one pool job.
    #[arg(short, long, default_value_t = 8)]
    repeats: usize,

    /// Values pushed and then popped per cycle.
    #[arg(short, long, default_value_t = 1000)]
    size: usize,

    /// Worker threads; 0 uses every available CPU.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Replay this many random commands against a reference stack before
    /// profiling. 0 skips validation.
    #[arg(long, default_value_t = 0)]
    validate: usize,

    /// Seed for generated commands and values.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Containers to run. Defaults to all of them.
    #[arg(short, long, value_enum)]
    kind: Vec<Kind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    ArrayExact,
    ArrayExactGrow,
    ArrayAmortized,
    SinglyList,
    SinglyTailList,
    DoublyList,
    DoublyTailList,
}

impl Kind {
    fn run(self, options: &Options) -> Result<Option<ProfileReport>, Box<dyn Error>> {
        match self {
            Kind::ArrayExact => run::<Array<i32, Exact>>(options),
            Kind::ArrayExactGrow => run::<Array<i32, ExactGrow>>(options),
            Kind::ArrayAmortized => run::<Array<i32, Amortized>>(options),
            Kind::SinglyList => run::<SinglyList<i32>>(options),
            Kind::SinglyTailList => run::<SinglyTailList<i32>>(options),
            Kind::DoublyList => run::<DoublyList<i32>>(options),
            Kind::DoublyTailList => run::<DoublyTailList<i32>>(options),
        }
    }
}

/// Validates `S` (if requested) and profiles it. `None` on validation failure.
fn run<S>(options: &Options) -> Result<Option<ProfileReport>, Box<dyn Error>>
where
    S: Stack<Item = i32> + 'static,
{
    let workload = WorkloadConfig {
        commands: options.validate,
        seed: options.seed,
        ..WorkloadConfig::default()
    };

    if options.validate > 0 {
        match run_workload::<S>(&workload) {
            Ok(summary) => info!(
                container = S::NAME,
                commands = options.validate,
                max_len = summary.max_len,
                "validation passed"
            ),
            Err(err) => {
                error!(container = S::NAME, %err, "validation failed");
                return Ok(None);
            }
        }
    }

    let config = ProfileConfig {
        repeats: options.repeats,
        collection_size: options.size,
        threads: options.threads,
    };
    let mut values = CommandGenerator::new(&workload);
    let report = profile_push_pop::<S, _>(&config, move || values.next_value())?;
    Ok(Some(report))
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();
    let kinds = if options.kind.is_empty() {
        Kind::value_variants().to_vec()
    } else {
        options.kind.clone()
    };

    let mut failed = false;
    for kind in kinds {
        match kind.run(&options)? {
            Some(report) => {
                println!("{report}");
                let (push, pop) = (report.push_percentiles(), report.pop_percentiles());
                info!(
                    container = report.name,
                    push_p50_ns = push.p50,
                    push_p99_ns = push.p99,
                    push_max_ns = push.max,
                    pop_p50_ns = pop.p50,
                    pop_p99_ns = pop.p99,
                    pop_max_ns = pop.max,
                    "job latency"
                );
            }
            None => failed = true,
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
