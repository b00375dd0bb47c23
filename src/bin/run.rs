//! Run benchmarks on the simulator
use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use cli_table::{Cell, Table, print_stdout};
use esesc_harness::{
    BenchmarkTable, MemoryModel, RunRequest, Runner, RunnerConfig, SIZES, Suite, Workload,
    get_tqdm_style,
};
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Runner config in JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Benchmark root directory, overrides the config
    #[arg(long)]
    bench_root: Option<PathBuf>,

    /// Directory the simulator runs in, overrides the config
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Path to simulator, overrides the config
    #[arg(long)]
    simulator: Option<PathBuf>,

    /// Remove staged inputs and executable after each run
    #[arg(long)]
    cleanup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SizedArgs {
    /// Benchmark names
    #[arg(short, long, required = true)]
    name: Vec<String>,

    /// Input size
    #[arg(short, long)]
    size: String,

    /// Number of simulated cores
    #[arg(short, long)]
    cores: u32,

    /// Thread count, derived from the core count by default
    #[arg(short, long)]
    threads: Option<u32>,

    /// Memory model
    #[arg(short, long, value_enum, default_value_t = MemoryModel::Tso)]
    model: MemoryModel,

    /// Store prefetch setting
    #[arg(short, long, default_value = "0")]
    prefetch: String,

    /// Benchmark table in JSON replacing the built-in one
    #[arg(long)]
    table: Option<PathBuf>,

    /// Appended to the report name
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Args)]
struct MicroArgs {
    /// Benchmark names
    #[arg(short, long, required = true)]
    name: Vec<String>,

    /// Iteration count
    #[arg(short, long)]
    iterations: u64,

    /// Memory model
    #[arg(short, long, value_enum, default_value_t = MemoryModel::Tso)]
    model: MemoryModel,

    /// Store prefetch setting
    #[arg(short, long, default_value = "0")]
    prefetch: String,

    /// Verify loads at retirement
    #[arg(short, long)]
    verify_ld: bool,

    /// Appended to the report name
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// PARSEC 2.1 and SPLASH2 through the launcher
    Launcher(SizedArgs),
    /// PARSEC 3.0
    Parsec3(SizedArgs),
    /// SPLASH-2x
    #[clap(name = "splash2x")]
    Splash2x(SizedArgs),
    /// Single core micro benchmarks
    Micro(MicroArgs),
    /// List built-in benchmarks
    List {
        /// Only this suite
        suite: Option<Suite>,
    },
}

impl SizedArgs {
    fn requests(&self, suite: Suite) -> Vec<RunRequest> {
        self.name
            .iter()
            .map(|name| RunRequest {
                suite,
                name: name.clone(),
                workload: Workload::Size(self.size.clone()),
                cores: self.cores,
                threads: self.threads,
                model: self.model,
                prefetch: self.prefetch.clone(),
                verify_ld: false,
                comment: self.comment.clone(),
            })
            .collect()
    }
}

impl MicroArgs {
    fn requests(&self) -> Vec<RunRequest> {
        self.name
            .iter()
            .map(|name| RunRequest {
                model: self.model,
                prefetch: self.prefetch.clone(),
                verify_ld: self.verify_ld,
                comment: self.comment.clone(),
                ..RunRequest::micro(name, self.iterations)
            })
            .collect()
    }
}

fn list(suite: Option<Suite>) -> anyhow::Result<()> {
    let suites = match suite {
        Some(suite) => vec![suite],
        None => vec![Suite::Launcher, Suite::Parsec3, Suite::Splash2x],
    };
    let mut table = vec![];
    for suite in suites {
        for bench in BenchmarkTable::builtin(suite).benchmarks {
            let sizes: Vec<&str> = SIZES
                .iter()
                .copied()
                .filter(|size| bench.args.contains_key(*size))
                .collect();
            table.push(vec![
                suite.cell(),
                bench.name.cell(),
                format!("{:?}", bench.threads).cell(),
                sizes.join(", ").cell(),
            ]);
        }
    }
    let table = table.table().title(vec![
        "Suite".cell(),
        "Benchmark".cell(),
        "Threads".cell(),
        "Sizes".cell(),
    ]);
    print_stdout(table)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_json(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(bench_root) = &args.bench_root {
        config.bench_root = bench_root.clone();
    }
    if let Some(work_dir) = &args.work_dir {
        config.work_dir = work_dir.clone();
    }
    if let Some(simulator) = &args.simulator {
        config.simulator = simulator.clone();
    }
    config.cleanup |= args.cleanup;

    let (suite, requests, table_path) = match &args.command {
        Commands::List { suite } => return list(*suite),
        Commands::Launcher(sized) => (
            Suite::Launcher,
            sized.requests(Suite::Launcher),
            sized.table.clone(),
        ),
        Commands::Parsec3(sized) => (
            Suite::Parsec3,
            sized.requests(Suite::Parsec3),
            sized.table.clone(),
        ),
        Commands::Splash2x(sized) => (
            Suite::Splash2x,
            sized.requests(Suite::Splash2x),
            sized.table.clone(),
        ),
        Commands::Micro(micro) => (Suite::Micro, micro.requests(), None),
    };

    let table = match table_path {
        Some(path) => BenchmarkTable::from_json(path)?,
        None => BenchmarkTable::builtin(suite),
    };
    if table.suite != suite {
        bail!("benchmark table is for suite {}, not {}", table.suite, suite);
    }
    let runner = Runner::new(config, table);

    let pbar = indicatif::ProgressBar::new(requests.len() as u64);
    pbar.set_style(get_tqdm_style());
    let mut failed = vec![];
    for request in &requests {
        pbar.set_message(request.name.clone());
        match runner.run(request) {
            Ok(record) => {
                info!(
                    "{} finished with {} threads, {} reports",
                    record.report_file,
                    record.threads,
                    record.artifacts.len()
                );
            }
            Err(err) => {
                error!("Skipping {}: {:#}", request.name, err);
                failed.push(request.name.clone());
            }
        }
        pbar.inc(1);
    }
    pbar.finish();

    if !failed.is_empty() {
        bail!(
            "{} of {} runs failed: {}",
            failed.len(),
            requests.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
