//! Extract statistics from a simulator log
use anyhow::bail;
use clap::Parser;
use esesc_harness::{Stats, prepare_dump_paths, print_report, read_log};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Simulator log, optionally zstd compressed
    log: PathBuf,

    /// Directory to dump counters into as json and npz
    output_dir: Option<PathBuf>,

    /// Do not print the report
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    if !args.log.is_file() {
        bail!("cannot find {}", args.log.display());
    }
    // validate the destination before spending time on the log
    let dumps = match &args.output_dir {
        Some(output_dir) => Some(prepare_dump_paths(&args.log, output_dir)?),
        None => None,
    };

    let text = read_log(&args.log)?;
    let stats = Stats::extract(&text)?;
    info!(
        "Extracted {} cores from {}",
        stats.cores(),
        args.log.display()
    );
    stats.check()?;

    if !args.quiet {
        print_report(&stats)?;
    }

    if let Some((json, npz)) = dumps {
        let counters = stats.to_counters();
        counters.save(&json, &npz)?;
        info!(
            "Saved {} counters to {} and {}",
            counters.len(),
            json.display(),
            npz.display()
        );
    }
    Ok(())
}
