use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, trace};

use tasador::config::RunConfig;
use tasador::pipeline::aggregate::Statistic;

/// Aggregate vehicle appraisal datasets with parallel map/reduce workers
#[derive(Parser)]
#[command(name = "tasador")]
#[command(about = "Partition a vehicle appraisal CSV across workers and aggregate per category", long_about = None)]
struct Cli {
    /// Path to the `;`-delimited input dataset
    #[arg(short, long)]
    input: PathBuf,

    /// Number of data rows to process (not counting the header)
    #[arg(short = 'c', long = "rows")]
    rows: usize,

    /// Number of parallel workers
    #[arg(short, long, default_value = "5")]
    workers: usize,

    /// Directory the metric files are appended under
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Statistic written to the output files
    #[arg(long, value_enum, default_value = "sum")]
    stat: Statistic,

    /// Map-phase timeout in seconds (0 disables)
    #[arg(long, default_value = "300")]
    timeout: u64,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json_report: bool,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("tasador started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfig {
        input: cli.input,
        total_rows: cli.rows,
        workers: cli.workers,
        worker_timeout_secs: (cli.timeout > 0).then_some(cli.timeout),
        statistic: cli.stat,
        output_dir: cli.output_dir,
    };

    let report = tasador::pipeline::run(&config).await?;

    if cli.json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Processed {} record(s) across {} worker(s) in {}ms ({} skipped, {} unrecognized)",
            report.aggregate.total_records(),
            report.workers_spawned,
            report.elapsed_ms,
            report.aggregate.skipped,
            report.aggregate.unrecognized,
        );
    }
    Ok(())
}
