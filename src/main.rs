/* main.rs */

pub mod aggregator;
pub mod datatype;
pub mod error;
pub mod lookup;
pub mod parser;
pub mod protocol;
pub mod report;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aggregator::Aggregator;
use error::Result;
use lookup::LookupTable;
use parser::ParseStats;

#[derive(Parser, Debug)]
#[command(version, about = "Count flow-log records per lookup tag and per port/protocol", long_about = None)]
struct Args {
    /// Lookup table (dstport,protocol,tag)
    #[arg(default_value = "lookup_table.csv")]
    lookup: PathBuf,
    /// Flow log, one record per line
    #[arg(default_value = "flow_logs.txt")]
    flow_logs: PathBuf,
    /// Where the report is written
    #[arg(default_value = "output.txt")]
    output: PathBuf,
    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// What a successful run went through
#[derive(Debug)]
struct Summary {
    entries:  usize,
    stats:    ParseStats,
    tags:     usize,
    untagged: u64,
}

fn init_tracing(args: &Args) {
    let filter = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (_, 0)    => "warn",
        (_, 1)    => "info",
        (_, 2)    => "debug",
        _         => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Load the table, classify the flow log, write the report.
/// Nothing is written unless every input was read successfully.
fn run(args: &Args) -> Result<Summary> {
    let table = LookupTable::load(&args.lookup)?;

    let mut aggregator = Aggregator::new(&table);
    let stats = parser::process_file(&args.flow_logs, &mut aggregator)?;
    let aggregates = aggregator.finish();

    report::write_report(&args.output, &aggregates)?;

    Ok(Summary {
        entries:  table.len(),
        stats,
        tags:     aggregates.tag_counts.len(),
        untagged: aggregates.untagged,
    })
}

fn main() {

    // Parse command-line arguments
    let args = Args::parse();

    init_tracing(&args);

    match run(&args) {
        Ok(summary) => {
            info!(
                output   = %args.output.display(),
                entries  = summary.entries,
                lines    = summary.stats.lines,
                records  = summary.stats.records,
                skipped  = summary.stats.skipped,
                tags     = summary.tags,
                untagged = summary.untagged,
                "report written"
            );
        }
        Err(error) => {
            eprintln!("[ERROR]: {}", error);
            std::process::exit(error.exit_code());
        }
    }
}
