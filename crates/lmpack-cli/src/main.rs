use anyhow::Context;
use clap::{Parser, Subcommand};
use lmpack_lib::constants::FILTER_ERROR_RATE;
use lmpack_lib::{compact, Bitmap, RecordFile};
use tracing::info;

#[derive(Parser)]
#[command(name = "lmpack")]
#[command(version = "0.1.0")]
#[command(about = "Compile textual language models into binary lookup artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a membership filter from a fixed-size record file
    Filter {
        /// Input record file
        infile: String,

        /// Output filter file
        outfile: String,

        /// Record size in bytes
        record_size: usize,

        /// Header size in bytes (the two hashed 32-bit words)
        header_size: usize,
    },

    /// Compact an ARPA-style n-gram model into binary gram tables
    Compact {
        /// Language model file
        model: String,

        /// Output file prefix
        output_prefix: String,
    },

    /// Verify that every record tests positive against a filter file
    Check {
        /// Filter file to check against
        filter: String,

        /// Record file the filter was built from
        records: String,

        /// Record size in bytes
        record_size: usize,

        /// Header size in bytes
        header_size: usize,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filter {
            infile,
            outfile,
            record_size,
            header_size,
        } => {
            filter_command(&infile, &outfile, record_size, header_size)?;
        }
        Commands::Compact {
            model,
            output_prefix,
        } => {
            compact_command(&model, &output_prefix)?;
        }
        Commands::Check {
            filter,
            records,
            record_size,
            header_size,
        } => {
            check_command(&filter, &records, record_size, header_size)?;
        }
    }

    Ok(())
}

/// Build a membership filter over a record file
fn filter_command(
    infile: &str,
    outfile: &str,
    record_size: usize,
    header_size: usize,
) -> anyhow::Result<()> {
    info!("Building membership filter...");
    info!("  Input: {}", infile);
    info!("  Record size: {}", record_size);

    let records = RecordFile::open(infile, record_size, header_size)?;
    let headers: Vec<(u32, u32)> = records.headers().collect();
    let bitmap = Bitmap::build(&headers, FILTER_ERROR_RATE)?;
    info!(
        "  {} records -> {} bits ({} bytes)",
        headers.len(),
        bitmap.num_bits(),
        bitmap.as_bytes().len()
    );

    std::fs::write(outfile, bitmap.as_bytes())
        .with_context(|| format!("failed to write filter file {}", outfile))?;
    info!("Filter written to {}", outfile);

    Ok(())
}

/// Compact an ARPA-style model into gram tables and lexicons
fn compact_command(model: &str, output_prefix: &str) -> anyhow::Result<()> {
    let stats = compact(model, output_prefix)?;

    info!("Compaction complete");
    info!(
        "  Vocabulary: {} keys, inputs: {} keys",
        stats.vocab_keys, stats.input_keys
    );
    for (index, (collected, written)) in stats
        .entries_per_order
        .iter()
        .zip(stats.rows_per_order.iter())
        .enumerate()
    {
        info!(
            "  {}-grams: {} entries, {} rows written",
            index + 1,
            collected,
            written
        );
    }
    info!("  Min observed cost: {}", stats.min_cost);

    Ok(())
}

/// Re-run the 4-seed membership probe for every record
fn check_command(
    filter: &str,
    records: &str,
    record_size: usize,
    header_size: usize,
) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(filter).with_context(|| format!("failed to read filter file {}", filter))?;
    let bitmap = Bitmap::from_bytes(bytes);

    let records = RecordFile::open(records, record_size, header_size)?;
    let total = records.len();
    let missing = records
        .headers()
        .filter(|&(b0, b1)| !bitmap.contains_pair(b0, b1))
        .count();

    if missing > 0 {
        anyhow::bail!("{} of {} records missing from filter", missing, total);
    }
    info!("All {} records test positive", total);

    Ok(())
}
