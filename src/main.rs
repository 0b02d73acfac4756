//! machtrie - Dump and query Mach-O export tries.
//!
//! The input file is either a raw export-info blob or a larger file (such as a
//! Mach-O image) from which `--offset`/`--size` select the export-info range.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use memmap2::Mmap;
use rayon::prelude::*;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use machtrie::{ExportPayload, ExportTrieParser, TrieWalker};

/// Default upper bound on the size of a trie we are willing to decode.
const DEFAULT_MAX_SIZE: u64 = 64 * 1024 * 1024;

/// Dump and query Mach-O export tries.
#[derive(Parser, Debug)]
#[command(name = "machtrie")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a trie.
#[derive(Args, Debug)]
struct TrieArgs {
    /// File containing the export trie
    file: PathBuf,

    /// Offset of the export-info range within the file (decimal or 0x hex)
    #[arg(long, value_parser = parse_u64, default_value = "0")]
    offset: u64,

    /// Size of the export-info range (default: to end of file)
    #[arg(long, value_parser = parse_u64)]
    size: Option<u64>,

    /// Load address added to regular and thread-local exports
    #[arg(short, long, value_parser = parse_u64, default_value = "0")]
    load_address: u64,

    /// Refuse tries larger than this many bytes
    #[arg(long, value_parser = parse_u64, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,

    /// Verbosity level (repeat for more: -v warn, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every export in the trie
    Dump {
        #[command(flatten)]
        trie: TrieArgs,

        /// Sort exports by name
        #[arg(short, long)]
        sort: bool,
    },

    /// Look up one or more symbols
    Lookup {
        #[command(flatten)]
        trie: TrieArgs,

        /// Symbols to look up (e.g., "_main")
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Number of parallel jobs (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { trie, sort } => {
            setup_logging(trie.verbose);
            cmd_dump(&trie, sort)
        }
        Commands::Lookup {
            trie,
            symbols,
            jobs,
        } => {
            setup_logging(trie.verbose);
            cmd_lookup(&trie, &symbols, jobs)
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        _ => Level::DEBUG,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
fn parse_u64(s: &str) -> std::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Memory-maps `path`.
fn map_file(path: &Path) -> Result<Mmap> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to memory map {}", path.display()))?;
    Ok(mmap)
}

/// Selects the export-info range described by `args` from `data`.
fn trie_range<'a>(data: &'a [u8], args: &TrieArgs) -> Result<&'a [u8]> {
    let len = data.len() as u64;
    if args.offset > len {
        bail!(
            "Offset {:#x} is past the end of {} ({:#x} bytes)",
            args.offset,
            args.file.display(),
            len
        );
    }

    let size = args.size.unwrap_or(len - args.offset);
    let end = args
        .offset
        .checked_add(size)
        .filter(|&end| end <= len)
        .with_context(|| {
            format!(
                "Range {:#x}+{:#x} exceeds {} ({:#x} bytes)",
                args.offset,
                size,
                args.file.display(),
                len
            )
        })?;

    if size > args.max_size {
        bail!(
            "Export trie is {} bytes, larger than --max-size {}",
            size,
            args.max_size
        );
    }

    debug!(offset = args.offset, size, "selected export-info range");
    Ok(&data[args.offset as usize..end as usize])
}

fn cmd_dump(args: &TrieArgs, sort: bool) -> Result<()> {
    let mmap = map_file(&args.file)?;
    let trie = trie_range(&mmap, args)?;

    let mut exports = ExportTrieParser::new(trie)
        .with_load_address(args.load_address)
        .parse_all()
        .with_context(|| format!("Failed to parse export trie in {}", args.file.display()))?;

    if sort {
        exports.sort_by(|a, b| a.name.cmp(&b.name));
    }

    for export in &exports {
        println!("{}", export);
    }

    info!("{} exports", exports.len());
    Ok(())
}

fn cmd_lookup(args: &TrieArgs, symbols: &[String], jobs: Option<usize>) -> Result<()> {
    let mmap = map_file(&args.file)?;
    let trie = trie_range(&mmap, args)?;

    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    // Each lookup owns its own cursor over the shared mapping.
    let walker = TrieWalker::new(trie);
    let results: Vec<_> = symbols
        .par_iter()
        .map(|symbol| {
            let payload = walker
                .find(symbol)
                .and_then(|offset| Ok((offset, ExportPayload::decode_at(trie, offset)?)));
            (symbol, payload)
        })
        .collect();

    let mut missing = 0usize;
    for (symbol, result) in results {
        match result {
            Ok((offset, payload)) => {
                let mut line = format!(
                    "0x{:8x}: {} [{}] (payload at {:#x})",
                    payload.address(args.load_address),
                    symbol,
                    payload.flags,
                    offset
                );
                if payload.flags.is_reexport() {
                    line.push_str(&format!(", re-export ordinal {}", payload.other));
                    if let Some(name) = &payload.reexport_name {
                        line.push_str(&format!(" as {}", name));
                    }
                } else if payload.flags.is_stub_and_resolver() {
                    line.push_str(&format!(", resolver {:#x}", payload.other));
                }
                println!("{}", line);
            }
            Err(e) if e.is_not_found() => {
                missing += 1;
                println!("{}: not found", symbol);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to look up {}", symbol));
            }
        }
    }

    if missing > 0 {
        bail!("{} of {} symbols not found", missing, symbols.len());
    }

    Ok(())
}
