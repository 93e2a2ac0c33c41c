//! memsim - replay a memory-management script and print a JSON report
//!
//! Usage:
//!   memsim [--verbose] [--config FILE] paging SCRIPT [--total-memory N] [--page-size N] [-o OUT]
//!   memsim [--verbose] [--config FILE] segmentation SCRIPT [--total-memory N] [-o OUT]
//!   memsim [--verbose] [--config FILE] virtual SCRIPT [--physical-memory N] [--virtual-memory N] [--page-size N] [-o OUT]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};

use memsim::io::{PagingCommand, SegmentCommand, VmCommand, read_script, write_report};
use memsim::runner::{run_paging, run_segmentation, run_virtual};
use memsim::{MemoryConfig, ScriptError};

#[derive(Parser)]
#[command(name = "memsim")]
#[command(about = "Simulate paging, segmentation and demand-paged virtual memory")]
#[command(version)]
struct Cli {
    /// Log engine events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with total_memory, page_size and virtual_memory
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-size paging with FIFO/LRU/LFU replacement
    Paging {
        /// Script of alloc/access/free lines
        script: PathBuf,

        /// Physical memory in bytes
        #[arg(long)]
        total_memory: Option<usize>,

        /// Page and frame size in bytes
        #[arg(long)]
        page_size: Option<usize>,

        /// Report file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Variable-size segments with first/best/worst fit
    Segmentation {
        script: PathBuf,

        /// Size of the segment address range in bytes
        #[arg(long)]
        total_memory: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Demand paging with a swap store
    Virtual {
        script: PathBuf,

        #[arg(long)]
        physical_memory: Option<usize>,

        /// Virtual capacity shared by all processes, also the swap size
        #[arg(long)]
        virtual_memory: Option<usize>,

        #[arg(long)]
        page_size: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Plain stderr logger, one line per record.
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                std::io::stderr().lock(),
                "[{:<5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MemoryConfig, ScriptError> {
    match path {
        Some(path) => MemoryConfig::from_file(path),
        None => Ok(MemoryConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), ScriptError> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Paging {
            script,
            total_memory,
            page_size,
            output,
        } => {
            config.total_memory = total_memory.unwrap_or(config.total_memory);
            config.page_size = page_size.unwrap_or(config.page_size);
            let report = run_paging(&config, &read_script::<PagingCommand, _>(&script)?)?;
            write_report(output.as_deref(), &report)
        }
        Commands::Segmentation {
            script,
            total_memory,
            output,
        } => {
            config.total_memory = total_memory.unwrap_or(config.total_memory);
            let report = run_segmentation(&config, &read_script::<SegmentCommand, _>(&script)?)?;
            write_report(output.as_deref(), &report)
        }
        Commands::Virtual {
            script,
            physical_memory,
            virtual_memory,
            page_size,
            output,
        } => {
            config.total_memory = physical_memory.unwrap_or(config.total_memory);
            config.virtual_memory = virtual_memory.unwrap_or(config.virtual_memory);
            config.page_size = page_size.unwrap_or(config.page_size);
            let report = run_virtual(&config, &read_script::<VmCommand, _>(&script)?)?;
            write_report(output.as_deref(), &report)
        }
    }
}
