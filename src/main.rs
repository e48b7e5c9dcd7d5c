use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use enrollment_processor::logging;
use enrollment_processor::{EnrollmentProcessor, ProcessorConfig, RunSummary};

#[derive(Parser)]
#[command(name = "enrollment_processor")]
#[command(about = "Split an enrollment file into one deduplicated, sorted file per insurance carrier")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input file name, resolved against the input folder
    file: String,

    /// TOML file with processor settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Field delimiter used for reading and writing
    #[arg(long)]
    delimiter: Option<String>,

    /// Prefix for output file names
    #[arg(long)]
    prefix: Option<String>,

    /// Skip the first line of the input
    #[arg(long)]
    has_header: bool,

    /// Abort the run on the first malformed line
    #[arg(long)]
    strict: bool,

    /// Suppress progress and per-line diagnostics
    #[arg(long)]
    quiet: bool,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    summary_json: bool,
}

impl Cli {
    fn processor_config(&self) -> anyhow::Result<ProcessorConfig> {
        let mut config = match &self.config {
            Some(path) => ProcessorConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ProcessorConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.input_folder = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_folder = dir.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.file_prefix = prefix.clone();
        }
        if self.has_header {
            config.has_header = true;
        }
        if self.strict {
            config.stop_on_malformed_entry = true;
        }
        if self.quiet {
            config.output_info = false;
        }

        Ok(config)
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let processor = EnrollmentProcessor::new(cli.processor_config()?)?;
    let summary = processor.process_file(&cli.file)?;
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Enrollment run for {}:", summary.input_path.display());
    println!("   Lines read: {}", summary.lines_read);
    println!("   Accepted: {}", summary.accepted);
    println!("   Rejected: {}", summary.rejected.len());
    println!("   Carriers: {}", summary.carriers);
    println!("   Records written: {}", summary.records_written);
    for written in &summary.files_written {
        println!("   Output file: {}", written.path.display());
    }

    if !summary.failed_outputs.is_empty() {
        println!("\n⚠️  Carrier files not written:");
        for failed in &summary.failed_outputs {
            println!("   - {} ({}): {}", failed.carrier, failed.path.display(), failed.error);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let guard = logging::init_logging(cli.log_dir.as_deref());

    let exit_code = match run(&cli) {
        Ok(summary) => {
            if cli.summary_json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => error!("Could not serialize run summary: {}", e),
                }
            } else if !cli.quiet {
                print_summary(&summary);
            }
            0
        }
        Err(e) => {
            println!("Error in enrollment processor: {:#}", e);
            1
        }
    };

    // flush the file writer before exiting
    drop(guard);
    std::process::exit(exit_code);
}
