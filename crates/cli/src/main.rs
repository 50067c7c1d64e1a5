//! Recwire CLI
//!
//! Command-line interface for converting record files between the text and
//! binary formats, validating text records, and merging partial results.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use recwire_cli::config::CliConfig;
use recwire_cli::transcode;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "recwire")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recwire - convert records between text and binary formats", long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text records (one per line) to binary
    Encode {
        /// Input file (defaults to stdin)
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one hex-encoded record per line
        #[arg(long)]
        hex: bool,

        /// Lines are key<SEP>record
        #[arg(long)]
        keyed: bool,
    },

    /// Decode binary records to text, one per line
    Decode {
        /// Input file (defaults to stdin)
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input holds one hex-encoded record per line
        #[arg(long)]
        hex: bool,

        /// Records are [key, value] pairs; write key<SEP>record lines
        #[arg(long)]
        keyed: bool,
    },

    /// Check that every text record decodes
    Check {
        /// Input file (defaults to stdin)
        input: Option<PathBuf>,

        /// Lines are key<SEP>record
        #[arg(long)]
        keyed: bool,
    },

    /// Merge binary partial results into one dict of lists
    Merge {
        /// Result files, or directories of *.bin result files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recwire=info,recwire_cli=info")),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            hex,
            keyed,
        } => {
            let config = load_config(cli.config.as_deref());
            run_encode(input.as_deref(), output.as_deref(), &config, keyed, hex);
        }
        Commands::Decode {
            input,
            output,
            hex,
            keyed,
        } => {
            let config = load_config(cli.config.as_deref());
            run_decode(input.as_deref(), output.as_deref(), &config, keyed, hex);
        }
        Commands::Check { input, keyed } => {
            let config = load_config(cli.config.as_deref());
            run_check(input.as_deref(), &config, keyed);
        }
        Commands::Merge { paths, output } => {
            let config = load_config(cli.config.as_deref());
            run_merge(&paths, output.as_deref(), &config);
        }
        Commands::Completions { shell } => {
            run_completions(shell);
        }
    }
}

fn load_config(path: Option<&Path>) -> CliConfig {
    match CliConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn open_input(path: Option<&Path>) -> Box<dyn BufRead> {
    match path {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error opening '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    }
}

fn open_output(path: Option<&Path>) -> Box<dyn Write> {
    match path {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Error creating '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Box::new(BufWriter::new(io::stdout())),
    }
}

fn run_encode(
    input: Option<&Path>,
    output: Option<&Path>,
    config: &CliConfig,
    keyed: bool,
    hex: bool,
) {
    let reader = open_input(input);
    let mut writer = open_output(output);
    if let Err(e) = transcode::encode_records(reader, &mut writer, config, keyed, hex) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_decode(
    input: Option<&Path>,
    output: Option<&Path>,
    config: &CliConfig,
    keyed: bool,
    hex: bool,
) {
    let reader = open_input(input);
    let mut writer = open_output(output);
    if let Err(e) = transcode::decode_records(reader, &mut writer, config, keyed, hex) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_check(input: Option<&Path>, config: &CliConfig, keyed: bool) {
    let reader = open_input(input);
    let report = match transcode::check_records(reader, config, keyed) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for (line, err) in &report.failures {
        println!("line {}: {}", line, err);
    }

    if report.is_ok() {
        println!("{} records ok", report.records);
    } else {
        println!(
            "{} of {} records failed to decode",
            report.failures.len(),
            report.records
        );
        process::exit(1);
    }
}

fn run_merge(paths: &[PathBuf], output: Option<&Path>, config: &CliConfig) {
    let mut writer = open_output(output);
    if let Err(e) = transcode::merge(paths, &mut writer, config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "recwire", &mut io::stdout());
}
