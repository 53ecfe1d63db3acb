//! evgen CLI
//!
//! Command-line interface for generating event dispatch sources from a
//! declaration snapshot and running the shape checks.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use evgen::validate::{Diagnostic, Severity, format_diagnostics};
use evgen::{GeneratorConfig, check_file, generate_file};
use evgen_core::Snapshot;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "evgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "evgen - wire generated event dispatchers to their handlers", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one source file per declaring type
    Build {
        /// Declaration snapshot (.toml or .json)
        snapshot: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Generator configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run shape checks first and refuse to generate on errors
        #[arg(long)]
        check: bool,
    },

    /// Print every generated source to stdout
    Print {
        /// Declaration snapshot (.toml or .json)
        snapshot: PathBuf,

        /// Generator configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check producer/handler compatibility without generating
    Check {
        /// Declaration snapshot (.toml or .json)
        snapshot: PathBuf,

        /// Treat warnings as errors (exit with failure if any warnings)
        #[arg(long)]
        deny_warnings: bool,
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
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            snapshot,
            output,
            config,
            check,
        } => {
            run_build(&snapshot, &output, config.as_deref(), check);
        }
        Commands::Print { snapshot, config } => {
            run_print(&snapshot, config.as_deref());
        }
        Commands::Check {
            snapshot,
            deny_warnings,
        } => {
            run_check(&snapshot, deny_warnings);
        }
        Commands::Completions { shell } => {
            run_completions(shell);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "evgen", &mut io::stdout());
}

fn load_config(path: Option<&Path>) -> GeneratorConfig {
    match path {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    }
}

fn run_build(snapshot: &Path, output: &Path, config_path: Option<&Path>, check: bool) {
    let config = load_config(config_path);

    if check {
        let diagnostics = collect_diagnostics(snapshot);
        print!("{}", format_diagnostics(&diagnostics));
        if has_errors(&diagnostics, false) {
            eprintln!("Error: shape checks failed; nothing generated");
            process::exit(1);
        }
    }

    match generate_file(snapshot, output, &config) {
        Ok(written) => {
            println!(
                "Generated {} file(s) from {} -> {}",
                written.len(),
                snapshot.display(),
                output.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_print(snapshot_path: &Path, config_path: Option<&Path>) {
    let config = load_config(config_path);

    let snapshot = match Snapshot::load(snapshot_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let sources = match evgen::generate(&snapshot, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for (key, text) in sources.iter() {
        println!("// ---- {}", sources.hint_name(key));
        print!("{}", text);
    }
}

fn run_check(snapshot: &Path, deny_warnings: bool) {
    let diagnostics = collect_diagnostics(snapshot);

    if diagnostics.is_empty() {
        println!("No issues found in {}", snapshot.display());
        return;
    }

    print!("{}", format_diagnostics(&diagnostics));
    println!("\n{} issue(s) in {}", diagnostics.len(), snapshot.display());

    if has_errors(&diagnostics, deny_warnings) {
        process::exit(1);
    }
}

fn collect_diagnostics(snapshot: &Path) -> Vec<Diagnostic> {
    match check_file(snapshot) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn has_errors(diagnostics: &[Diagnostic], deny_warnings: bool) -> bool {
    diagnostics.iter().any(|d| {
        d.severity == Severity::Error || (deny_warnings && d.severity == Severity::Warning)
    })
}
