use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use standoff_compare::cli::compare::CompareArgs;
use standoff_compare::cli::convert::ConvertArgs;
use standoff_compare::Result;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "standoff-compare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare standoff entity annotations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score SET2 against SET1 and print precision, recall and F1
    Compare(CompareArgs),

    /// Convert tagger TSV output to standoff
    Convert(ConvertArgs),

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compare(args) => standoff_compare::cli::compare::run(args)?,
        Commands::Convert(args) => standoff_compare::cli::convert::run(args)?,
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "standoff-compare", &mut io::stdout());
        }
    }
    Ok(())
}
