mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::capital::CapitalArgs;
use commands::simulate::SimulateArgs;

/// Credit-portfolio capital requirements under the Basel IRB approach
#[derive(Parser)]
#[command(
    name = "irb",
    version,
    about = "IRB capital requirements and Vasicek Monte Carlo loss simulation",
    long_about = "Computes closed-form regulatory capital per obligor under the Basel \
                  Internal Ratings-Based approach, and simulates portfolio loss \
                  distributions with a one-factor Gaussian copula Monte Carlo."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Closed-form IRB capital requirement per obligor and in aggregate
    Capital(CapitalArgs),
    /// Monte Carlo portfolio loss simulation (Vasicek one-factor)
    Simulate(SimulateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Capital(args) => commands::capital::run_capital(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Version => {
            println!("irb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
