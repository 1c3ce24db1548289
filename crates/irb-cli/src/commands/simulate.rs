use clap::Args;
use serde_json::Value;

use irb_core::capital::correlation::CorrelationParams;
use irb_core::simulation::distribution::{self, LossDistributionInput};
use irb_core::simulation::monte_carlo::{self, SimulationInput};

use crate::input;

/// Arguments for the Monte Carlo loss simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file (full SimulationInput)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a portfolio CSV (columns PD, M and optionally EAD, LGD)
    #[arg(long)]
    pub portfolio: Option<String>,

    /// Number of scenarios to simulate
    #[arg(long, default_value_t = 10_000)]
    pub scenarios: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Confidence level for VaR / expected shortfall in the summary
    #[arg(long, default_value_t = 0.999)]
    pub confidence: f64,

    /// Emit the raw scenario-loss sequence instead of the summary
    #[arg(long)]
    pub raw: bool,

    /// Scalar EAD fallback for CSV portfolios without an EAD column
    #[arg(long, default_value_t = 1.0)]
    pub ead: f64,

    /// Scalar LGD fallback for CSV portfolios without an LGD column
    #[arg(long, default_value_t = 1.0)]
    pub lgd: f64,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: SimulationInput = if let Some(ref path) = args.portfolio {
        let data = input::portfolio::load_portfolio(path, args.ead, args.lgd)?;
        SimulationInput {
            pd: data.pd,
            ead: data.ead,
            lgd: data.lgd,
            num_scenarios: args.scenarios,
            seed: args.seed,
            correlation: CorrelationParams::default(),
        }
    } else if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--portfolio <file.csv>, --input <file.json> or stdin required".into());
    };

    let simulated = monte_carlo::run_simulation(&sim_input)?;

    if args.raw {
        return Ok(serde_json::to_value(simulated)?);
    }

    let summary = distribution::analyze_loss_distribution(&LossDistributionInput {
        losses: simulated.result.losses,
        confidence_level: args.confidence,
    })?;
    Ok(serde_json::to_value(summary)?)
}
