use clap::Args;
use serde_json::Value;

use irb_core::capital::correlation::CorrelationParams;
use irb_core::capital::engine::{self, CapitalInput};
use irb_core::capital::maturity::MaturityParams;

use crate::input;

/// Arguments for the closed-form capital calculation
#[derive(Args)]
pub struct CapitalArgs {
    /// Path to JSON input file (full CapitalInput)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a portfolio CSV (columns PD, M and optionally EAD, LGD)
    #[arg(long)]
    pub portfolio: Option<String>,

    /// Regulatory confidence level
    #[arg(long, default_value_t = 0.999)]
    pub alpha: f64,

    /// Scalar EAD fallback for CSV portfolios without an EAD column
    #[arg(long, default_value_t = 1.0)]
    pub ead: f64,

    /// Scalar LGD fallback for CSV portfolios without an LGD column
    #[arg(long, default_value_t = 1.0)]
    pub lgd: f64,
}

pub fn run_capital(args: CapitalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capital_input: CapitalInput = if let Some(ref path) = args.portfolio {
        let data = input::portfolio::load_portfolio(path, args.ead, args.lgd)?;
        CapitalInput {
            pd: data.pd,
            ead: data.ead,
            lgd: data.lgd,
            maturity: data.maturity,
            alpha: args.alpha,
            correlation: CorrelationParams::default(),
            maturity_params: MaturityParams::default(),
        }
    } else if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--portfolio <file.csv>, --input <file.json> or stdin required".into());
    };

    let result = engine::calculate_capital(&capital_input)?;
    Ok(serde_json::to_value(result)?)
}
