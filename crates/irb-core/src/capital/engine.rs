use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::time::Instant;

use crate::capital::correlation::{self, CorrelationParams};
use crate::capital::maturity::{self, MaturityParams};
use crate::error::IrbError;
use crate::types::{check_shape, with_metadata, ComputationOutput};
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Top-level input for the closed-form IRB capital calculation.
///
/// The four per-obligor arrays are parallel: obligor identity is the array
/// position and must line up across all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalInput {
    /// Annual probability of default per obligor (0 to 1)
    pub pd: Vec<f64>,
    /// Exposure at default per obligor, currency units
    pub ead: Vec<f64>,
    /// Loss given default per obligor (0 to 1)
    pub lgd: Vec<f64>,
    /// Effective maturity per obligor, years
    pub maturity: Vec<f64>,
    /// Regulatory confidence level, e.g. 0.999
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub correlation: CorrelationParams,
    #[serde(default)]
    pub maturity_params: MaturityParams,
}

fn default_alpha() -> f64 {
    0.999
}

/// Per-obligor capital breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligorCapital {
    pub pd: f64,
    pub asset_correlation: f64,
    pub maturity_adjustment: f64,
    /// Unexpected-loss capital as a fraction of exposure (K)
    pub capital_fraction: f64,
    /// K * EAD, currency units
    pub capital_requirement: f64,
    /// PD * LGD * EAD, currency units
    pub expected_loss: f64,
}

/// Output of the closed-form capital calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalOutput {
    pub obligors: Vec<ObligorCapital>,
    pub total_exposure: f64,
    /// Sum of per-obligor K * EAD
    pub total_capital: f64,
    pub total_expected_loss: f64,
    /// Total capital as % of total exposure
    pub capital_pct: f64,
    /// Simple average PD across obligors
    pub average_pd: f64,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &CapitalInput) -> IrbResult<()> {
    if input.pd.is_empty() {
        return Err(IrbError::InsufficientData(
            "at least one exposure is required".into(),
        ));
    }

    let n = input.pd.len();
    check_shape("ead", input.ead.len(), n)?;
    check_shape("lgd", input.lgd.len(), n)?;
    check_shape("maturity", input.maturity.len(), n)?;

    if input.alpha <= 0.0 || input.alpha >= 1.0 {
        return Err(IrbError::InvalidInput {
            field: "alpha".into(),
            reason: format!("must be in (0, 1), got {}", input.alpha),
        });
    }

    for i in 0..n {
        if !(0.0..=1.0).contains(&input.pd[i]) {
            return Err(IrbError::InvalidInput {
                field: format!("pd[{i}]"),
                reason: format!("must be in [0, 1], got {}", input.pd[i]),
            });
        }
        if !(0.0..=1.0).contains(&input.lgd[i]) {
            return Err(IrbError::InvalidInput {
                field: format!("lgd[{i}]"),
                reason: format!("must be in [0, 1], got {}", input.lgd[i]),
            });
        }
        if input.ead[i] <= 0.0 {
            return Err(IrbError::InvalidInput {
                field: format!("ead[{i}]"),
                reason: format!("must be positive, got {}", input.ead[i]),
            });
        }
        if input.maturity[i] <= 0.0 {
            return Err(IrbError::InvalidInput {
                field: format!("maturity[{i}]"),
                reason: format!("must be positive, got {}", input.maturity[i]),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Capital requirement K
// ---------------------------------------------------------------------------

/// Closed-form capital requirement for a single obligor, as a fraction of
/// exposure.
///
/// `K = (LGD * Phi(threshold) - PD * LGD) * MA` where
/// `threshold = (1-rho)^(-0.5) * Phi^-1(PD) + (rho/(1-rho))^0.5 * Phi^-1(alpha)`.
///
/// The fractional powers use real exponentiation; `rho` and `1-rho` are
/// fractional bases. The limits rho -> 0 (threshold collapses onto
/// `Phi^-1(PD)`) and rho -> 1 (threshold diverges) are mathematically valid
/// and left untouched.
pub fn capital_fraction(
    pd: f64,
    m: f64,
    lgd: f64,
    alpha: f64,
    normal: &Normal,
    corr_params: &CorrelationParams,
    mat_params: &MaturityParams,
) -> IrbResult<f64> {
    let rho = correlation::asset_correlation(pd, corr_params);
    let ma = maturity::maturity_adjustment(pd, m, mat_params)?;
    Ok(k_from_components(pd, lgd, alpha, rho, ma, normal))
}

/// K given precomputed asset correlation and maturity adjustment.
fn k_from_components(pd: f64, lgd: f64, alpha: f64, rho: f64, ma: f64, normal: &Normal) -> f64 {
    let threshold = (1.0 - rho).powf(-0.5) * normal.inverse_cdf(pd)
        + (rho / (1.0 - rho)).powf(0.5) * normal.inverse_cdf(alpha);
    let conditional_loss_rate = normal.cdf(threshold);
    (lgd * conditional_loss_rate - pd * lgd) * ma
}

/// Compute per-obligor and portfolio IRB capital requirements.
pub fn calculate_capital(input: &CapitalInput) -> IrbResult<ComputationOutput<CapitalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let normal = Normal::new(0.0, 1.0).map_err(|e| IrbError::NumericInstability {
        context: format!("standard normal distribution: {e}"),
        value: f64::NAN,
    })?;

    let n = input.pd.len();
    let mut obligors: Vec<ObligorCapital> = Vec::with_capacity(n);
    let mut total_exposure = 0.0_f64;
    let mut total_capital = 0.0_f64;
    let mut total_expected_loss = 0.0_f64;

    for i in 0..n {
        let pd = input.pd[i];
        let ead = input.ead[i];
        let lgd = input.lgd[i];
        let m = input.maturity[i];

        let rho = correlation::asset_correlation(pd, &input.correlation);
        let ma = maturity::maturity_adjustment(pd, m, &input.maturity_params)?;
        let k = k_from_components(pd, lgd, input.alpha, rho, ma, &normal);

        if k < 0.0 {
            warnings.push(format!(
                "Obligor {i}: negative capital fraction {k:.6}, check input quality"
            ));
        }

        let expected_loss = pd * lgd * ead;
        total_exposure += ead;
        total_capital += k * ead;
        total_expected_loss += expected_loss;

        obligors.push(ObligorCapital {
            pd,
            asset_correlation: rho,
            maturity_adjustment: ma,
            capital_fraction: k,
            capital_requirement: k * ead,
            expected_loss,
        });
    }

    let average_pd = correlation::average_pd(&input.pd)?;
    let capital_pct = total_capital / total_exposure * 100.0;

    let output = CapitalOutput {
        obligors,
        total_exposure,
        total_capital,
        total_expected_loss,
        capital_pct,
        average_pd,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Basel IRB closed-form (ASRF)",
        &serde_json::json!({
            "alpha": input.alpha,
            "k_factor": input.correlation.k_factor,
            "rho_limits": [input.correlation.rho_min, input.correlation.rho_max],
            "reference_maturity": input.maturity_params.reference_maturity,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
