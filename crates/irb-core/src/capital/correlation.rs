use serde::{Deserialize, Serialize};

use crate::error::IrbError;
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Calibration of the Basel supervisory asset-correlation function.
///
/// The two limit correlations apply at the PD extremes: `rho_max` for
/// PD = 0% and `rho_min` for PD = 100%. Between them the correlation is an
/// exponentially weighted blend whose pace is set by `k_factor` (-50 for
/// corporate exposures).
///
/// REF: https://www.bis.org/bcbs/irbriskweight.pdf
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrelationParams {
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    #[serde(default = "default_rho_min")]
    pub rho_min: f64,
    #[serde(default = "default_rho_max")]
    pub rho_max: f64,
}

fn default_k_factor() -> f64 {
    -50.0
}

fn default_rho_min() -> f64 {
    0.12
}

fn default_rho_max() -> f64 {
    0.24
}

impl Default for CorrelationParams {
    fn default() -> Self {
        CorrelationParams {
            k_factor: default_k_factor(),
            rho_min: default_rho_min(),
            rho_max: default_rho_max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset correlation
// ---------------------------------------------------------------------------

/// Asset correlation of a single obligor as a function of its PD.
///
/// `w = (1 - exp(k * pd)) / (1 - exp(k))`, then
/// `rho = rho_min * w + rho_max * (1 - w)`.
///
/// At PD = 0 the weight is exactly 0 (the numerator is `1 - exp(0)`), so
/// `rho(0) == rho_max` and `rho(1) == rho_min` hold to floating-point
/// precision. Pure; performs no bounds checking. Inputs outside [0, 1]
/// propagate through the exponential untouched and must be rejected by the
/// caller.
pub fn asset_correlation(pd: f64, params: &CorrelationParams) -> f64 {
    let w = (1.0 - (params.k_factor * pd).exp()) / (1.0 - params.k_factor.exp());
    params.rho_min * w + params.rho_max * (1.0 - w)
}

/// Element-wise asset correlation over a per-obligor PD array.
pub fn asset_correlation_slice(pds: &[f64], params: &CorrelationParams) -> Vec<f64> {
    pds.iter().map(|&pd| asset_correlation(pd, params)).collect()
}

// ---------------------------------------------------------------------------
// Average PD
// ---------------------------------------------------------------------------

/// Simple average PD over all exposures.
///
/// The ASRF model uses average PDs reflecting expected default rates under
/// normal business conditions.
pub fn average_pd(pds: &[f64]) -> IrbResult<f64> {
    if pds.is_empty() {
        return Err(IrbError::InsufficientData(
            "at least one exposure is required to average PD".into(),
        ));
    }
    Ok(pds.iter().sum::<f64>() / pds.len() as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rho_pd_zero_is_upper_limit() {
        // PD = 0% pins the correlation at the 24% upper limit, exactly.
        let rho = asset_correlation(0.0, &CorrelationParams::default());
        assert_eq!(rho, 0.24);
    }

    #[test]
    fn test_rho_pd_one_is_lower_limit() {
        // PD = 100% pins the correlation at the 12% lower limit, exactly.
        let rho = asset_correlation(1.0, &CorrelationParams::default());
        assert_eq!(rho, 0.12);
    }

    #[test]
    fn test_rho_pd_one_percent() {
        // w = (1 - exp(-0.5)) / (1 - exp(-50)) = 0.393469340287367
        // rho = 0.12 * w + 0.24 * (1 - w) = 0.192783679165516
        let rho = asset_correlation(0.01, &CorrelationParams::default());
        assert!(
            (rho - 0.192783679165516).abs() < 1e-15,
            "rho(0.01) = {rho}"
        );
    }

    #[test]
    fn test_rho_slice_matches_scalar() {
        let params = CorrelationParams::default();
        let rhos = asset_correlation_slice(&[0.0, 1.0, 0.01], &params);
        assert_eq!(rhos[0], asset_correlation(0.0, &params));
        assert_eq!(rhos[1], asset_correlation(1.0, &params));
        assert_eq!(rhos[2], asset_correlation(0.01, &params));
        assert_eq!(rhos, vec![0.24, 0.12, asset_correlation(0.01, &params)]);
    }

    #[test]
    fn test_rho_monotonically_decreasing_in_pd() {
        let params = CorrelationParams::default();
        let mut prev = asset_correlation(0.0, &params);
        for i in 1..=100 {
            let rho = asset_correlation(i as f64 / 100.0, &params);
            assert!(rho < prev, "rho not decreasing at pd = {}", i as f64 / 100.0);
            prev = rho;
        }
    }

    #[test]
    fn test_rho_stays_within_limits() {
        let params = CorrelationParams::default();
        for i in 0..=1000 {
            let rho = asset_correlation(i as f64 / 1000.0, &params);
            assert!((0.12..=0.24).contains(&rho), "rho = {rho} out of limits");
        }
    }

    #[test]
    fn test_average_pd_extremes() {
        // avg_PD = (0.0 + 1.0) / 2 = 0.5, exactly
        let avg = average_pd(&[0.0, 1.0]).unwrap();
        assert_eq!(avg, 0.5);
    }

    #[test]
    fn test_average_pd_empty_errors() {
        assert!(average_pd(&[]).is_err());
    }
}
