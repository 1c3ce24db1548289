use statrs::distribution::{ContinuousCDF, Normal};

use crate::types::check_shape;
use crate::IrbResult;

/// Default probability of one obligor conditional on a realization of the
/// systematic factor.
///
/// Vasicek one-factor model: the obligor's firm value loads on a common
/// standard normal factor Y with weight sqrt(rho) and on idiosyncratic noise
/// with weight sqrt(1 - rho). Conditional on Y = y the default probability is
///
/// `Phi((Phi^-1(pd) - sqrt(rho) * y) / sqrt(1 - rho))`
///
/// A low (recessionary) y pushes every obligor's conditional PD up at once,
/// which is what induces default correlation across the portfolio.
pub fn conditional_pd(pd: f64, rho: f64, y: f64, normal: &Normal) -> f64 {
    let numerator = normal.inverse_cdf(pd) - rho.sqrt() * y;
    normal.cdf(numerator / (1.0 - rho).sqrt())
}

/// Element-wise conditional PD for a portfolio under one realization of Y.
///
/// `y` is a single scalar shared by all obligors in the scenario.
pub fn conditional_pd_slice(
    pds: &[f64],
    rhos: &[f64],
    y: f64,
    normal: &Normal,
) -> IrbResult<Vec<f64>> {
    check_shape("rho", rhos.len(), pds.len())?;
    Ok(pds
        .iter()
        .zip(rhos.iter())
        .map(|(&pd, &rho)| conditional_pd(pd, rho, y, normal))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IrbError;

    fn normal() -> Normal {
        Normal::new(0.0, 1.0).unwrap()
    }

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_conditional_pd_neutral_factor() {
        // At y = 0: Phi(Phi^-1(0.02) / sqrt(0.85)) = 0.0129535
        let cpd = conditional_pd(0.02, 0.15, 0.0, &normal());
        assert!(approx_eq(cpd, 0.012953484965745443, 1e-9), "cpd = {cpd}");
    }

    #[test]
    fn test_conditional_pd_downturn_raises_default_risk() {
        // y = -2 is a recessionary draw: conditional PD well above 2%.
        let cpd = conditional_pd(0.02, 0.15, -2.0, &normal());
        assert!(approx_eq(cpd, 0.0826545173606737, 1e-9), "cpd = {cpd}");
    }

    #[test]
    fn test_conditional_pd_boom_lowers_default_risk() {
        let cpd = conditional_pd(0.02, 0.15, 2.0, &normal());
        assert!(approx_eq(cpd, 0.0010783072449422337, 1e-9), "cpd = {cpd}");
    }

    #[test]
    fn test_conditional_pd_monotone_in_factor() {
        let n = normal();
        let mut prev = conditional_pd(0.05, 0.2, -3.0, &n);
        for i in -29..=30 {
            let cpd = conditional_pd(0.05, 0.2, i as f64 / 10.0, &n);
            assert!(cpd < prev, "conditional PD not decreasing at y = {}", i as f64 / 10.0);
            prev = cpd;
        }
    }

    #[test]
    fn test_conditional_pd_zero_correlation_is_identity() {
        // With rho = 0 the systematic factor carries no information.
        let cpd = conditional_pd(0.03, 0.0, -1.5, &normal());
        assert!(approx_eq(cpd, 0.03, 1e-9), "cpd = {cpd}");
    }

    #[test]
    fn test_conditional_pd_extreme_pds() {
        let n = normal();
        assert_eq!(conditional_pd(0.0, 0.2, -1.0, &n), 0.0);
        assert_eq!(conditional_pd(1.0, 0.2, 1.0, &n), 1.0);
    }

    #[test]
    fn test_conditional_pd_slice_matches_scalar() {
        let n = normal();
        let pds = [0.01, 0.02, 0.05];
        let rhos = [0.24, 0.20, 0.15];
        let cpds = conditional_pd_slice(&pds, &rhos, -0.5, &n).unwrap();
        for i in 0..3 {
            assert_eq!(cpds[i], conditional_pd(pds[i], rhos[i], -0.5, &n));
        }
    }

    #[test]
    fn test_conditional_pd_slice_shape_mismatch() {
        let err = conditional_pd_slice(&[0.01, 0.02], &[0.2], -0.5, &normal()).unwrap_err();
        assert!(matches!(err, IrbError::ShapeMismatch { .. }));
    }
}
