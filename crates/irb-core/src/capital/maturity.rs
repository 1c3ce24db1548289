use serde::{Deserialize, Serialize};

use crate::error::IrbError;
use crate::types::check_shape;
use crate::IrbResult;

/// Denominators closer to zero than this are treated as degenerate.
const DENOMINATOR_EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Calibration of the Basel maturity adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaturityParams {
    #[serde(default = "default_a")]
    pub a: f64,
    #[serde(default = "default_b")]
    pub b: f64,
    /// Regulatory reference maturity in years.
    #[serde(default = "default_reference_maturity")]
    pub reference_maturity: f64,
}

fn default_a() -> f64 {
    0.11852
}

fn default_b() -> f64 {
    -0.05478
}

fn default_reference_maturity() -> f64 {
    2.5
}

impl Default for MaturityParams {
    fn default() -> Self {
        MaturityParams {
            a: default_a(),
            b: default_b(),
            reference_maturity: default_reference_maturity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Maturity slope
// ---------------------------------------------------------------------------

/// Smoothed maturity slope `b(pd) = (a + b * ln(pd))^2`.
///
/// Defined only for PD strictly greater than zero; the logarithm is rejected
/// at PD <= 0 rather than letting -inf flow into downstream capital figures.
pub fn maturity_slope(pd: f64, params: &MaturityParams) -> IrbResult<f64> {
    if pd <= 0.0 {
        return Err(IrbError::InvalidInput {
            field: "pd".into(),
            reason: format!("maturity slope is undefined at pd = {pd} (ln of non-positive value)"),
        });
    }
    let s = params.a + params.b * pd.ln();
    Ok(s * s)
}

/// Element-wise maturity slope over a per-obligor PD array.
pub fn maturity_slope_slice(pds: &[f64], params: &MaturityParams) -> IrbResult<Vec<f64>> {
    pds.iter().map(|&pd| maturity_slope(pd, params)).collect()
}

// ---------------------------------------------------------------------------
// Maturity adjustment
// ---------------------------------------------------------------------------

/// Maturity adjustment `(1 + (m - y) * b(pd)) / (1 - (y - 1) * b(pd))`
/// with `y` the regulatory reference maturity.
///
/// The adjustment is identically 1.0 at M = 1 (the numerator and denominator
/// coincide at the one-year horizon) and scales capital up for longer
/// effective maturities. A denominator at or near zero is a calibration
/// pathology and is surfaced as a numeric-instability error instead of an
/// infinite adjustment.
pub fn maturity_adjustment(pd: f64, m: f64, params: &MaturityParams) -> IrbResult<f64> {
    let slope = maturity_slope(pd, params)?;
    let y = params.reference_maturity;
    let denominator = 1.0 - (y - 1.0) * slope;
    if denominator.abs() < DENOMINATOR_EPSILON {
        return Err(IrbError::NumericInstability {
            context: format!("maturity adjustment denominator at pd = {pd}"),
            value: denominator,
        });
    }
    Ok((1.0 + (m - y) * slope) / denominator)
}

/// Element-wise maturity adjustment over equal-length PD and maturity arrays.
pub fn maturity_adjustment_slice(
    pds: &[f64],
    maturities: &[f64],
    params: &MaturityParams,
) -> IrbResult<Vec<f64>> {
    check_shape("maturity", maturities.len(), pds.len())?;
    pds.iter()
        .zip(maturities.iter())
        .map(|(&pd, &m)| maturity_adjustment(pd, m, params))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_matches_formula_exactly() {
        let params = MaturityParams::default();
        let expected_01 = {
            let s = 0.11852 - 0.05478 * 0.1_f64.ln();
            s * s
        };
        let expected_02 = {
            let s = 0.11852 - 0.05478 * 0.2_f64.ln();
            s * s
        };
        assert_eq!(maturity_slope(0.1, &params).unwrap(), expected_01);
        assert_eq!(maturity_slope(0.2, &params).unwrap(), expected_02);
    }

    #[test]
    fn test_slope_slice_matches_scalar() {
        let params = MaturityParams::default();
        let slopes = maturity_slope_slice(&[0.1, 0.2], &params).unwrap();
        assert_eq!(slopes[0], maturity_slope(0.1, &params).unwrap());
        assert_eq!(slopes[1], maturity_slope(0.2, &params).unwrap());
    }

    #[test]
    fn test_slope_non_negative() {
        let params = MaturityParams::default();
        for i in 1..=100 {
            let slope = maturity_slope(i as f64 / 100.0, &params).unwrap();
            assert!(slope >= 0.0);
        }
    }

    #[test]
    fn test_slope_rejects_zero_pd() {
        // ln(0) must surface as a domain error, never a silent -inf.
        let err = maturity_slope(0.0, &MaturityParams::default()).unwrap_err();
        match err {
            IrbError::InvalidInput { field, .. } => assert_eq!(field, "pd"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_slope_rejects_negative_pd() {
        assert!(maturity_slope(-0.01, &MaturityParams::default()).is_err());
    }

    #[test]
    fn test_adjustment_neutral_at_one_year() {
        // At m = 1 the numerator equals the denominator for any valid PD.
        let params = MaturityParams::default();
        for pd in [0.001, 0.01, 0.1, 0.2, 0.5, 0.99] {
            let ma = maturity_adjustment(pd, 1.0, &params).unwrap();
            assert!((ma - 1.0).abs() < 1e-15, "MA({pd}, 1.0) = {ma}");
        }
    }

    #[test]
    fn test_adjustment_matches_formula() {
        let params = MaturityParams::default();
        let slope = maturity_slope(0.1, &params).unwrap();
        let expected = (1.0 + (1.0 - 2.5) * slope) / (1.0 - 1.5 * slope);
        assert_eq!(maturity_adjustment(0.1, 1.0, &params).unwrap(), expected);

        let slope2 = maturity_slope(0.2, &params).unwrap();
        let expected2 = (1.0 + (1.0 - 2.5) * slope2) / (1.0 - 1.5 * slope2);
        assert_eq!(maturity_adjustment(0.2, 1.0, &params).unwrap(), expected2);
    }

    #[test]
    fn test_adjustment_increases_with_maturity() {
        let params = MaturityParams::default();
        let ma_1 = maturity_adjustment(0.01, 1.0, &params).unwrap();
        let ma_3 = maturity_adjustment(0.01, 3.0, &params).unwrap();
        let ma_5 = maturity_adjustment(0.01, 5.0, &params).unwrap();
        assert!(ma_1 < ma_3);
        assert!(ma_3 < ma_5);
    }

    #[test]
    fn test_adjustment_slice_matches_scalar() {
        let params = MaturityParams::default();
        let mas = maturity_adjustment_slice(&[0.1, 0.2], &[1.0, 1.0], &params).unwrap();
        assert_eq!(mas[0], maturity_adjustment(0.1, 1.0, &params).unwrap());
        assert_eq!(mas[1], maturity_adjustment(0.2, 1.0, &params).unwrap());
    }

    #[test]
    fn test_adjustment_slice_shape_mismatch() {
        let params = MaturityParams::default();
        let err = maturity_adjustment_slice(&[0.1, 0.2], &[1.0], &params).unwrap_err();
        match err {
            IrbError::ShapeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_adjustment_degenerate_denominator() {
        // With a constant slope of 2/3 the denominator 1 - 1.5 * b(pd) is
        // exactly zero for every PD.
        let params = MaturityParams {
            a: (2.0_f64 / 3.0).sqrt(),
            b: 0.0,
            reference_maturity: 2.5,
        };
        let err = maturity_adjustment(0.1, 3.0, &params).unwrap_err();
        match err {
            IrbError::NumericInstability { value, .. } => {
                assert!(value.abs() < 1e-12);
            }
            other => panic!("expected NumericInstability, got {other:?}"),
        }
    }
}
