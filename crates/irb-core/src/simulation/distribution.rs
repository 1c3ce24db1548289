use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::IrbError;
use crate::types::{with_metadata, ComputationOutput};
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for loss-distribution analysis: the raw scenario-loss sequence from
/// the simulator plus a tail confidence level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossDistributionInput {
    pub losses: Vec<f64>,
    /// Confidence level for VaR / expected shortfall, e.g. 0.999
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

fn default_confidence_level() -> f64 {
    0.999
}

/// Percentile summary of the loss distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossPercentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// A single histogram bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Descriptive statistics over a simulated loss distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossDistributionOutput {
    pub num_scenarios: u32,
    /// Mean scenario loss (the portfolio expected loss estimate)
    pub expected_loss: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: LossPercentiles,
    /// Loss quantile at the confidence level
    pub value_at_risk: f64,
    /// Mean loss beyond VaR
    pub expected_shortfall: f64,
    /// VaR minus expected loss
    pub economic_capital: f64,
    pub histogram: Vec<HistogramBin>,
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Percentile from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Equal-width histogram over a **sorted** slice.
fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];

    // Degenerate distribution collapses to one bin
    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            lower: min_val + i as f64 * bin_width,
            upper: if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            },
            count: 0,
            frequency: 0.0,
        })
        .collect();

    for &val in sorted {
        let mut idx = ((val - min_val) / bin_width).floor() as usize;
        if idx >= num_bins {
            idx = num_bins - 1;
        }
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarize a scenario-loss sequence: moments, percentiles, tail measures,
/// and a 20-bin histogram for downstream rendering.
pub fn analyze_loss_distribution(
    input: &LossDistributionInput,
) -> IrbResult<ComputationOutput<LossDistributionOutput>> {
    let start = Instant::now();

    if input.losses.is_empty() {
        return Err(IrbError::InsufficientData(
            "at least one scenario loss is required".into(),
        ));
    }
    if input.confidence_level <= 0.0 || input.confidence_level >= 1.0 {
        return Err(IrbError::InvalidInput {
            field: "confidence_level".into(),
            reason: format!("must be in (0, 1), got {}", input.confidence_level),
        });
    }
    if let Some(&bad) = input.losses.iter().find(|l| !l.is_finite()) {
        return Err(IrbError::NumericInstability {
            context: "scenario loss sequence".into(),
            value: bad,
        });
    }

    let mut sorted = input.losses.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len() as f64;

    let expected_loss = sorted.iter().sum::<f64>() / n;
    let variance = sorted
        .iter()
        .map(|l| (l - expected_loss).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let value_at_risk = percentile_sorted(&sorted, input.confidence_level * 100.0);
    let tail: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&l| l >= value_at_risk)
        .collect();
    let expected_shortfall = if tail.is_empty() {
        value_at_risk
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };

    let percentiles = LossPercentiles {
        p5: percentile_sorted(&sorted, 5.0),
        p25: percentile_sorted(&sorted, 25.0),
        p50: percentile_sorted(&sorted, 50.0),
        p75: percentile_sorted(&sorted, 75.0),
        p90: percentile_sorted(&sorted, 90.0),
        p95: percentile_sorted(&sorted, 95.0),
        p99: percentile_sorted(&sorted, 99.0),
    };

    let output = LossDistributionOutput {
        num_scenarios: sorted.len() as u32,
        expected_loss,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentiles,
        value_at_risk,
        expected_shortfall,
        economic_capital: value_at_risk - expected_loss,
        histogram: build_histogram(&sorted, 20),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Empirical loss distribution analysis",
        &serde_json::json!({
            "num_scenarios": input.losses.len(),
            "confidence_level": input.confidence_level,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input_from(losses: Vec<f64>) -> LossDistributionInput {
        LossDistributionInput {
            losses,
            confidence_level: 0.999,
        }
    }

    #[test]
    fn test_mean_and_extremes() {
        let result = analyze_loss_distribution(&input_from(vec![0.0, 10.0, 20.0])).unwrap();
        let out = &result.result;
        assert_eq!(out.expected_loss, 10.0);
        assert_eq!(out.min, 0.0);
        assert_eq!(out.max, 20.0);
        assert_eq!(out.num_scenarios, 3);
    }

    #[test]
    fn test_percentiles_ordered() {
        let losses: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        let p = &result.result.percentiles;
        assert!(p.p5 <= p.p25);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!(p.p90 <= p.p95);
        assert!(p.p95 <= p.p99);
    }

    #[test]
    fn test_var_dominates_median() {
        let losses: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        assert!(result.result.value_at_risk >= result.result.percentiles.p50);
    }

    #[test]
    fn test_expected_shortfall_at_least_var() {
        let losses: Vec<f64> = (0..1000).map(|i| (i as f64).powi(2)).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        assert!(result.result.expected_shortfall >= result.result.value_at_risk);
    }

    #[test]
    fn test_economic_capital_is_var_minus_el() {
        let losses: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        let out = &result.result;
        assert!((out.economic_capital - (out.value_at_risk - out.expected_loss)).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_counts_sum_to_scenarios() {
        let losses: Vec<f64> = (0..1000).map(|i| (i % 37) as f64).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        let total: u32 = result.result.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn test_histogram_frequency_sums_to_one() {
        let losses: Vec<f64> = (0..1000).map(|i| (i % 37) as f64).collect();
        let result = analyze_loss_distribution(&input_from(losses)).unwrap();
        let total_freq: f64 = result.result.histogram.iter().map(|b| b.frequency).sum();
        assert!((total_freq - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_distribution_single_bin() {
        let result = analyze_loss_distribution(&input_from(vec![5.0; 200])).unwrap();
        assert_eq!(result.result.histogram.len(), 1);
        assert_eq!(result.result.std_dev, 0.0);
        assert_eq!(result.result.value_at_risk, 5.0);
    }

    #[test]
    fn test_empty_losses_error() {
        assert!(analyze_loss_distribution(&input_from(vec![])).is_err());
    }

    #[test]
    fn test_confidence_level_validation() {
        let mut input = input_from(vec![1.0, 2.0]);
        input.confidence_level = 1.0;
        assert!(analyze_loss_distribution(&input).is_err());
        input.confidence_level = 0.0;
        assert!(analyze_loss_distribution(&input).is_err());
    }

    #[test]
    fn test_non_finite_loss_rejected() {
        let result = analyze_loss_distribution(&input_from(vec![1.0, f64::NAN, 2.0]));
        match result.unwrap_err() {
            IrbError::NumericInstability { context, .. } => {
                assert!(context.contains("loss"));
            }
            other => panic!("expected NumericInstability, got {other:?}"),
        }
    }
}
