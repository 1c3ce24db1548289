use serde::Deserialize;

use crate::input::file::resolve_path;

/// One exposure row of a portfolio CSV. Expected columns: `PD` and `M`
/// always; `EAD` and `LGD` when present override the command-line scalar
/// fallbacks. Extra columns (e.g. a precomputed reference `K`) are ignored.
#[derive(Debug, Deserialize)]
struct PortfolioRow {
    #[serde(rename = "PD")]
    pd: f64,
    #[serde(rename = "M")]
    maturity: f64,
    #[serde(rename = "EAD", default)]
    ead: Option<f64>,
    #[serde(rename = "LGD", default)]
    lgd: Option<f64>,
}

/// Parallel per-obligor arrays parsed from a portfolio CSV.
///
/// This is pure parsing: domain validation (PD in [0,1], EAD > 0, ...) is the
/// engine's job.
#[derive(Debug, Clone)]
pub struct PortfolioData {
    pub pd: Vec<f64>,
    pub maturity: Vec<f64>,
    pub ead: Vec<f64>,
    pub lgd: Vec<f64>,
}

/// Load a portfolio CSV into parallel arrays, filling missing `EAD` / `LGD`
/// cells from the given scalar defaults.
pub fn load_portfolio(
    path: &str,
    default_ead: f64,
    default_lgd: f64,
) -> Result<PortfolioData, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;

    let mut data = PortfolioData {
        pd: Vec::new(),
        maturity: Vec::new(),
        ead: Vec::new(),
        lgd: Vec::new(),
    };

    for (i, record) in reader.deserialize().enumerate() {
        let row: PortfolioRow = record
            .map_err(|e| format!("Failed to parse row {} of '{}': {}", i + 1, path, e))?;
        data.pd.push(row.pd);
        data.maturity.push(row.maturity);
        data.ead.push(row.ead.unwrap_or(default_ead));
        data.lgd.push(row.lgd.unwrap_or(default_lgd));
    }

    if data.pd.is_empty() {
        return Err(format!("Portfolio '{}' contains no exposures", path).into());
    }

    Ok(data)
}
