use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::model::{AnalysisSet, StockError, StockResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnalysis {
    Multi {
        results: Vec<StockResult>,
        #[serde(default)]
        errors: Vec<StockError>,
    },
    List(Vec<StockResult>),
    Single(StockResult),
}

pub fn parse_analysis_set(raw: &str) -> Result<AnalysisSet> {
    let parsed: RawAnalysis =
        serde_json::from_str(raw).context("unexpected JSON shape for analysis results")?;

    let set = match parsed {
        RawAnalysis::Multi { results, errors } => AnalysisSet { results, errors },
        RawAnalysis::List(results) => AnalysisSet {
            results,
            errors: Vec::new(),
        },
        RawAnalysis::Single(result) => AnalysisSet {
            results: vec![result],
            errors: Vec::new(),
        },
    };

    if set.results.is_empty() && set.errors.is_empty() {
        return Err(anyhow!("analysis results contain no tickers"));
    }

    Ok(set)
}

pub fn load_analysis_set(path: &Path) -> Result<AnalysisSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read analysis results {}", path.display()))?;
    parse_analysis_set(&raw)
        .with_context(|| format!("failed to parse analysis results {}", path.display()))
}
