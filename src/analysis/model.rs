use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StockResult {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub m_score: Option<f64>,
    #[serde(default)]
    pub z_score: Option<f64>,
    #[serde(default)]
    pub accruals_ratio: Option<f64>,
    #[serde(default)]
    pub composite_fraud_risk_score: Option<f64>,
}

impl StockResult {
    pub fn risk_score(&self) -> Option<f32> {
        self.composite_fraud_risk_score
            .filter(|score| score.is_finite())
            .map(|score| score as f32)
    }

    pub fn metrics_summary(&self) -> String {
        let metric = |value: Option<f64>| match value.filter(|value| value.is_finite()) {
            Some(value) => format!("{value:.2}"),
            None => "-".to_owned(),
        };
        format!(
            "M-score {}  |  Z-score {}  |  accruals {}",
            metric(self.m_score),
            metric(self.z_score),
            metric(self.accruals_ratio)
        )
    }

    pub fn label(&self) -> String {
        match self.company_name.as_deref().filter(|name| !name.trim().is_empty()) {
            Some(name) => format!("{} ({name})", self.ticker),
            None => self.ticker.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StockError {
    pub ticker: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisSet {
    pub results: Vec<StockResult>,
    pub errors: Vec<StockError>,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl AnalysisSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StockResult> {
        self.results.get(index)
    }

    /// Index of the result whose ticker or company name best matches `query`.
    /// An exact ticker match always wins.
    pub fn best_match(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(index) = self
            .results
            .iter()
            .position(|result| result.ticker.eq_ignore_ascii_case(query))
        {
            return Some(index);
        }

        let matcher = SkimMatcherV2::default();
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| {
                let ticker = fuzzy_match_score(&matcher, &result.ticker, query);
                let company = result
                    .company_name
                    .as_deref()
                    .and_then(|name| fuzzy_match_score(&matcher, name, query));
                ticker.max(company).map(|score| (index, score))
            })
            .max_by(|(a_index, a_score), (b_index, b_score)| {
                a_score.cmp(b_score).then_with(|| b_index.cmp(a_index))
            })
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(ticker: &str, company: Option<&str>, score: Option<f64>) -> StockResult {
        StockResult {
            ticker: ticker.to_owned(),
            company_name: company.map(str::to_owned),
            m_score: None,
            z_score: None,
            accruals_ratio: None,
            composite_fraud_risk_score: score,
        }
    }

    fn sample() -> AnalysisSet {
        AnalysisSet {
            results: vec![
                result("NVDA", Some("NVIDIA Corp"), Some(18.0)),
                result("AAPL", Some("Apple Inc."), Some(31.5)),
                result("DE", Some("Deere & Company"), None),
            ],
            errors: Vec::new(),
        }
    }

    #[test]
    fn missing_or_non_finite_score_is_unknown() {
        assert_eq!(result("X", None, None).risk_score(), None);
        assert_eq!(result("X", None, Some(f64::NAN)).risk_score(), None);
        assert_eq!(result("X", None, Some(72.5)).risk_score(), Some(72.5));
    }

    #[test]
    fn label_includes_company_when_present() {
        assert_eq!(result("DE", Some("Deere & Company"), None).label(), "DE (Deere & Company)");
        assert_eq!(result("DE", Some("  "), None).label(), "DE");
    }

    #[test]
    fn metrics_summary_marks_missing_values() {
        let mut stock = result("NVDA", None, Some(10.0));
        stock.m_score = Some(-2.456);
        stock.z_score = Some(f64::INFINITY);
        assert_eq!(
            stock.metrics_summary(),
            "M-score -2.46  |  Z-score -  |  accruals -"
        );
    }

    #[test]
    fn exact_ticker_beats_fuzzy_matches() {
        let set = sample();
        assert_eq!(set.best_match("de"), Some(2));
        assert_eq!(set.best_match("aapl"), Some(1));
    }

    #[test]
    fn company_names_are_searchable() {
        let set = sample();
        assert_eq!(set.best_match("nvidia"), Some(0));
        assert_eq!(set.best_match("deere"), Some(2));
        assert_eq!(set.best_match("   "), None);
        assert_eq!(set.best_match("zzzz"), None);
    }
}
