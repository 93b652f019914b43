use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::ConfigurationError;

pub const DEFAULT_WEIGHT: u64 = 1;
/// Upper bound on a single pattern's weight, so per-currency totals stay far
/// from `u64::MAX`.
pub const MAX_WEIGHT: u64 = u32::MAX as u64;

/// Display attributes of a pattern's reel video. Not used for selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisualDescriptor {
    pub machine_color: String,
    pub effect_1: String,
    pub effect_2: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub id: i64,
    pub currency: Currency,
    #[serde(flatten)]
    pub visual: VisualDescriptor,
    pub base_result: bool,
    #[serde(default)]
    pub weight: Option<i64>,
    pub prize_amount: f64,
    pub video_url: String,
}

impl Pattern {
    /// Sampling weight; absent or non-positive weights count as 1, and
    /// anything above `MAX_WEIGHT` is capped.
    pub fn effective_weight(&self) -> u64 {
        match self.weight {
            Some(w) if w > 0 => (w as u64).min(MAX_WEIGHT),
            _ => DEFAULT_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// RTP downgrades for this currency fall back to the original pattern.
    NoLosingPattern(Currency),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog(pub Vec<Pattern>);

impl Catalog {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self(patterns)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn for_currency(&self, currency: Currency) -> Vec<Pattern> {
        self.0
            .iter()
            .filter(|p| p.currency == currency)
            .cloned()
            .collect()
    }

    pub fn losing(&self, currency: Currency) -> Vec<Pattern> {
        self.0
            .iter()
            .filter(|p| p.currency == currency && !p.base_result)
            .cloned()
            .collect()
    }

    /// Checks that every currency can be drawn and can produce a win.
    /// Missing losing patterns are tolerated and reported as warnings.
    pub fn validate(&self) -> Result<Vec<CatalogWarning>, ConfigurationError> {
        if self.0.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }
        let mut warnings = Vec::new();
        for currency in Currency::ALL {
            let patterns: Vec<&Pattern> =
                self.0.iter().filter(|p| p.currency == currency).collect();
            if patterns.is_empty() {
                return Err(ConfigurationError::MissingCurrency(currency));
            }
            if !patterns.iter().any(|p| p.base_result) {
                return Err(ConfigurationError::NoWinningPattern(currency));
            }
            if !patterns.iter().any(|p| !p.base_result) {
                warnings.push(CatalogWarning::NoLosingPattern(currency));
            }
        }
        Ok(warnings)
    }
}

impl From<Vec<Pattern>> for Catalog {
    fn from(patterns: Vec<Pattern>) -> Self {
        Self(patterns)
    }
}
