use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    currency::{Currency, CurrencyTable},
    error::ConfigurationError,
    pattern::{Catalog, Pattern},
    rng::RandomSource,
    weighted::pick_weighted,
};

pub const PLAY_COST: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawOutcome {
    pub pattern: Pattern,
    pub final_result: bool,
}

impl DrawOutcome {
    /// Prize owed for this draw. A loss pays nothing, whatever the pattern says.
    pub fn payout(&self) -> f64 {
        if self.final_result {
            self.pattern.prize_amount.max(0.0)
        } else {
            0.0
        }
    }
}

/// Clamp an operator-supplied RTP into `[0, 100]`. NaN counts as 0.
pub fn normalize_rtp(target_rtp_percent: f64) -> f64 {
    if target_rtp_percent.is_nan() {
        return 0.0;
    }
    target_rtp_percent.clamp(0.0, 100.0)
}

pub fn select_currency<R: RandomSource + ?Sized>(rng: &mut R) -> Currency {
    select_currency_from(&CurrencyTable::standard(), rng)
}

pub fn select_currency_from<R: RandomSource + ?Sized>(table: &CurrencyTable, rng: &mut R) -> Currency {
    match pick_weighted(&table.0, |e| e.weight, rng) {
        Some(entry) => entry.currency,
        // only reachable with an all-zero table
        None => table.0.last().map(|e| e.currency).unwrap_or(Currency::TRX),
    }
}

/// Pick the currency, then a pattern of that currency by weight. Win and lose
/// patterns compete together at this stage.
pub fn select_pattern<R: RandomSource + ?Sized>(
    catalog: &[Pattern],
    rng: &mut R,
) -> Result<Pattern, ConfigurationError> {
    if catalog.is_empty() {
        return Err(ConfigurationError::EmptyCatalog);
    }
    let currency = select_currency(rng);
    let candidates: Vec<&Pattern> = catalog.iter().filter(|p| p.currency == currency).collect();

    if candidates.is_empty() {
        warn!(%currency, "no patterns for drawn currency, picking from whole catalog");
        let idx = rng.next_below(catalog.len() as u64) as usize;
        return Ok(catalog[idx].clone());
    }

    pick_weighted(&candidates, |p| p.effective_weight(), rng)
        .map(|p| (*p).clone())
        .ok_or(ConfigurationError::MissingCurrency(currency))
}

/// Decide whether an intrinsic win stands. With probability `target_rtp_percent`
/// the win is kept; otherwise a losing pattern of the same currency is drawn
/// by weight. Losses pass through untouched.
pub fn apply_rtp<R: RandomSource + ?Sized>(
    selected: &Pattern,
    currency_patterns: &[Pattern],
    target_rtp_percent: f64,
    rng: &mut R,
) -> DrawOutcome {
    if !selected.base_result {
        return DrawOutcome {
            pattern: selected.clone(),
            final_result: false,
        };
    }

    let rtp = normalize_rtp(target_rtp_percent);
    let roll = rng.next_below(100);
    if (roll as f64) < rtp {
        return DrawOutcome {
            pattern: selected.clone(),
            final_result: true,
        };
    }

    let losers: Vec<&Pattern> = currency_patterns
        .iter()
        .filter(|p| p.currency == selected.currency && !p.base_result)
        .collect();
    match pick_weighted(&losers, |p| p.effective_weight(), rng) {
        Some(loser) => DrawOutcome {
            pattern: (*loser).clone(),
            final_result: false,
        },
        None => {
            // TODO: product decision pending on whether this should pick a losing
            // pattern from another currency instead of reusing the winning reel.
            warn!(
                pattern_id = selected.id,
                currency = %selected.currency,
                "no losing pattern to downgrade to, reporting winning pattern as a loss"
            );
            DrawOutcome {
                pattern: selected.clone(),
                final_result: false,
            }
        }
    }
}

/// Full pull: pattern selection followed by the RTP adjustment within the
/// selected pattern's currency.
pub fn resolve_draw<R: RandomSource + ?Sized>(
    catalog: &[Pattern],
    target_rtp_percent: f64,
    rng: &mut R,
) -> Result<DrawOutcome, ConfigurationError> {
    let selected = select_pattern(catalog, rng)?;
    let currency_patterns: Vec<Pattern> = catalog
        .iter()
        .filter(|p| p.currency == selected.currency)
        .cloned()
        .collect();
    Ok(apply_rtp(&selected, &currency_patterns, target_rtp_percent, rng))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrencyStats {
    pub draws: u64,
    pub intrinsic_wins: u64,
    pub final_wins: u64,
    pub payout: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub draws: u64,
    pub rtp_target: f64,
    pub final_wins: u64,
    pub downgrades: u64,
    pub total_payout: f64,
    pub by_currency: BTreeMap<Currency, CurrencyStats>,
}

impl SimulationReport {
    /// Paid out per credit staked.
    pub fn realised_return(&self) -> f64 {
        if self.draws == 0 {
            0.0
        } else {
            self.total_payout / (self.draws as f64 * PLAY_COST)
        }
    }

    pub fn currency_frequency(&self, currency: Currency) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        self.by_currency
            .get(&currency)
            .map(|s| s.draws as f64 / self.draws as f64)
            .unwrap_or(0.0)
    }
}

/// Run `draws` pulls against `catalog` and tally the results.
pub fn simulate<R: RandomSource + ?Sized>(
    catalog: &Catalog,
    target_rtp_percent: f64,
    draws: u64,
    rng: &mut R,
) -> Result<SimulationReport, ConfigurationError> {
    if catalog.is_empty() {
        return Err(ConfigurationError::EmptyCatalog);
    }
    let mut report = SimulationReport {
        rtp_target: normalize_rtp(target_rtp_percent),
        ..Default::default()
    };
    for _ in 0..draws {
        let selected = select_pattern(catalog.patterns(), rng)?;
        let currency_patterns = catalog.for_currency(selected.currency);
        let outcome = apply_rtp(&selected, &currency_patterns, target_rtp_percent, rng);
        let payout = outcome.payout();

        report.draws += 1;
        report.total_payout += payout;
        if outcome.final_result {
            report.final_wins += 1;
        } else if selected.base_result {
            report.downgrades += 1;
        }
        let stats = report.by_currency.entry(selected.currency).or_default();
        stats.draws += 1;
        stats.payout += payout;
        if selected.base_result {
            stats.intrinsic_wins += 1;
        }
        if outcome.final_result {
            stats.final_wins += 1;
        }
    }
    Ok(report)
}
