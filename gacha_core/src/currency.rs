use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    BTC,
    ETH,
    XRP,
    TRX,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::BTC, Currency::ETH, Currency::XRP, Currency::TRX];

    pub fn as_str(self) -> &'static str {
        match self {
            Currency::BTC => "BTC",
            Currency::ETH => "ETH",
            Currency::XRP => "XRP",
            Currency::TRX => "TRX",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Currency::BTC),
            "ETH" => Ok(Currency::ETH),
            "XRP" => Ok(Currency::XRP),
            "TRX" => Ok(Currency::TRX),
            _ => Err(ConfigurationError::UnknownCurrency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyWeight {
    pub currency: Currency,
    pub weight: u64,
}

/// Relative odds of each prize currency, in enumeration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyTable(pub Vec<CurrencyWeight>);

impl CurrencyTable {
    pub fn standard() -> Self {
        Self(vec![
            CurrencyWeight {
                currency: Currency::BTC,
                weight: 2,
            },
            CurrencyWeight {
                currency: Currency::ETH,
                weight: 20,
            },
            CurrencyWeight {
                currency: Currency::XRP,
                weight: 30,
            },
            CurrencyWeight {
                currency: Currency::TRX,
                weight: 48,
            },
        ])
    }

    pub fn total_weight(&self) -> u64 {
        self.0.iter().map(|e| e.weight).sum()
    }

    /// Probability of drawing `currency`, 0.0 when it is not in the table.
    pub fn probability(&self, currency: Currency) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            return 0.0;
        }
        let weight: u64 = self
            .0
            .iter()
            .filter(|e| e.currency == currency)
            .map(|e| e.weight)
            .sum();
        weight as f64 / total as f64
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::standard()
    }
}
