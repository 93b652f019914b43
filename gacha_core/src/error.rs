use crate::currency::Currency;

/// Catalog problems that make a draw impossible.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no gacha patterns available")]
    EmptyCatalog,
    #[error("currency {0} has no patterns")]
    MissingCurrency(Currency),
    #[error("currency {0} has no winning pattern")]
    NoWinningPattern(Currency),
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}
