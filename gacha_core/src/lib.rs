pub mod currency;
pub mod demo;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod rng;
pub mod weighted;

pub use crate::currency::{Currency, CurrencyTable, CurrencyWeight};
pub use crate::demo::demo_catalog;
pub use crate::engine::{
    apply_rtp, normalize_rtp, resolve_draw, select_currency, select_currency_from, select_pattern,
    simulate, CurrencyStats, DrawOutcome, SimulationReport, PLAY_COST,
};
pub use crate::error::ConfigurationError;
pub use crate::pattern::{Catalog, CatalogWarning, Pattern, VisualDescriptor};
pub use crate::rng::{derive_hash_hex, RandomSource, SecureRng, SeededRng};
pub use crate::weighted::pick_weighted;
