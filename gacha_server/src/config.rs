use std::env;

pub const DEFAULT_DEMO_CREDIT: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind: String,
    /// Bearer token for admin routes.
    pub api_key: String,
    pub demo_mode: bool,
    pub demo_credit_amount: f64,
    /// Used when `current_rtp` is missing from settings or unparsable.
    pub default_rtp: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gacha.db?mode=rwc".to_string(),
            bind: "127.0.0.1:8080".to_string(),
            api_key: "dev-key".to_string(),
            demo_mode: false,
            demo_credit_amount: DEFAULT_DEMO_CREDIT,
            default_rtp: 90.0,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let demo_credit_amount = env::var("DEMO_CREDIT_AMOUNT")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_DEMO_CREDIT);
        let default_rtp = env::var("DEFAULT_RTP")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(defaults.default_rtp);
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind: env::var("BIND").unwrap_or(defaults.bind),
            api_key: env::var("API_KEY").unwrap_or(defaults.api_key),
            demo_mode: env::var("ENABLE_DEMO_MODE")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            demo_credit_amount,
            default_rtp,
        }
    }
}
