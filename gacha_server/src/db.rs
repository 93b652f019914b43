use chrono::{DateTime, Utc};
use gacha_core::{Catalog, ConfigurationError, Pattern, VisualDescriptor};
use sqlx::{SqliteExecutor, SqlitePool};

pub const SETTING_CURRENT_RTP: &str = "current_rtp";
pub const SETTING_JACKPOT_POOL: &str = "jackpot_pool";

pub const TX_PLAY: &str = "PLAY";
pub const TX_WIN: &str = "WIN";
pub const TX_WITHDRAWAL: &str = "WITHDRAWAL";
pub const TX_DEMO_CREDIT: &str = "DEMO_CREDIT";

pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_PENDING: &str = "PENDING";

pub async fn init_db(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, sqlx::FromRow)]
pub struct PatternRow {
    pub id: i64,
    pub currency: String,
    pub machine_color: String,
    pub effect_1: String,
    pub effect_2: String,
    pub base_result: bool,
    pub weight: Option<i64>,
    pub prize_amount: f64,
    pub video_url: String,
}

impl TryFrom<PatternRow> for Pattern {
    type Error = ConfigurationError;

    fn try_from(row: PatternRow) -> Result<Self, Self::Error> {
        Ok(Pattern {
            id: row.id,
            currency: row.currency.parse()?,
            visual: VisualDescriptor {
                machine_color: row.machine_color,
                effect_1: row.effect_1,
                effect_2: row.effect_2,
            },
            base_result: row.base_result,
            weight: row.weight,
            prize_amount: row.prize_amount,
            video_url: row.video_url,
        })
    }
}

/// Active patterns, ordered by id so weighted draws walk a stable order.
pub async fn load_catalog<'e>(ex: impl SqliteExecutor<'e>) -> anyhow::Result<Catalog> {
    let rows = sqlx::query_as::<_, PatternRow>(
        "SELECT id, currency, machine_color, effect_1, effect_2, base_result, weight, prize_amount, video_url FROM gacha_patterns WHERE retired = 0 ORDER BY id",
    )
    .fetch_all(ex)
    .await?;
    let patterns = rows
        .into_iter()
        .map(Pattern::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Catalog::new(patterns))
}

/// Swap the active catalog for `catalog` in one transaction. Patterns referenced
/// by history cannot be deleted, so everything is retired first and the new
/// rows are upserted as active.
pub async fn replace_catalog(db: &SqlitePool, catalog: &Catalog) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;
    sqlx::query("UPDATE gacha_patterns SET retired = 1")
        .execute(&mut *tx)
        .await?;
    for p in catalog.patterns() {
        sqlx::query(
            "INSERT INTO gacha_patterns (id, currency, machine_color, effect_1, effect_2, base_result, weight, prize_amount, video_url, retired) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0) \
             ON CONFLICT(id) DO UPDATE SET currency = excluded.currency, machine_color = excluded.machine_color, \
             effect_1 = excluded.effect_1, effect_2 = excluded.effect_2, base_result = excluded.base_result, \
             weight = excluded.weight, prize_amount = excluded.prize_amount, video_url = excluded.video_url, retired = 0",
        )
        .bind(p.id)
        .bind(p.currency.as_str())
        .bind(&p.visual.machine_color)
        .bind(&p.visual.effect_1)
        .bind(&p.visual.effect_2)
        .bind(p.base_result)
        .bind(p.weight)
        .bind(p.prize_amount)
        .bind(&p.video_url)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

pub async fn get_setting<'e>(ex: impl SqliteExecutor<'e>, key: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT value FROM system_settings WHERE key = ?")
        .bind(key)
        .fetch_optional(ex)
        .await
}

pub async fn set_setting<'e>(ex: impl SqliteExecutor<'e>, key: &str, value: &str) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO system_settings (key, value, updated_at) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(now_rfc3339())
    .execute(ex)
    .await?;
    Ok(())
}

pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub async fn current_rtp<'e>(ex: impl SqliteExecutor<'e>, default_rtp: f64) -> sqlx::Result<f64> {
    let value = get_setting(ex, SETTING_CURRENT_RTP).await?;
    Ok(parse_number(value.as_deref()).unwrap_or(default_rtp))
}

pub async fn jackpot_pool<'e>(ex: impl SqliteExecutor<'e>) -> sqlx::Result<f64> {
    let value = get_setting(ex, SETTING_JACKPOT_POOL).await?;
    Ok(parse_number(value.as_deref()).unwrap_or(0.0))
}

pub async fn user_balance<'e>(ex: impl SqliteExecutor<'e>, user_id: i64) -> sqlx::Result<Option<f64>> {
    sqlx::query_scalar::<_, f64>("SELECT balance FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(ex)
        .await
}

/// Take `amount` from the balance only if it covers it. Returns false otherwise.
pub async fn debit_balance<'e>(ex: impl SqliteExecutor<'e>, user_id: i64, amount: f64) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE users SET balance = balance - ? WHERE id = ? AND balance >= ?")
        .bind(amount)
        .bind(user_id)
        .bind(amount)
        .execute(ex)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn credit_balance<'e>(ex: impl SqliteExecutor<'e>, user_id: i64, amount: f64) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE users SET balance = balance + ? WHERE id = ?")
        .bind(amount)
        .bind(user_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub struct NewTransaction<'a> {
    pub user_id: i64,
    pub kind: &'a str,
    pub amount: f64,
    pub status: &'a str,
    pub wallet_address: Option<&'a str>,
    pub gacha_history_id: Option<i64>,
}

pub async fn insert_transaction<'e>(ex: impl SqliteExecutor<'e>, tx: &NewTransaction<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(
        "INSERT INTO transactions (user_id, type, amount, status, wallet_address, gacha_history_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(tx.user_id)
    .bind(tx.kind)
    .bind(tx.amount)
    .bind(tx.status)
    .bind(tx.wallet_address)
    .bind(tx.gacha_history_id)
    .bind(now_rfc3339())
    .execute(ex)
    .await?;
    Ok(res.last_insert_rowid())
}

pub struct NewPlay {
    pub user_id: i64,
    pub pattern_id: i64,
    pub final_result: bool,
    pub rtp_at_play: i64,
    pub prize_amount: f64,
}

pub async fn insert_history<'e>(ex: impl SqliteExecutor<'e>, play: &NewPlay) -> sqlx::Result<i64> {
    let res = sqlx::query(
        "INSERT INTO gacha_history (user_id, pattern_id, final_result, rtp_at_play, prize_amount, played_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(play.user_id)
    .bind(play.pattern_id)
    .bind(play.final_result)
    .bind(play.rtp_at_play)
    .bind(play.prize_amount)
    .bind(now_rfc3339())
    .execute(ex)
    .await?;
    Ok(res.last_insert_rowid())
}

#[derive(Debug, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub user_id: i64,
    pub pattern_id: i64,
    pub final_result: bool,
    pub rtp_at_play: i64,
    pub prize_amount: f64,
    pub played_at: String,
    pub currency: String,
    pub machine_color: String,
    pub effect_1: String,
    pub effect_2: String,
    pub video_url: String,
}

impl HistoryRow {
    pub fn played_at(&self) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&self.played_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default()
    }
}

pub async fn find_history<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> sqlx::Result<Option<HistoryRow>> {
    sqlx::query_as::<_, HistoryRow>(
        "SELECT h.id, h.user_id, h.pattern_id, h.final_result, h.rtp_at_play, h.prize_amount, h.played_at, \
         p.currency, p.machine_color, p.effect_1, p.effect_2, p.video_url \
         FROM gacha_history h JOIN gacha_patterns p ON p.id = h.pattern_id WHERE h.id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub struct CampaignCode {
    pub id: i64,
    pub plays_granted: i64,
    pub max_uses: i64,
    pub current_uses: i64,
    pub expires_at: Option<String>,
    pub is_active: bool,
}

impl CampaignCode {
    /// Expired when the deadline has passed or cannot be read.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.expires_at {
            None => false,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(t) => t.with_timezone(&Utc) < now,
                Err(_) => true,
            },
        }
    }
}

pub async fn find_code<'e>(ex: impl SqliteExecutor<'e>, code: &str) -> sqlx::Result<Option<CampaignCode>> {
    sqlx::query_as::<_, CampaignCode>(
        "SELECT id, plays_granted, max_uses, current_uses, expires_at, is_active FROM campaign_codes WHERE code = ?",
    )
    .bind(code)
    .fetch_optional(ex)
    .await
}
