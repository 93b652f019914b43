use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use gacha_core::derive_hash_hex;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

pub type BearerHeader = TypedHeader<Authorization<Bearer>>;

/// Resolve the calling user from a bearer token. Tokens are stored as SHA-256 hex.
pub async fn require_user(db: &SqlitePool, bearer: Option<BearerHeader>) -> AppResult<i64> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;
    let token_hash = derive_hash_hex(bearer.token().as_bytes());
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE api_token_hash = ?")
        .bind(token_hash)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub fn require_admin(api_key: &str, bearer: Option<BearerHeader>) -> AppResult<()> {
    match bearer {
        Some(TypedHeader(Authorization(bearer))) if bearer.token() == api_key => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}
