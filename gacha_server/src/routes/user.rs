use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use gacha_shared::{
    BalanceResponse, DemoCreditResponse, DepositAddressResponse, RedeemCodeRequest,
    RedeemCodeResponse, SuccessResponse, WithdrawRequest,
};
use tracing::info;

use crate::{
    auth::{require_user, BearerHeader},
    db::{self, NewTransaction},
    error::{AppError, AppResult},
    AppState,
};

pub async fn route_balance(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
) -> AppResult<Json<BalanceResponse>> {
    let user_id = require_user(&state.db, bearer).await?;
    let balance = db::user_balance(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("Balance not found"))?;
    Ok(Json(BalanceResponse {
        balance: if balance.is_finite() { balance } else { 0.0 },
    }))
}

pub async fn route_deposit_address(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
) -> AppResult<Json<DepositAddressResponse>> {
    let user_id = require_user(&state.db, bearer).await?;
    let address = sqlx::query_scalar::<_, String>("SELECT deposit_address FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .filter(|a| !a.trim().is_empty())
        .ok_or(AppError::NotFound("Address not found"))?;
    Ok(Json(DepositAddressResponse {
        deposit_address: address,
    }))
}

pub async fn route_demo_credit(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
) -> AppResult<Json<DemoCreditResponse>> {
    if !state.config.demo_mode {
        return Err(AppError::Forbidden("Demo mode is disabled"));
    }
    let user_id = require_user(&state.db, bearer).await?;
    let added = state.config.demo_credit_amount;

    let mut tx = state.db.begin().await?;
    if !db::credit_balance(&mut *tx, user_id, added).await? {
        return Err(AppError::NotFound("Profile not found"));
    }
    db::insert_transaction(
        &mut *tx,
        &NewTransaction {
            user_id,
            kind: db::TX_DEMO_CREDIT,
            amount: added,
            status: db::STATUS_CONFIRMED,
            wallet_address: None,
            gacha_history_id: None,
        },
    )
    .await?;
    let balance = db::user_balance(&mut *tx, user_id).await?.unwrap_or_default();
    tx.commit().await?;

    info!(user_id, added, "demo credit granted");
    Ok(Json(DemoCreditResponse { balance, added }))
}

pub async fn route_redeem_code(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
    Json(req): Json<RedeemCodeRequest>,
) -> AppResult<Json<RedeemCodeResponse>> {
    let user_id = require_user(&state.db, bearer).await?;
    let code = req
        .code
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or(AppError::BadRequest("Campaign code is required"))?;

    let mut tx = state.db.begin().await?;
    let campaign = db::find_code(&mut *tx, &code)
        .await?
        .ok_or(AppError::NotFound("Code not found"))?;

    if !campaign.is_active {
        return Err(AppError::BadRequest("Code is inactive"));
    }
    if campaign.is_expired(Utc::now()) {
        return Err(AppError::BadRequest("Code expired"));
    }
    if campaign.current_uses >= campaign.max_uses {
        return Err(AppError::BadRequest("Code has reached max uses"));
    }

    let already_redeemed = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM code_redemptions WHERE user_id = ? AND code_id = ?",
    )
    .bind(user_id)
    .bind(campaign.id)
    .fetch_optional(&mut *tx)
    .await?;
    if already_redeemed.is_some() {
        return Err(AppError::BadRequest("Code already redeemed"));
    }

    sqlx::query("INSERT INTO code_redemptions (code_id, user_id, redeemed_at) VALUES (?, ?, ?)")
        .bind(campaign.id)
        .bind(user_id)
        .bind(db::now_rfc3339())
        .execute(&mut *tx)
        .await?;
    let claimed = sqlx::query(
        "UPDATE campaign_codes SET current_uses = current_uses + 1 WHERE id = ? AND current_uses < max_uses",
    )
    .bind(campaign.id)
    .execute(&mut *tx)
    .await?;
    if claimed.rows_affected() != 1 {
        return Err(AppError::BadRequest("Code has reached max uses"));
    }
    if !db::credit_balance(&mut *tx, user_id, campaign.plays_granted as f64).await? {
        return Err(AppError::BadRequest("User profile missing"));
    }
    let balance = db::user_balance(&mut *tx, user_id).await?.unwrap_or_default();
    tx.commit().await?;

    info!(user_id, code = %code, plays = campaign.plays_granted, "campaign code redeemed");
    Ok(Json(RedeemCodeResponse {
        success: true,
        balance,
        plays_granted: campaign.plays_granted,
    }))
}

pub async fn route_withdraw(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
    Json(req): Json<WithdrawRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = require_user(&state.db, bearer).await?;
    let wallet_address = req
        .wallet_address
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty());
    let (wallet_address, play_id) = match (wallet_address, req.play_id) {
        (Some(w), Some(id)) => (w, id),
        _ => return Err(AppError::BadRequest("walletAddress and playId are required")),
    };

    let play = db::find_history(&state.db, play_id)
        .await?
        .ok_or(AppError::NotFound("Play not found"))?;
    if play.user_id != user_id {
        return Err(AppError::Forbidden("Forbidden"));
    }
    if !play.final_result || play.prize_amount <= 0.0 {
        return Err(AppError::BadRequest("This play is not eligible for withdrawal"));
    }

    let mut tx = state.db.begin().await?;
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM transactions WHERE gacha_history_id = ? AND type = ?",
    )
    .bind(play_id)
    .bind(db::TX_WITHDRAWAL)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Withdrawal already requested"));
    }

    let inserted = db::insert_transaction(
        &mut *tx,
        &NewTransaction {
            user_id,
            kind: db::TX_WITHDRAWAL,
            amount: play.prize_amount,
            status: db::STATUS_PENDING,
            wallet_address: Some(wallet_address),
            gacha_history_id: Some(play_id),
        },
    )
    .await;
    match inserted {
        Ok(_) => {}
        // a concurrent request got there first
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::BadRequest("Withdrawal already requested"));
        }
        Err(e) => return Err(e.into()),
    }
    tx.commit().await?;

    info!(user_id, play_id, amount = play.prize_amount, "withdrawal requested");
    Ok(Json(SuccessResponse { success: true }))
}
