use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use gacha_core::{demo_catalog, normalize_rtp, resolve_draw, SecureRng, PLAY_COST};
use gacha_shared::{DemoPlayResponse, JackpotResponse, PlayResponse, PlayResult, ResultResponse};
use tracing::{error, info};

use super::{history_pattern_view, pattern_view};
use crate::{
    auth::{require_user, BearerHeader},
    db::{self, NewPlay, NewTransaction},
    error::{AppError, AppResult},
    AppState,
};

pub const DEMO_RTP: f64 = 90.0;

pub async fn route_play(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
) -> AppResult<Json<PlayResponse>> {
    let user_id = require_user(&state.db, bearer).await?;

    let mut tx = state.db.begin().await?;
    if !db::debit_balance(&mut *tx, user_id, PLAY_COST).await? {
        return match db::user_balance(&mut *tx, user_id).await? {
            Some(_) => Err(AppError::InsufficientBalance),
            None => Err(AppError::NotFound("Profile not found")),
        };
    }

    let catalog = db::load_catalog(&mut *tx).await?;
    let rtp = normalize_rtp(db::current_rtp(&mut *tx, state.config.default_rtp).await?);
    let jackpot = db::jackpot_pool(&mut *tx).await?;

    let outcome = resolve_draw(catalog.patterns(), rtp, &mut SecureRng::new())?;
    let prize_amount = outcome.payout();

    let play_id = db::insert_history(
        &mut *tx,
        &NewPlay {
            user_id,
            pattern_id: outcome.pattern.id,
            final_result: outcome.final_result,
            rtp_at_play: rtp.round() as i64,
            prize_amount,
        },
    )
    .await?;

    let new_jackpot = jackpot + 1.0;
    db::set_setting(&mut *tx, db::SETTING_JACKPOT_POOL, &new_jackpot.to_string()).await?;
    db::insert_transaction(
        &mut *tx,
        &NewTransaction {
            user_id,
            kind: db::TX_PLAY,
            amount: PLAY_COST,
            status: db::STATUS_CONFIRMED,
            wallet_address: None,
            gacha_history_id: Some(play_id),
        },
    )
    .await?;
    if outcome.final_result {
        db::insert_transaction(
            &mut *tx,
            &NewTransaction {
                user_id,
                kind: db::TX_WIN,
                amount: prize_amount,
                status: db::STATUS_PENDING,
                wallet_address: None,
                gacha_history_id: Some(play_id),
            },
        )
        .await?;
    }
    let balance = db::user_balance(&mut *tx, user_id).await?.unwrap_or_default();
    tx.commit().await?;

    info!(
        user_id,
        play_id,
        pattern_id = outcome.pattern.id,
        currency = %outcome.pattern.currency,
        final_result = outcome.final_result,
        prize_amount,
        "play resolved"
    );

    Ok(Json(PlayResponse {
        play_id,
        final_result: outcome.final_result,
        prize_amount,
        pattern: pattern_view(&outcome.pattern),
        balance,
        jackpot_pool: new_jackpot,
        rtp,
    }))
}

pub async fn route_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    bearer: Option<BearerHeader>,
) -> AppResult<Json<ResultResponse>> {
    let user_id = require_user(&state.db, bearer).await?;
    let row = db::find_history(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Result not found"))?;
    if row.user_id != user_id {
        return Err(AppError::Forbidden("Forbidden"));
    }
    Ok(Json(ResultResponse {
        result: PlayResult {
            id: row.id,
            user_id: row.user_id,
            pattern_id: row.pattern_id,
            final_result: row.final_result,
            rtp_at_play: row.rtp_at_play,
            prize_amount: row.prize_amount,
            played_at: row.played_at(),
            pattern: history_pattern_view(&row),
        },
    }))
}

/// Draw against the built-in catalog. Nothing is charged or stored.
pub async fn route_demo_play() -> AppResult<Json<DemoPlayResponse>> {
    let catalog = demo_catalog();
    let outcome = resolve_draw(catalog.patterns(), DEMO_RTP, &mut SecureRng::new())?;
    Ok(Json(DemoPlayResponse {
        id: outcome.pattern.id,
        final_result: outcome.final_result,
        prize_amount: outcome.payout(),
        rtp: DEMO_RTP,
        pattern: pattern_view(&outcome.pattern),
    }))
}

pub async fn route_jackpot(State(state): State<Arc<AppState>>) -> Json<JackpotResponse> {
    let amount = match db::jackpot_pool(&state.db).await {
        Ok(amount) => amount,
        Err(e) => {
            error!(error = %e, "failed to fetch jackpot amount");
            0.0
        }
    };
    Json(JackpotResponse { amount })
}
