use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use gacha_core::normalize_rtp;
use gacha_shared::AdminSetRtpRequest;
use tracing::info;

use crate::{
    auth::{require_admin, BearerHeader},
    db,
    error::AppResult,
    AppState,
};

pub async fn route_set_rtp(
    State(state): State<Arc<AppState>>,
    bearer: Option<BearerHeader>,
    Json(req): Json<AdminSetRtpRequest>,
) -> AppResult<StatusCode> {
    require_admin(&state.config.api_key, bearer)?;
    let rtp = normalize_rtp(req.rtp);
    db::set_setting(&state.db, db::SETTING_CURRENT_RTP, &rtp.to_string()).await?;
    info!(rtp, "rtp updated");
    Ok(StatusCode::NO_CONTENT)
}
