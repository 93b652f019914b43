pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: ServerConfig,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/gacha/play", post(routes::gacha::route_play))
        .route("/gacha/result/:id", get(routes::gacha::route_result))
        .route("/demo/play", get(routes::gacha::route_demo_play))
        .route("/jackpot", get(routes::gacha::route_jackpot))
        .route("/user/balance", get(routes::user::route_balance))
        .route("/user/deposit-address", get(routes::user::route_deposit_address))
        .route("/user/demo-credit", post(routes::user::route_demo_credit))
        .route("/user/redeem-code", post(routes::user::route_redeem_code))
        .route("/user/withdraw", post(routes::user::route_withdraw))
        .route("/admin/set-rtp", post(routes::admin::route_set_rtp))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
