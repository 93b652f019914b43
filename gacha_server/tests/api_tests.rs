use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gacha_core::{derive_hash_hex, Currency};
use gacha_server::{app, db, AppState, ServerConfig};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin";

async fn setup(config: ServerConfig) -> (Router, SqlitePool) {
    // one connection, otherwise every connection gets its own in-memory db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_db(&pool).await.unwrap();
    let state = Arc::new(AppState {
        db: pool.clone(),
        config: ServerConfig {
            api_key: ADMIN_KEY.to_string(),
            ..config
        },
    });
    (app(state), pool)
}

async fn add_user(pool: &SqlitePool, email: &str, token: &str, balance: f64) -> i64 {
    sqlx::query("INSERT INTO users (email, api_token_hash, deposit_address, balance) VALUES (?, ?, ?, ?)")
        .bind(email)
        .bind(derive_hash_hex(token.as_bytes()))
        .bind(format!("addr-{email}"))
        .bind(balance)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

async fn add_pattern(pool: &SqlitePool, id: i64, currency: Currency, base_result: bool, prize: f64) {
    sqlx::query(
        "INSERT INTO gacha_patterns (id, currency, machine_color, effect_1, effect_2, base_result, weight, prize_amount, video_url) VALUES (?, ?, 'Gold', 'Hot', 'Hot', ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(currency.as_str())
    .bind(base_result)
    .bind(prize)
    .bind(format!("pattern_{id:02}.mp4"))
    .execute(pool)
    .await
    .unwrap();
}

/// One winning pattern per currency, plus a losing one when `with_losers`.
async fn seed_catalog(pool: &SqlitePool, with_losers: bool) {
    for (i, currency) in Currency::ALL.iter().enumerate() {
        let id = i as i64 + 1;
        add_pattern(pool, id, *currency, true, 10.0).await;
        if with_losers {
            add_pattern(pool, id + 100, *currency, false, 10.0).await;
        }
    }
}

async fn set_rtp(pool: &SqlitePool, rtp: f64) {
    db::set_setting(pool, db::SETTING_CURRENT_RTP, &rtp.to_string())
        .await
        .unwrap();
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn play_requires_auth() {
    let (app, _pool) = setup(ServerConfig::default()).await;
    let (status, body) = send(&app, post("/gacha/play", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&app, post("/gacha/play", Some("nope"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn winning_play_debits_and_records() {
    let (app, pool) = setup(ServerConfig::default()).await;
    let user_id = add_user(&pool, "a@example.com", "tok-a", 3.0).await;
    seed_catalog(&pool, false).await;
    set_rtp(&pool, 100.0).await;

    let (status, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalResult"], true);
    assert_eq!(body["prizeAmount"], 10.0);
    assert_eq!(body["balance"], 2.0);
    assert_eq!(body["jackpotPool"], 1.0);
    assert_eq!(body["rtp"], 100.0);

    let play_id = body["playId"].as_i64().unwrap();
    let kinds: Vec<(String, String)> = sqlx::query_as(
        "SELECT type, status FROM transactions WHERE gacha_history_id = ? ORDER BY id",
    )
    .bind(play_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        kinds,
        vec![
            ("PLAY".to_string(), "CONFIRMED".to_string()),
            ("WIN".to_string(), "PENDING".to_string())
        ]
    );
    assert_eq!(db::user_balance(&pool, user_id).await.unwrap(), Some(2.0));
    assert_eq!(db::jackpot_pool(&pool).await.unwrap(), 1.0);
}

#[tokio::test]
async fn zero_rtp_downgrades_every_play() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 10.0).await;
    seed_catalog(&pool, true).await;
    set_rtp(&pool, 0.0).await;

    for _ in 0..10 {
        let (status, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["finalResult"], false);
        assert_eq!(body["prizeAmount"], 0.0);
    }
    let wins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE type = 'WIN'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(wins, 0);
}

#[tokio::test]
async fn play_without_balance_is_rejected() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 0.5).await;
    seed_catalog(&pool, true).await;

    let (status, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "Insufficient balance");
}

#[tokio::test]
async fn empty_catalog_fails_without_charging() {
    let (app, pool) = setup(ServerConfig::default()).await;
    let user_id = add_user(&pool, "a@example.com", "tok-a", 5.0).await;

    let (status, _) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(db::user_balance(&pool, user_id).await.unwrap(), Some(5.0));
    let plays: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gacha_history")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(plays, 0);
}

#[tokio::test]
async fn result_is_private_to_its_player() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 5.0).await;
    add_user(&pool, "b@example.com", "tok-b", 5.0).await;
    seed_catalog(&pool, true).await;

    let (_, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    let play_id = body["playId"].as_i64().unwrap();
    let uri = format!("/gacha/result/{play_id}");

    let (status, body) = send(&app, get(&uri, Some("tok-a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], play_id);
    assert!(body["result"]["pattern"]["videoUrl"].as_str().unwrap().ends_with(".mp4"));

    let (status, _) = send(&app, get(&uri, Some("tok-b"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get("/gacha/result/9999", Some("tok-a"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn redeem_code_rules() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 0.0).await;
    add_user(&pool, "b@example.com", "tok-b", 0.0).await;
    sqlx::query("INSERT INTO campaign_codes (code, plays_granted, max_uses) VALUES ('WELCOME', 3, 1)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO campaign_codes (code, plays_granted, max_uses, expires_at) VALUES ('OLD', 3, 10, '2000-01-01T00:00:00Z')")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(&app, post("/user/redeem-code", Some("tok-a"), Some(json!({"code": "  welcome "})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 3.0);
    assert_eq!(body["playsGranted"], 3);

    let (status, body) = send(&app, post("/user/redeem-code", Some("tok-a"), Some(json!({"code": "WELCOME"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code has reached max uses");

    let (status, body) = send(&app, post("/user/redeem-code", Some("tok-b"), Some(json!({"code": "OLD"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code expired");

    let (status, _) = send(&app, post("/user/redeem-code", Some("tok-b"), Some(json!({"code": "MISSING"})))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, post("/user/redeem-code", Some("tok-b"), Some(json!({"code": "   "})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Campaign code is required");
}

#[tokio::test]
async fn redeem_twice_is_rejected() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 0.0).await;
    sqlx::query("INSERT INTO campaign_codes (code, plays_granted, max_uses) VALUES ('SPRING', 2, 100)")
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(&app, post("/user/redeem-code", Some("tok-a"), Some(json!({"code": "spring"})))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, post("/user/redeem-code", Some("tok-a"), Some(json!({"code": "spring"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code already redeemed");
}

#[tokio::test]
async fn withdraw_winning_play_once() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 5.0).await;
    seed_catalog(&pool, false).await;
    set_rtp(&pool, 100.0).await;

    let (_, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    let play_id = body["playId"].as_i64().unwrap();

    let (status, _) = send(&app, post("/user/withdraw", Some("tok-a"), Some(json!({"playId": play_id})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = json!({"walletAddress": "0xabc", "playId": play_id});
    let (status, body) = send(&app, post("/user/withdraw", Some("tok-a"), Some(req.clone()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, post("/user/withdraw", Some("tok-a"), Some(req))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Withdrawal already requested");
}

#[tokio::test]
async fn database_allows_one_withdrawal_per_play() {
    let (app, pool) = setup(ServerConfig::default()).await;
    let user_id = add_user(&pool, "a@example.com", "tok-a", 5.0).await;
    seed_catalog(&pool, false).await;
    set_rtp(&pool, 100.0).await;

    let (_, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    let play_id = body["playId"].as_i64().unwrap();
    let withdrawal = db::NewTransaction {
        user_id,
        kind: db::TX_WITHDRAWAL,
        amount: 10.0,
        status: db::STATUS_PENDING,
        wallet_address: Some("0xabc"),
        gacha_history_id: Some(play_id),
    };
    db::insert_transaction(&pool, &withdrawal).await.unwrap();
    match db::insert_transaction(&pool, &withdrawal).await {
        Err(sqlx::Error::Database(e)) => assert!(e.is_unique_violation()),
        other => panic!("expected unique violation, got {other:?}"),
    }

    // other transaction types may still reference the play
    let win = db::NewTransaction {
        kind: db::TX_WIN,
        ..withdrawal
    };
    db::insert_transaction(&pool, &win).await.unwrap();

    let req = json!({"walletAddress": "0xabc", "playId": play_id});
    let (status, body) = send(&app, post("/user/withdraw", Some("tok-a"), Some(req))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Withdrawal already requested");
}

#[tokio::test]
async fn losing_play_cannot_be_withdrawn() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 5.0).await;
    seed_catalog(&pool, true).await;
    set_rtp(&pool, 0.0).await;

    let (_, body) = send(&app, post("/gacha/play", Some("tok-a"), None)).await;
    let play_id = body["playId"].as_i64().unwrap();
    let req = json!({"walletAddress": "0xabc", "playId": play_id});
    let (status, body) = send(&app, post("/user/withdraw", Some("tok-a"), Some(req))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This play is not eligible for withdrawal");
}

#[tokio::test]
async fn demo_credit_respects_config() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 1.0).await;
    let (status, _) = send(&app, post("/user/demo-credit", Some("tok-a"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (app, pool) = setup(ServerConfig {
        demo_mode: true,
        ..ServerConfig::default()
    })
    .await;
    add_user(&pool, "a@example.com", "tok-a", 1.0).await;
    let (status, body) = send(&app, post("/user/demo-credit", Some("tok-a"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 5.0);
    assert_eq!(body["balance"], 6.0);
}

#[tokio::test]
async fn balance_and_deposit_address() {
    let (app, pool) = setup(ServerConfig::default()).await;
    add_user(&pool, "a@example.com", "tok-a", 7.5).await;

    let (status, body) = send(&app, get("/user/balance", Some("tok-a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 7.5);

    let (status, body) = send(&app, get("/user/deposit-address", Some("tok-a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["depositAddress"], "addr-a@example.com");
}

#[tokio::test]
async fn admin_sets_clamped_rtp() {
    let (app, pool) = setup(ServerConfig::default()).await;

    let (status, _) = send(&app, post("/admin/set-rtp", Some("wrong"), Some(json!({"rtp": 50})))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post("/admin/set-rtp", Some(ADMIN_KEY), Some(json!({"rtp": 150})))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(db::current_rtp(&pool, 90.0).await.unwrap(), 100.0);
}

#[tokio::test]
async fn demo_play_and_jackpot_are_public() {
    let (app, _pool) = setup(ServerConfig::default()).await;

    let (status, body) = send(&app, get("/demo/play", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rtp"], 90.0);
    assert!(body["pattern"]["currency"].is_string());
    if body["finalResult"] == false {
        assert_eq!(body["prizeAmount"], 0.0);
    }

    let (status, body) = send(&app, get("/jackpot", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 0.0);
}
