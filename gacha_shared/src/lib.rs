use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternView {
    pub id: i64,
    pub currency: String,
    pub machine_color: String,
    pub effect1: String,
    pub effect2: String,
    pub video_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub play_id: i64,
    pub final_result: bool,
    pub prize_amount: f64,
    pub pattern: PatternView,
    pub balance: f64,
    pub jackpot_pool: f64,
    pub rtp: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DemoPlayResponse {
    pub id: i64,
    pub final_result: bool,
    pub prize_amount: f64,
    pub rtp: f64,
    pub pattern: PatternView,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub id: i64,
    pub user_id: i64,
    pub pattern_id: i64,
    pub final_result: bool,
    pub rtp_at_play: i64,
    pub prize_amount: f64,
    pub played_at: DateTime<Utc>,
    pub pattern: PatternView,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResultResponse {
    pub result: PlayResult,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BalanceResponse {
    pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressResponse {
    pub deposit_address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DemoCreditResponse {
    pub balance: f64,
    pub added: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RedeemCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCodeResponse {
    pub success: bool,
    pub balance: f64,
    pub plays_granted: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub play_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JackpotResponse {
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetRtpRequest {
    pub rtp: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}
