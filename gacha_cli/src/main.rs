use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use gacha_core::{
    demo_catalog, derive_hash_hex, normalize_rtp, simulate, Catalog, Pattern, SecureRng, SeededRng,
    SimulationReport,
};
use gacha_server::db;
use rand::RngCore;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

const DEFAULT_DATABASE_URL: &str = "sqlite://gacha.db?mode=rwc";
const DEFAULT_RTP: f64 = 90.0;

#[derive(Parser)]
#[command(name = "gacha-cli", about = "Admin CLI for the gacha server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Database URL, default sqlite://gacha.db?mode=rwc
    #[arg(long, value_parser, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the return-to-player percentage used by live draws
    SetRtp { percent: f64 },
    /// Replace the pattern catalog with a JSON array of patterns
    ImportPatterns { path: String },
    /// Create a player and print their API token
    AddUser {
        email: String,
        deposit_address: String,
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    /// Create a campaign code granting free plays
    CreateCode {
        code: String,
        #[arg(long, default_value_t = 1)]
        plays: i64,
        #[arg(long)]
        max_uses: i64,
        /// RFC 3339 expiry, e.g. 2025-12-31T23:59:59Z
        #[arg(long)]
        expires_at: Option<String>,
    },
    /// View last N plays
    ViewHistory {
        #[arg(default_value_t = 20)]
        n: i64,
    },
    /// Export play history to CSV path
    ExportCsv { path: String },
    /// Run draws offline and print payout statistics
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        draws: u64,
        /// Defaults to the stored current_rtp, or 90 with --demo
        #[arg(long)]
        rtp: Option<f64>,
        /// Replay a deterministic stream instead of the OS RNG
        #[arg(long)]
        seed: Option<String>,
        /// Use the built-in demo catalog instead of the database
        #[arg(long)]
        demo: bool,
    },
}

async fn get_pool(url: Option<String>) -> anyhow::Result<SqlitePool> {
    let url = url.unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;
    db::init_db(&pool).await?;
    Ok(pool)
}

async fn import_patterns(pool: &SqlitePool, path: &str) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let patterns: Vec<Pattern> = serde_json::from_str(&raw).context("parsing pattern JSON")?;
    let catalog = Catalog::new(patterns);
    for warning in catalog.validate()? {
        println!("warning: {:?}", warning);
    }
    db::replace_catalog(pool, &catalog).await?;
    println!("Imported {} patterns from {}", catalog.len(), path);
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!(
        "draws={} rtp_target={} final_wins={} downgrades={} total_payout={:.2} return_per_credit={:.4}",
        report.draws,
        report.rtp_target,
        report.final_wins,
        report.downgrades,
        report.total_payout,
        report.realised_return()
    );
    for (currency, stats) in &report.by_currency {
        println!(
            "  {:<4} freq={:.4} draws={:>8} intrinsic_wins={:>8} final_wins={:>8} payout={:.2}",
            currency.as_str(),
            report.currency_frequency(*currency),
            stats.draws,
            stats.intrinsic_wins,
            stats.final_wins,
            stats.payout
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::SetRtp { percent } => {
            let pool = get_pool(cli.database_url).await?;
            let rtp = normalize_rtp(percent);
            db::set_setting(&pool, db::SETTING_CURRENT_RTP, &rtp.to_string()).await?;
            println!("current_rtp set to {}", rtp);
        }
        Commands::ImportPatterns { path } => {
            let pool = get_pool(cli.database_url).await?;
            import_patterns(&pool, &path).await?;
        }
        Commands::AddUser {
            email,
            deposit_address,
            balance,
        } => {
            let pool = get_pool(cli.database_url).await?;
            let mut bytes = [0u8; 24];
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            let token = hex::encode(bytes);
            let id = sqlx::query(
                "INSERT INTO users (email, api_token_hash, deposit_address, balance) VALUES (?, ?, ?, ?)",
            )
            .bind(&email)
            .bind(derive_hash_hex(token.as_bytes()))
            .bind(&deposit_address)
            .bind(balance)
            .execute(&pool)
            .await?
            .last_insert_rowid();
            println!("Created user #{} {}. API token (shown once): {}", id, email, token);
        }
        Commands::CreateCode {
            code,
            plays,
            max_uses,
            expires_at,
        } => {
            if let Some(raw) = &expires_at {
                DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("invalid --expires-at {raw}"))?;
            }
            let pool = get_pool(cli.database_url).await?;
            let code = code.trim().to_uppercase();
            sqlx::query(
                "INSERT INTO campaign_codes (code, plays_granted, max_uses, expires_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&code)
            .bind(plays)
            .bind(max_uses)
            .bind(expires_at)
            .execute(&pool)
            .await?;
            println!("Created code {} ({} plays, {} uses)", code, plays, max_uses);
        }
        Commands::ViewHistory { n } => {
            let pool = get_pool(cli.database_url).await?;
            let rows = sqlx::query("SELECT h.id, h.played_at, h.user_id, h.pattern_id, p.currency, h.final_result, h.rtp_at_play, h.prize_amount FROM gacha_history h JOIN gacha_patterns p ON p.id = h.pattern_id ORDER BY h.id DESC LIMIT ?")
                .bind(n)
                .fetch_all(&pool).await?;
            for r in rows {
                let id: i64 = r.get("id");
                let played_at: String = r.get("played_at");
                let user_id: i64 = r.get("user_id");
                let pattern_id: i64 = r.get("pattern_id");
                let currency: String = r.get("currency");
                let final_result: bool = r.get("final_result");
                let rtp: i64 = r.get("rtp_at_play");
                let prize: f64 = r.get("prize_amount");
                println!(
                    "#{:>6} {} user={} pattern={} {} win={} rtp={} prize={}",
                    id, played_at, user_id, pattern_id, currency, final_result, rtp, prize
                );
            }
        }
        Commands::ExportCsv { path } => {
            let pool = get_pool(cli.database_url).await?;
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record([
                "id",
                "played_at",
                "user_id",
                "pattern_id",
                "final_result",
                "rtp_at_play",
                "prize_amount",
            ])?;
            let rows = sqlx::query("SELECT id, played_at, user_id, pattern_id, final_result, rtp_at_play, prize_amount FROM gacha_history ORDER BY id ASC")
                .fetch_all(&pool).await?;
            let total = rows.len();
            for r in &rows {
                wtr.write_record(&[
                    r.get::<i64, _>("id").to_string(),
                    r.get::<String, _>("played_at"),
                    r.get::<i64, _>("user_id").to_string(),
                    r.get::<i64, _>("pattern_id").to_string(),
                    r.get::<bool, _>("final_result").to_string(),
                    r.get::<i64, _>("rtp_at_play").to_string(),
                    r.get::<f64, _>("prize_amount").to_string(),
                ])?;
            }
            wtr.flush()?;
            println!("Exported {} rows to {}", total, path);
        }
        Commands::Simulate {
            draws,
            rtp,
            seed,
            demo,
        } => {
            let (catalog, rtp) = if demo {
                (demo_catalog(), rtp.unwrap_or(DEFAULT_RTP))
            } else {
                let pool = get_pool(cli.database_url).await?;
                let catalog = db::load_catalog(&pool).await?;
                let stored = match rtp {
                    Some(rtp) => rtp,
                    None => db::current_rtp(&pool, DEFAULT_RTP).await?,
                };
                (catalog, stored)
            };
            for warning in catalog.validate()? {
                println!("warning: {:?}", warning);
            }
            let report = match seed {
                Some(seed) => {
                    let mut rng = SeededRng::new(seed, "simulation", 0);
                    println!("server_seed_hash={}", rng.server_seed_hash_hex());
                    simulate(&catalog, rtp, draws, &mut rng)?
                }
                None => simulate(&catalog, rtp, draws, &mut SecureRng::new())?,
            };
            print_report(&report);
        }
    }

    Ok(())
}
