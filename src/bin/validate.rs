//! Console validation report: current season vs the first N home league
//! matches of the prior one, straight from the silver tables.

use chrono::NaiveDate;
use sqlx::mysql::MySqlPoolOptions;
use tracing_subscriber::{fmt, EnvFilter};

use tribuna::config::DbConfig;
use tribuna::queries;
use tribuna::reports::validation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let db = DbConfig::from_env()?;
    let pool = MySqlPoolOptions::new().max_connections(2).connect(&db.url()).await?;

    let season_start = NaiveDate::from_ymd_opt(2025, 8, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid season start"))?;

    let tickets = queries::ticketing_raw(&pool).await?;
    let tick_now = validation::current_tickets(&tickets, season_start);
    let prior_tick_ids =
        queries::first_home_match_ids(&pool, tick_now.len() as u32, 2024).await?;
    let tick_then = validation::prior_tickets(&tickets, &prior_tick_ids);

    let loans = queries::loans_raw(&pool).await?;
    let loans_now = validation::current_loans(&loans, season_start);
    let prior_loan_ids =
        queries::first_home_match_ids(&pool, loans_now.len() as u32, 2024).await?;
    let loans_then = validation::prior_loans(&loans, &prior_loan_ids);

    print!("{}", validation::render(&tick_now, &tick_then, &loans_now, &loans_then));
    Ok(())
}
