use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("TRIBUNA_HTTP_PORT").unwrap_or_else(|_| "8050".to_string());
    let db_host = std::env::var("TRIBUNA_DB_HOST").unwrap_or_else(|_| "<unset>".to_string());
    let db_name = std::env::var("TRIBUNA_DB_NAME").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "tribuna",
        "Tribuna starting: RUST_LOG='{}', http_port={}, db_host='{}', db_name='{}'",
        rust_log, http_port, db_host, db_name
    );

    tribuna::server::run().await
}
