//! Menurbac REST API Server
//!
//! Run with: cargo run --features server --bin menurbac-server
//!
//! Configured through `MENURBAC_DB_PATH`, `MENURBAC_MAP_SIZE`,
//! `MENURBAC_TABLE_PREFIX` and `MENURBAC_BIND`; log level via `RUST_LOG`.

use menurbac::{init_logging, server, Config};

#[tokio::main]
async fn main() {
    init_logging();
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "bad configuration");
            std::process::exit(2);
        }
    };
    if let Err(e) = server::serve(&config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
