/**
 * Conduit Server Entry Point
 *
 * Loads `.env`, configures tracing from `RUST_LOG` (default `info`), reads
 * `ServerConfig` from the environment and serves the Axum app.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = conduit::backend::server::ServerConfig::from_env()?;
    tracing::info!("[STARTUP] {:?}", config);

    let (_state, app) = conduit::backend::server::create_app(&config).await;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("[STARTUP] Listening on {}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin conduit-server --features ssr");
    std::process::exit(1);
}
