//! Pricing service for the voice-mandi front end.
//!
//! Serves `POST /get-price` with a localized price band estimated from the
//! product, quantity and location, plus `GET /` and `GET /health`.

use axum::{
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use voice_mandi::core::estimator::{estimate_with_rng, PriceEstimate};
use voice_mandi::core::PriceQuoteRequest;
use voice_mandi::utils::logger;

#[derive(Debug, Parser)]
#[command(name = "mandi-server")]
#[command(about = "Price estimate service for the multilingual mandi")]
struct ServerArgs {
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,

    #[arg(long, help = "Emit JSON logs")]
    json_logs: bool,
}

const HEALTH_STATUS: &str = "✅ Backend running successfully";

async fn health() -> Json<Value> {
    Json(json!({ "status": HEALTH_STATUS }))
}

async fn get_price(Json(request): Json<PriceQuoteRequest>) -> Json<PriceEstimate> {
    let estimate = {
        let mut rng = rand::thread_rng();
        estimate_with_rng(&request, &mut rng)
    };

    tracing::info!(
        product = %estimate.product,
        quantity_kg = estimate.quantity_kg,
        language = %request.language,
        "💰 {}",
        estimate.price_range
    );
    Json(estimate)
}

fn app() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/get-price", post(get_price))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    logger::init_server_logger(args.json_logs);

    let listener = TcpListener::bind(&args.bind).await?;
    tracing::info!("🚀 mandi-server listening on {}", listener.local_addr()?);

    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
