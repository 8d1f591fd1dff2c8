use crate::config;
use crate::delta_client::DeltaClient;
use crate::error::DeltaError;
use crate::models::{ContractRecord, MarketSnapshot};
use crate::processor::{self, ChainTable};
use crate::rules;
use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignalQuery {
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start_time: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }

    fn err(error: impl ToString, start_time: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StrategyListResponse {
    pub strategies: Vec<String>,
    pub default: String,
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub underlying: String,
    pub current_price: f64,
    pub reference_price: Option<f64>,
    pub strikes: usize,
    pub chain: ChainTable,
}

#[derive(Debug, Serialize)]
pub struct SignalResponse {
    pub strategy: String,
    pub current_price: f64,
    pub reference_price: Option<f64>,
    pub message: String,
    pub details: Option<rules::SignalDetails>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    client: Arc<DeltaClient>,
    cache: Arc<RwLock<Cache>>,
}

#[derive(Default)]
struct Cache {
    cycle: Option<(Vec<ContractRecord>, MarketSnapshot, Instant)>,
}

const CACHE_DURATION: Duration = Duration::from_secs(60);

impl AppState {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Arc::new(DeltaClient::new()?),
            cache: Arc::new(RwLock::new(Cache::default())),
        })
    }

    /// Contracts + snapshot for the current cycle, cached for CACHE_DURATION
    async fn fetch_cycle(&self) -> Result<(Vec<ContractRecord>, MarketSnapshot), DeltaError> {
        {
            let cache = self.cache.read().await;
            if let Some((records, snapshot, cached_at)) = &cache.cycle {
                if cached_at.elapsed() < CACHE_DURATION {
                    return Ok((records.clone(), *snapshot));
                }
            }
        }

        let underlying = config::get_underlying();
        let records = self.client.fetch_option_contracts(&underlying).await?;
        let snapshot = self.client.fetch_snapshot().await?;

        {
            let mut cache = self.cache.write().await;
            cache.cycle = Some((records.clone(), snapshot, Instant::now()));
        }

        Ok((records, snapshot))
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/strategies - Registered strategy names and the default
async fn get_strategies(
    State(_app_state): State<AppState>,
) -> Result<Json<ApiResponse<StrategyListResponse>>, StatusCode> {
    let start_time = Instant::now();

    Ok(Json(ApiResponse::ok(
        StrategyListResponse {
            strategies: rules::strategy_names().iter().map(|s| s.to_string()).collect(),
            default: rules::default_strategy().to_string(),
        },
        start_time,
    )))
}

/// GET /api/chain - The normalized chain table for the nearest expiry
async fn get_chain(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<ChainResponse>>, StatusCode> {
    let start_time = Instant::now();

    match app_state.fetch_cycle().await {
        Ok((records, snapshot)) => {
            let chain = processor::build_chain(&records);
            Ok(Json(ApiResponse::ok(
                ChainResponse {
                    underlying: config::get_underlying(),
                    current_price: snapshot.current_price,
                    reference_price: snapshot.reference_price,
                    strikes: chain.len(),
                    chain,
                },
                start_time,
            )))
        }
        Err(e) => Ok(Json(ApiResponse::err(e, start_time))),
    }
}

/// GET /api/signal?strategy=<name> - Evaluate one strategy against a fresh chain
async fn get_signal(
    Query(query): Query<SignalQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<SignalResponse>>, StatusCode> {
    let start_time = Instant::now();

    match app_state.fetch_cycle().await {
        Ok((records, snapshot)) => {
            let chain = processor::build_chain(&records);
            let result = rules::run_strategy(
                &chain,
                snapshot.current_price,
                snapshot.reference_price,
                query.strategy.as_deref(),
            );

            Ok(Json(ApiResponse::ok(
                SignalResponse {
                    strategy: query
                        .strategy
                        .unwrap_or_else(|| rules::default_strategy().to_string()),
                    current_price: snapshot.current_price,
                    reference_price: snapshot.reference_price,
                    message: result.message,
                    details: result.details,
                },
                start_time,
            )))
        }
        Err(e) => Ok(Json(ApiResponse::err(e, start_time))),
    }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub async fn start_server(port: u16) -> Result<()> {
    let app_state = AppState::new()?;

    let app = Router::new()
        .route("/api/strategies", get(get_strategies))
        .route("/api/chain", get(get_chain))
        .route("/api/signal", get(get_signal))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "API server listening");
    println!("🚀 Delta Analyzer API Server running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /api/strategies");
    println!("   GET  /api/chain");
    println!("   GET  /api/signal?strategy=<name>");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
