use crate::classifier::{DroppedLine, Locale};
use crate::config::Config;
use crate::engines;
use crate::error::ScanError;
use crate::preprocessing::StepTiming;
use crate::scanner::ReceiptScanner;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<ReceiptScanner>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(scanner: ReceiptScanner, config: Config) -> Self {
        Self {
            scanner: Arc::new(scanner),
            config: Arc::new(config),
        }
    }
}

/// Scan response
#[derive(Serialize)]
pub struct ScanResponse {
    pub candidates: Vec<String>,
    pub lines: Vec<String>,
    pub dropped: Vec<DroppedLine>,
    pub width: u32,
    pub height: u32,
    pub skew_degrees: f32,
    pub rotated: bool,
    pub preprocessing_time_ms: u64,
    pub steps: Vec<StepTiming>,
    pub processing_time_ms: u64,
    pub engine: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub available_engines: Vec<String>,
    pub supported_languages: Vec<String>,
    pub vocabulary: Locale,
    pub max_file_size_bytes: usize,
    pub recognition_timeout_secs: u64,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    // Engine construction may download models; keep it off the runtime threads
    let engine_config = config.clone();
    let recognizer = tokio::task::spawn_blocking(move || engines::create(&engine_config)).await??;
    tracing::info!(
        "Using {} recognizer ({})",
        recognizer.name(),
        recognizer.description()
    );

    let scanner = ReceiptScanner::new(recognizer, config.vocabulary);
    let addr = format!("{}:{}", config.host, config.port);
    let app = router(AppState::new(scanner, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/scan", post(handle_scan))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle receipt scan requests
async fn handle_scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanResponse>, ScanError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            file_data = Some(field.bytes().await.map_err(|e| {
                ScanError::InvalidRequest(format!("Failed to read file data: {}", e))
            })?);
        }
    }

    let data = file_data.ok_or(ScanError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(ScanError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    // Preprocessing is CPU-bound
    let scanner = state.scanner.clone();
    let preprocessing = tokio::task::spawn_blocking(move || scanner.preprocess(&data))
        .await
        .map_err(|e| ScanError::Internal(format!("Preprocessing task failed: {}", e)))??;

    // Recognition is the only slow external call; bound it here
    let scanner = state.scanner.clone();
    let image = preprocessing.image.clone();
    let timeout = state.config.recognition_timeout;
    let recognition = tokio::task::spawn_blocking(move || scanner.recognize(&image));
    let lines = match tokio::time::timeout(timeout, recognition).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => {
            return Err(ScanError::RecognitionUnavailable(format!(
                "Recognition engine crashed: {}",
                e
            )));
        }
        Err(_) => {
            tracing::warn!(
                "Recognition timed out after {}s; engine call still running on the blocking pool",
                timeout.as_secs()
            );
            return Err(ScanError::RecognitionUnavailable(format!(
                "Recognition timed out after {}s",
                timeout.as_secs()
            )));
        }
    };

    let outcome = state.scanner.assemble(preprocessing, lines);
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Scan completed in {}ms: {} candidates from {} lines",
        processing_time_ms,
        outcome.candidates.len(),
        outcome.lines.len()
    );

    Ok(Json(ScanResponse {
        candidates: outcome.candidates,
        lines: outcome.lines,
        dropped: outcome.dropped,
        width: outcome.preprocessing.width,
        height: outcome.preprocessing.height,
        skew_degrees: outcome.preprocessing.skew_degrees,
        rotated: outcome.preprocessing.rotated,
        preprocessing_time_ms: outcome.preprocessing.total_time_ms,
        steps: outcome.preprocessing.steps,
        processing_time_ms,
        engine: state.scanner.recognizer().name().to_string(),
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let recognizer = state.scanner.recognizer();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: recognizer.name().to_string(),
        engine_description: recognizer.description().to_string(),
        available_engines: engines::available()
            .into_iter()
            .map(str::to_string)
            .collect(),
        supported_languages: recognizer.supported_languages(),
        vocabulary: state.config.vocabulary,
        max_file_size_bytes: state.config.max_file_size,
        recognition_timeout_secs: state.config.recognition_timeout.as_secs(),
    })
}
