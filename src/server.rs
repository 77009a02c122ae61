use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::analysis::{analyze_site, score_facility_set};
use crate::config::Config;
use crate::facility::{Coordinate, FacilitySet};
use crate::providers::{provider_from_config, FacilityProvider};
use crate::recommendations::{build_improvements, ImprovementOpportunity};
use crate::scoring::engine::classify;
use crate::scoring::{ClassificationTier, SiteAnalysis};
use crate::standards::{FacilityCategory, ScoringStandard};

#[derive(Clone)]
struct ApiState {
    config: Config,
    standard: ScoringStandard,
    provider: Arc<dyn FacilityProvider>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct AnalyzeRequest {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ScoreRequest {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    facilities: FacilitySet,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassifyRequest {
    category: String,
    distance_m: f64,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    category: FacilityCategory,
    distance_m: f64,
    tier: ClassificationTier,
    label: &'static str,
    color: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ImproveRequest {
    lat: f64,
    lng: f64,
    top: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ImproveResponse {
    analysis: SiteAnalysis,
    improvements: Vec<ImprovementOpportunity>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct StandardResponse {
    fingerprint: String,
    standard: ScoringStandard,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let standard = config.resolved_standard()?;
    let provider = provider_from_config(&config.provider)?;
    let state = ApiState {
        config,
        standard,
        provider,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/analyze", post(analyze))
        .route("/v1/score", post(score))
        .route("/v1/classify", post(classify_distance))
        .route("/v1/improve", post(improve))
        .route("/v1/standard", get(show_standard))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn show_standard(State(state): State<ApiState>) -> Json<ApiResponse<StandardResponse>> {
    ok(StandardResponse {
        fingerprint: state.standard.fingerprint(),
        standard: state.standard,
    })
}

async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<SiteAnalysis> {
    let origin = parse_origin(request.lat, request.lng)?;
    let analysis = analyze_site(state.provider.as_ref(), &state.standard, origin)
        .await
        .map_err(ApiError::internal)?;
    Ok(ok(analysis))
}

async fn score(
    State(state): State<ApiState>,
    Json(request): Json<ScoreRequest>,
) -> ApiResult<SiteAnalysis> {
    let origin = parse_origin(
        request.lat.unwrap_or_default(),
        request.lng.unwrap_or_default(),
    )?;
    request
        .facilities
        .validate()
        .map_err(|error| ApiError::bad_request(error.to_string()))?;
    Ok(ok(score_facility_set(
        &state.standard,
        origin,
        &request.facilities,
    )))
}

async fn classify_distance(
    State(state): State<ApiState>,
    Json(request): Json<ClassifyRequest>,
) -> ApiResult<ClassifyResponse> {
    let category = FacilityCategory::from_str(&request.category)
        .map_err(|error| ApiError::bad_request(error.to_string()))?;
    if !request.distance_m.is_finite() || request.distance_m < 0.0 {
        return Err(ApiError::bad_request(format!(
            "distance_m must be a non-negative number, got {}",
            request.distance_m
        )));
    }
    let tier = classify(&state.standard, category, request.distance_m);
    Ok(ok(ClassifyResponse {
        category,
        distance_m: request.distance_m,
        tier,
        label: tier.label(),
        color: tier.color(),
    }))
}

async fn improve(
    State(state): State<ApiState>,
    Json(request): Json<ImproveRequest>,
) -> ApiResult<ImproveResponse> {
    let origin = parse_origin(request.lat, request.lng)?;
    let top = request.top.unwrap_or(4).max(1);
    let analysis = analyze_site(state.provider.as_ref(), &state.standard, origin)
        .await
        .map_err(ApiError::internal)?;
    let improvements = build_improvements(&state.standard, &analysis.score, top);
    Ok(ok(ImproveResponse {
        analysis,
        improvements,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn parse_origin(lat: f64, lng: f64) -> std::result::Result<Coordinate, ApiError> {
    Coordinate::new(lat, lng).map_err(|error| ApiError::bad_request(error.to_string()))
}
