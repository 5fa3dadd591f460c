use crate::dashboard::{self, AnalysisTab, Header, OverviewTab, RegionalTab};
use crate::error::FormatError;
use crate::output::{self, REGIONAL_SALES_FILE, RETAILER_SALES_FILE};
use crate::reports::{available_years, region_city_totals};
use crate::types::SalesTable;
use axum::extract::{Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared across every connection. The table is read-only after load, so
/// handlers take it without locking.
#[derive(Clone)]
pub struct AppState {
    table: Arc<SalesTable>,
}

/// The selected year lives in the request, not on the server.
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub year: Option<i32>,
}

pub struct ApiError(String);

impl From<FormatError> for ApiError {
    fn from(e: FormatError) -> Self {
        ApiError(e.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(e: csv::Error) -> Self {
        ApiError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}

pub fn router(table: Arc<SalesTable>) -> Router {
    Router::new()
        .route("/api/header", get(header_info))
        .route("/api/years", get(years))
        .route("/api/overview", get(overview))
        .route("/api/analysis", get(analysis))
        .route("/api/regional", get(regional))
        .route(&format!("/download/{}", RETAILER_SALES_FILE), get(download_retailer))
        .route(&format!("/download/{}", REGIONAL_SALES_FILE), get(download_regional))
        .layer(middleware::from_fn(request_logger))
        .with_state(AppState { table })
}

pub async fn serve(table: Arc<SalesTable>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "dashboard listening");
    axum::serve(listener, router(table)).await?;
    Ok(())
}

async fn request_logger(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let res = next.run(req).await;
    info!(%method, %uri, status = res.status().as_u16(), "request");
    res
}

async fn header_info() -> Json<Header> {
    Json(dashboard::header(chrono::Local::now().date_naive()))
}

async fn years(State(state): State<AppState>) -> Json<Vec<i32>> {
    Json(available_years(&state.table))
}

async fn overview(State(state): State<AppState>) -> Json<OverviewTab> {
    Json(dashboard::overview(&state.table))
}

async fn analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Json<AnalysisTab> {
    Json(dashboard::analysis(&state.table, query.year))
}

async fn regional(State(state): State<AppState>) -> Result<Json<RegionalTab>, ApiError> {
    Ok(Json(dashboard::regional(&state.table)?))
}

async fn download_retailer(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = output::retailer_sales_csv(&state.table)?;
    Ok(csv_attachment(RETAILER_SALES_FILE, bytes))
}

async fn download_regional(State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = region_city_totals(&state.table)?;
    let bytes = output::regional_sales_csv(&rows)?;
    Ok(csv_attachment(REGIONAL_SALES_FILE, bytes))
}

fn csv_attachment(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}
