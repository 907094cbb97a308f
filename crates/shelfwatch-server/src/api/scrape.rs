//! The scrape trigger endpoint.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use shelfwatch_core::{ProductRecord, ScrapeSettings};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct ScrapeData {
    pub message: String,
    pub count: usize,
    pub products: Vec<ProductRecord>,
}

/// `POST /api/v1/scrape` — runs one scrape, persists the record list to the
/// configured output document, and reports the count and records.
///
/// A page-fetch exhaustion surfaces as a single run-level failure (502) with
/// the underlying cause described; item-level faults never reach the caller,
/// they only reduce the count.
pub(super) async fn trigger_scrape(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(settings): Json<ScrapeSettings>,
) -> Result<Json<ApiResponse<ScrapeData>>, ApiError> {
    let products = state.orchestrator.run(&settings).await.map_err(|err| {
        tracing::error!(error = %err, "scrape run failed");
        ApiError::new(request_id.clone(), "upstream_fetch_failed", err.to_string())
    })?;

    let body = serde_json::to_vec_pretty(&products).map_err(|err| {
        tracing::error!(error = %err, "failed to serialize scrape output");
        ApiError::new(
            request_id.clone(),
            "internal_error",
            "failed to serialize scrape output",
        )
    })?;
    tokio::fs::write(state.output_path.as_ref(), body)
        .await
        .map_err(|err| {
            tracing::error!(
                error = %err,
                path = %state.output_path.display(),
                "failed to write scrape output document"
            );
            ApiError::new(
                request_id.clone(),
                "internal_error",
                "failed to write output document",
            )
        })?;

    let count = products.len();
    tracing::info!(
        count,
        output = %state.output_path.display(),
        "scrape run persisted"
    );

    Ok(Json(ApiResponse {
        data: ScrapeData {
            message: format!("Scraped {count} products"),
            count,
            products,
        },
        meta: ResponseMeta::new(request_id),
    }))
}
