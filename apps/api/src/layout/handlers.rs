use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::{
    compute_pages, page_layout, page_texts, CharMetrics, LayoutError, PageDescriptor, PageLayout,
    TextStats, TypographyConfig,
};

/// A page descriptor plus the text it covers, as returned over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    #[serde(flatten)]
    pub descriptor: PageDescriptor,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub typography: TypographyConfig,
    pub layout: PageLayout,
    pub total_pages: usize,
    pub pages: Vec<PageView>,
}

/// Paginates `text` and attaches each page's content.
pub fn build_pagination_response(
    text: &str,
    typography: TypographyConfig,
) -> Result<PaginationResponse, LayoutError> {
    let layout = page_layout(&typography, &CharMetrics::default())?;
    let descriptors = compute_pages(text, &typography)?;
    let pages: Vec<PageView> = page_texts(text, &descriptors)
        .zip(descriptors.iter())
        .map(|(content, descriptor)| PageView {
            descriptor: descriptor.clone(),
            content: content.to_string(),
        })
        .collect();

    Ok(PaginationResponse {
        typography,
        layout,
        total_pages: pages.len(),
        pages,
    })
}

/// Runs `build_pagination_response` on the blocking pool.
pub async fn paginate_blocking(
    text: String,
    typography: TypographyConfig,
) -> Result<PaginationResponse, AppError> {
    let result = tokio::task::spawn_blocking(move || build_pagination_response(&text, typography))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))?;
    Ok(result?)
}

#[derive(Deserialize)]
pub struct PaginateRequest {
    pub text: String,
    #[serde(default)]
    pub typography: TypographyConfig,
}

#[derive(Deserialize)]
pub struct StatsRequest {
    pub text: String,
}

/// POST /api/v1/layout/paginate
pub async fn handle_paginate(
    Json(req): Json<PaginateRequest>,
) -> Result<Json<PaginationResponse>, AppError> {
    let response = paginate_blocking(req.text, req.typography).await?;
    Ok(Json(response))
}

/// POST /api/v1/layout/stats
pub async fn handle_stats(Json(req): Json<StatsRequest>) -> Json<TextStats> {
    Json(TextStats::from_text(&req.text))
}

/// Routes that need no application state.
pub fn layout_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/layout/paginate", post(handle_paginate))
        .route("/api/v1/layout/stats", post(handle_stats))
}
