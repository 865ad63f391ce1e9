use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::books::handlers::{load_owned_book, UserIdQuery};
use crate::books::store;
use crate::errors::AppError;
use crate::export::manuscript::{export_key, render_manuscript, upload_manuscript, ExportReceipt};
use crate::state::AppState;

/// POST /api/v1/books/:book_id/export
pub async fn handle_export_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ExportReceipt>, AppError> {
    let book = load_owned_book(&state, book_id, params.user_id).await?;
    let chapters = store::list_chapters(&state.db, book_id).await?;
    let chapter_count = chapters.len();

    let manuscript = tokio::task::spawn_blocking(move || render_manuscript(&book, &chapters))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    let exported_at = Utc::now();
    let s3_key = export_key(params.user_id, book_id, exported_at);
    upload_manuscript(&state.s3, &state.config.s3_bucket, &s3_key, &manuscript)
        .await
        .map_err(|e| AppError::S3(e.to_string()))?;

    tracing::info!(
        book_id = %book_id,
        pages = manuscript.total_pages,
        words = manuscript.word_count,
        "Exported manuscript"
    );

    Ok(Json(ExportReceipt {
        book_id,
        s3_key,
        total_pages: manuscript.total_pages,
        word_count: manuscript.word_count,
        chapter_count,
        exported_at,
    }))
}
