use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::books::stats::{summarize_book, BookSummary};
use crate::books::store::{self, BookChanges, ChapterChanges, FieldUpdate, NewBook};
use crate::errors::AppError;
use crate::layout::handlers::{paginate_blocking, PaginationResponse};
use crate::layout::{count_words, TextStats, TypographyConfig};
use crate::models::book::BookRow;
use crate::models::chapter::ChapterRow;
use crate::state::AppState;

const MAX_TITLE_CHARS: usize = 300;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub typography: TypographyConfig,
}

#[derive(Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub typography: Option<TypographyConfig>,
}

#[derive(Deserialize)]
pub struct CreateChapterRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub position: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub position: Option<i32>,
}

#[derive(Serialize)]
pub struct ChapterPagesResponse {
    pub chapter_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub pagination: PaginationResponse,
}

#[derive(Serialize)]
pub struct ChapterStatsResponse {
    pub chapter_id: Uuid,
    #[serde(flatten)]
    pub stats: TextStats,
}

#[derive(Serialize)]
pub struct BookStatsResponse {
    pub book_id: Uuid,
    #[serde(flatten)]
    pub summary: BookSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Authorization and validation
// ────────────────────────────────────────────────────────────────────────────

/// The ownership predicate: only the book's owner may touch it.
pub(crate) fn check_owner(book: &BookRow, user_id: Uuid) -> Result<(), AppError> {
    if book.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Loads a book and checks ownership. Missing → 404, foreign → 403.
pub(crate) async fn load_owned_book(
    state: &AppState,
    book_id: Uuid,
    user_id: Uuid,
) -> Result<BookRow, AppError> {
    let book = store::get_book(&state.db, book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {book_id} not found")))?;
    check_owner(&book, user_id)?;
    Ok(book)
}

async fn load_chapter(
    state: &AppState,
    book_id: Uuid,
    chapter_id: Uuid,
) -> Result<ChapterRow, AppError> {
    store::get_chapter(&state.db, book_id, chapter_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chapter {chapter_id} not found")))
}

/// Trims a title and rejects blank or oversized values.
fn validate_title(title: &str) -> Result<&str, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

fn validate_position(position: Option<i32>) -> Result<(), AppError> {
    match position {
        Some(p) if p < 0 => Err(AppError::Validation(
            "position must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

fn word_count_i32(content: &str) -> i32 {
    i32::try_from(count_words(content)).unwrap_or(i32::MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// Books
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/books
pub async fn handle_list_books(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<BookRow>>, AppError> {
    Ok(Json(store::list_books(&state.db, params.user_id).await?))
}

/// POST /api/v1/books
pub async fn handle_create_book(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookRow>), AppError> {
    let title = validate_title(&req.title)?;
    req.typography.validate()?;

    let book = store::insert_book(
        &state.db,
        NewBook {
            user_id: params.user_id,
            title,
            description: req.description.as_deref(),
            genre: req.genre.as_deref(),
            typography: req.typography,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /api/v1/books/:book_id
pub async fn handle_get_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<BookRow>, AppError> {
    Ok(Json(load_owned_book(&state, book_id, params.user_id).await?))
}

/// PATCH /api/v1/books/:book_id
pub async fn handle_update_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookRow>, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;

    let title = req.title.as_deref().map(validate_title).transpose()?;
    if let Some(typography) = &req.typography {
        typography.validate()?;
    }

    let book = store::update_book(
        &state.db,
        book_id,
        BookChanges {
            title,
            description: FieldUpdate::from_request(req.description.as_deref()),
            genre: FieldUpdate::from_request(req.genre.as_deref()),
            typography: req.typography,
        },
    )
    .await?;
    Ok(Json(book))
}

/// DELETE /api/v1/books/:book_id
pub async fn handle_delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    store::delete_book(&state.db, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/books/:book_id/stats
pub async fn handle_book_stats(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<BookStatsResponse>, AppError> {
    let book = load_owned_book(&state, book_id, params.user_id).await?;
    let chapters = store::list_chapters(&state.db, book_id).await?;
    let typography = book.typography();

    let summary = tokio::task::spawn_blocking(move || summarize_book(&typography, &chapters))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in book stats: {e}")))??;

    Ok(Json(BookStatsResponse { book_id, summary }))
}

// ────────────────────────────────────────────────────────────────────────────
// Chapters
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/books/:book_id/chapters
pub async fn handle_list_chapters(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ChapterRow>>, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    Ok(Json(store::list_chapters(&state.db, book_id).await?))
}

/// POST /api/v1/books/:book_id/chapters
pub async fn handle_create_chapter(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<(StatusCode, Json<ChapterRow>), AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    let title = validate_title(&req.title)?;
    validate_position(req.position)?;

    let chapter = store::insert_chapter(
        &state.db,
        book_id,
        title,
        &req.content,
        word_count_i32(&req.content),
        req.position,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chapter)))
}

/// GET /api/v1/books/:book_id/chapters/:chapter_id
pub async fn handle_get_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ChapterRow>, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    Ok(Json(load_chapter(&state, book_id, chapter_id).await?))
}

/// PATCH /api/v1/books/:book_id/chapters/:chapter_id
pub async fn handle_update_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<UpdateChapterRequest>,
) -> Result<Json<ChapterRow>, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    let title = req.title.as_deref().map(validate_title).transpose()?;
    validate_position(req.position)?;

    let changes = ChapterChanges {
        title,
        content: req.content.as_deref(),
        word_count: req.content.as_deref().map(word_count_i32),
        position: req.position,
    };

    store::update_chapter(&state.db, book_id, chapter_id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Chapter {chapter_id} not found")))
}

/// DELETE /api/v1/books/:book_id/chapters/:chapter_id
pub async fn handle_delete_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    if store::delete_chapter(&state.db, book_id, chapter_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Chapter {chapter_id} not found")))
    }
}

/// GET /api/v1/books/:book_id/chapters/:chapter_id/pages
///
/// Paginates the chapter using the book's stored typography.
pub async fn handle_chapter_pages(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ChapterPagesResponse>, AppError> {
    let book = load_owned_book(&state, book_id, params.user_id).await?;
    let chapter = load_chapter(&state, book_id, chapter_id).await?;

    let pagination = paginate_blocking(chapter.content, book.typography()).await?;
    tracing::debug!(
        chapter_id = %chapter_id,
        pages = pagination.total_pages,
        "Paginated chapter"
    );

    Ok(Json(ChapterPagesResponse {
        chapter_id,
        title: chapter.title,
        pagination,
    }))
}

/// GET /api/v1/books/:book_id/chapters/:chapter_id/stats
pub async fn handle_chapter_stats(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ChapterStatsResponse>, AppError> {
    load_owned_book(&state, book_id, params.user_id).await?;
    let chapter = load_chapter(&state, book_id, chapter_id).await?;
    Ok(Json(ChapterStatsResponse {
        chapter_id,
        stats: TextStats::from_text(&chapter.content),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json as SqlJson;

    fn make_book(user_id: Uuid) -> BookRow {
        BookRow {
            id: Uuid::new_v4(),
            user_id,
            title: "The Lighthouse".to_string(),
            description: None,
            genre: Some("literary".to_string()),
            typography: SqlJson(TypographyConfig::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_owner_allows_owner() {
        let owner = Uuid::new_v4();
        assert!(check_owner(&make_book(owner), owner).is_ok());
    }

    #[test]
    fn test_check_owner_rejects_other_user() {
        let book = make_book(Uuid::new_v4());
        assert!(matches!(
            check_owner(&book, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  Part One  ").unwrap(), "Part One");
    }

    #[test]
    fn test_validate_title_rejects_blank() {
        assert!(matches!(
            validate_title("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_title_rejects_oversized() {
        let long = "a".repeat(MAX_TITLE_CHARS + 1);
        assert!(validate_title(&long).is_err());
        assert!(validate_title(&"a".repeat(MAX_TITLE_CHARS)).is_ok());
    }

    #[test]
    fn test_validate_position() {
        assert!(validate_position(None).is_ok());
        assert!(validate_position(Some(0)).is_ok());
        assert!(validate_position(Some(-1)).is_err());
    }

    #[test]
    fn test_word_count_i32_uses_shared_rule() {
        assert_eq!(word_count_i32("Hello <b>world</b>   foo"), 3);
        assert_eq!(word_count_i32(""), 0);
    }

    #[test]
    fn test_create_book_request_defaults_typography() {
        let req: CreateBookRequest = serde_json::from_str(r#"{"title": "Draft"}"#).unwrap();
        assert_eq!(req.typography, TypographyConfig::default());
        assert!(req.description.is_none());
    }

    #[test]
    fn test_update_request_blank_fields_clear() {
        let req: UpdateBookRequest =
            serde_json::from_str(r#"{"description": "", "genre": "  "}"#).unwrap();
        assert_eq!(
            FieldUpdate::from_request(req.description.as_deref()),
            FieldUpdate::Clear
        );
        assert_eq!(FieldUpdate::from_request(req.genre.as_deref()), FieldUpdate::Clear);
    }

    #[test]
    fn test_update_request_absent_fields_kept() {
        let req: UpdateBookRequest = serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        assert_eq!(
            FieldUpdate::from_request(req.description.as_deref()),
            FieldUpdate::Keep
        );
        assert_eq!(FieldUpdate::from_request(req.genre.as_deref()), FieldUpdate::Keep);
    }

    #[test]
    fn test_update_request_text_sets_field() {
        let req: UpdateBookRequest = serde_json::from_str(r#"{"genre": "noir"}"#).unwrap();
        assert_eq!(
            FieldUpdate::from_request(req.genre.as_deref()),
            FieldUpdate::Set("noir")
        );
    }
}
