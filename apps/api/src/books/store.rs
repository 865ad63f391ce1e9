use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::layout::TypographyConfig;
use crate::models::book::BookRow;
use crate::models::chapter::ChapterRow;

/// Fields for a new book row.
pub struct NewBook<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub typography: TypographyConfig,
}

/// Change to a nullable text column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldUpdate<'a> {
    #[default]
    Keep,
    Clear,
    Set(&'a str),
}

impl<'a> FieldUpdate<'a> {
    /// Absent keeps the column; an empty or blank string clears it.
    pub fn from_request(value: Option<&'a str>) -> Self {
        match value {
            None => FieldUpdate::Keep,
            Some(v) if v.trim().is_empty() => FieldUpdate::Clear,
            Some(v) => FieldUpdate::Set(v),
        }
    }

    fn applies(&self) -> bool {
        !matches!(self, FieldUpdate::Keep)
    }

    fn value(&self) -> Option<&'a str> {
        match *self {
            FieldUpdate::Set(v) => Some(v),
            FieldUpdate::Keep | FieldUpdate::Clear => None,
        }
    }
}

/// Partial book update. `None` leaves the column unchanged.
#[derive(Default)]
pub struct BookChanges<'a> {
    pub title: Option<&'a str>,
    pub description: FieldUpdate<'a>,
    pub genre: FieldUpdate<'a>,
    pub typography: Option<TypographyConfig>,
}

/// Partial chapter update. `word_count` must accompany `content`.
#[derive(Default)]
pub struct ChapterChanges<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub word_count: Option<i32>,
    pub position: Option<i32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Books
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_books(pool: &PgPool, user_id: Uuid) -> Result<Vec<BookRow>, sqlx::Error> {
    sqlx::query_as::<_, BookRow>(
        "SELECT * FROM books WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_book(pool: &PgPool, book_id: Uuid) -> Result<Option<BookRow>, sqlx::Error> {
    sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
        .bind(book_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_book(pool: &PgPool, book: NewBook<'_>) -> Result<BookRow, sqlx::Error> {
    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        INSERT INTO books (id, user_id, title, description, genre, typography)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(book.user_id)
    .bind(book.title)
    .bind(book.description)
    .bind(book.genre)
    .bind(Json(book.typography))
    .fetch_one(pool)
    .await?;

    info!(book_id = %id, user_id = %book.user_id, "Created book");
    Ok(row)
}

pub async fn update_book(
    pool: &PgPool,
    book_id: Uuid,
    changes: BookChanges<'_>,
) -> Result<BookRow, sqlx::Error> {
    sqlx::query_as::<_, BookRow>(
        r#"
        UPDATE books SET
            title       = COALESCE($2, title),
            description = CASE WHEN $3 THEN $4 ELSE description END,
            genre       = CASE WHEN $5 THEN $6 ELSE genre END,
            typography  = COALESCE($7, typography),
            updated_at  = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(book_id)
    .bind(changes.title)
    .bind(changes.description.applies())
    .bind(changes.description.value())
    .bind(changes.genre.applies())
    .bind(changes.genre.value())
    .bind(changes.typography.map(Json))
    .fetch_one(pool)
    .await
}

/// Deletes a book; chapters go with it via `ON DELETE CASCADE`.
pub async fn delete_book(pool: &PgPool, book_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(book_id)
        .execute(pool)
        .await?;
    info!(book_id = %book_id, "Deleted book");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Chapters
// ────────────────────────────────────────────────────────────────────────────

/// Chapters of a book in reading order.
pub async fn list_chapters(pool: &PgPool, book_id: Uuid) -> Result<Vec<ChapterRow>, sqlx::Error> {
    sqlx::query_as::<_, ChapterRow>(
        "SELECT * FROM chapters WHERE book_id = $1 ORDER BY position, created_at",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
}

pub async fn get_chapter(
    pool: &PgPool,
    book_id: Uuid,
    chapter_id: Uuid,
) -> Result<Option<ChapterRow>, sqlx::Error> {
    sqlx::query_as::<_, ChapterRow>("SELECT * FROM chapters WHERE id = $1 AND book_id = $2")
        .bind(chapter_id)
        .bind(book_id)
        .fetch_optional(pool)
        .await
}

/// Inserts a chapter. Without an explicit `position` it is appended after the
/// current last chapter.
pub async fn insert_chapter(
    pool: &PgPool,
    book_id: Uuid,
    title: &str,
    content: &str,
    word_count: i32,
    position: Option<i32>,
) -> Result<ChapterRow, sqlx::Error> {
    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, ChapterRow>(
        r#"
        INSERT INTO chapters (id, book_id, title, content, word_count, position)
        VALUES (
            $1, $2, $3, $4, $5,
            COALESCE($6, (SELECT COALESCE(MAX(position) + 1, 0) FROM chapters WHERE book_id = $2))
        )
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(book_id)
    .bind(title)
    .bind(content)
    .bind(word_count)
    .bind(position)
    .fetch_one(pool)
    .await?;

    info!(chapter_id = %id, book_id = %book_id, position = row.position, "Created chapter");
    Ok(row)
}

pub async fn update_chapter(
    pool: &PgPool,
    book_id: Uuid,
    chapter_id: Uuid,
    changes: ChapterChanges<'_>,
) -> Result<Option<ChapterRow>, sqlx::Error> {
    sqlx::query_as::<_, ChapterRow>(
        r#"
        UPDATE chapters SET
            title      = COALESCE($3, title),
            content    = COALESCE($4, content),
            word_count = COALESCE($5, word_count),
            position   = COALESCE($6, position),
            updated_at = now()
        WHERE id = $1 AND book_id = $2
        RETURNING *
        "#,
    )
    .bind(chapter_id)
    .bind(book_id)
    .bind(changes.title)
    .bind(changes.content)
    .bind(changes.word_count)
    .bind(changes.position)
    .fetch_optional(pool)
    .await
}

/// Returns `true` if a row was removed.
pub async fn delete_chapter(
    pool: &PgPool,
    book_id: Uuid,
    chapter_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = $1 AND book_id = $2")
        .bind(chapter_id)
        .bind(book_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
