use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChapterRow {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub content: String,
    /// Zero-based reading order within the book.
    pub position: i32,
    /// Cached `count_words(content)`, refreshed on every write.
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
