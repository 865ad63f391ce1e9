//! Plain-text manuscript export.
//!
//! Chapters are paginated with the book's typography and written out in order.
//! Each chapter starts on a fresh page; page numbers run continuously across
//! the whole book.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::layout::{count_words, page_layout, page_texts, paginate, CharMetrics, LayoutError};
use crate::models::book::BookRow;
use crate::models::chapter::ChapterRow;

#[derive(Debug, Clone)]
pub struct Manuscript {
    pub body: String,
    pub total_pages: usize,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub book_id: Uuid,
    pub s3_key: String,
    pub total_pages: usize,
    pub word_count: usize,
    pub chapter_count: usize,
    pub exported_at: DateTime<Utc>,
}

/// Renders the book into a paginated plain-text manuscript.
pub fn render_manuscript(book: &BookRow, chapters: &[ChapterRow]) -> Result<Manuscript, LayoutError> {
    let layout = page_layout(&book.typography(), &CharMetrics::default())?;

    let mut body = String::new();
    let mut page_number = 0usize;
    let mut word_count = 0usize;

    body.push_str(book.title.trim());
    body.push('\n');
    if let Some(genre) = book.genre.as_deref().filter(|g| !g.trim().is_empty()) {
        body.push_str(genre.trim());
        body.push('\n');
    }

    for (index, chapter) in chapters.iter().enumerate() {
        body.push_str(&format!(
            "\n=== Chapter {}: {} ===\n",
            index + 1,
            chapter.title.trim()
        ));
        word_count += count_words(&chapter.content);

        let pages = paginate(&chapter.content, &layout);
        for content in page_texts(&chapter.content, &pages) {
            page_number += 1;
            body.push_str(&format!("\n[Page {page_number}]\n{}\n", content.trim()));
        }
    }

    Ok(Manuscript {
        body,
        total_pages: page_number,
        word_count,
    })
}

/// Object key for an export: `exports/{user}/{book}/{timestamp}.txt`.
pub fn export_key(user_id: Uuid, book_id: Uuid, at: DateTime<Utc>) -> String {
    format!(
        "exports/{}/{}/{}.txt",
        user_id,
        book_id,
        at.format("%Y%m%dT%H%M%SZ")
    )
}

/// Uploads a rendered manuscript to S3.
pub async fn upload_manuscript(
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    s3_key: &str,
    manuscript: &Manuscript,
) -> Result<()> {
    s3.put_object()
        .bucket(s3_bucket)
        .key(s3_key)
        .body(ByteStream::from(manuscript.body.clone().into_bytes()))
        .content_type("text/plain; charset=utf-8")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded manuscript to s3://{}/{}", s3_bucket, s3_key);
    Ok(())
}
