//! Per-book statistics: text counts plus printed page counts under the book's typography.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::{page_layout, paginate, CharMetrics, LayoutError, TextStats, TypographyConfig};
use crate::models::chapter::ChapterRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub chapter_id: Uuid,
    pub title: String,
    pub position: i32,
    pub stats: TextStats,
    /// Pages this chapter occupies when printed on its own.
    pub printed_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub chapter_count: usize,
    pub totals: TextStats,
    pub printed_pages: usize,
    pub chapters: Vec<ChapterSummary>,
}

/// Summarizes chapters in the order given. Each chapter starts on a new page.
pub fn summarize_book(
    typography: &TypographyConfig,
    chapters: &[ChapterRow],
) -> Result<BookSummary, LayoutError> {
    let layout = page_layout(typography, &CharMetrics::default())?;

    let summaries: Vec<ChapterSummary> = chapters
        .iter()
        .map(|c| ChapterSummary {
            chapter_id: c.id,
            title: c.title.clone(),
            position: c.position,
            stats: TextStats::from_text(&c.content),
            printed_pages: paginate(&c.content, &layout).len(),
        })
        .collect();

    Ok(BookSummary {
        chapter_count: summaries.len(),
        totals: TextStats::combine(summaries.iter().map(|s| &s.stats)),
        printed_pages: summaries.iter().map(|s| s.printed_pages).sum(),
        chapters: summaries,
    })
}
