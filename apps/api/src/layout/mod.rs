// Print layout: typography geometry, greedy chapter pagination, text statistics.
// Everything here is pure and synchronous; HTTP handlers move large chapters
// onto tokio::task::spawn_blocking before calling in.

pub mod handlers;
pub mod paginator;
pub mod text_stats;
pub mod typography;

use thiserror::Error;

// Re-export the public API consumed by the book and export modules.
pub use paginator::{compute_pages, page_texts, paginate, PageDescriptor};
pub use text_stats::{count_words, TextStats};
pub use typography::{page_layout, CharMetrics, PageLayout, TypographyConfig};

#[derive(Debug, Error)]
pub enum LayoutError {
    /// A typography or metric field is outside its allowed range.
    #[error("Invalid typography setting '{field}': {reason}")]
    Configuration { field: &'static str, reason: String },
}

impl LayoutError {
    pub(crate) fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        LayoutError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}
