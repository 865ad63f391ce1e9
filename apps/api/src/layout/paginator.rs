//! Greedy chapter pagination — splits text into printed pages by estimated capacity.
//!
//! # Break rules
//! - A page holds at most `chars_per_page` characters (see `page_layout`).
//! - A break never lands between two non-whitespace characters; it backs off to
//!   the latest whitespace inside the page instead.
//! - A single token longer than a page is hard-split at the capacity limit.
//!
//! Offsets are character offsets (Unicode scalar values), not byte offsets.
//! Pages are contiguous and together cover the whole input.

use serde::{Deserialize, Serialize};

use crate::layout::text_stats::count_words;
use crate::layout::typography::{page_layout, CharMetrics, PageLayout, TypographyConfig};
use crate::layout::LayoutError;

/// One computed page: the span of input text it covers plus its counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// 1-based, no gaps.
    pub page_number: usize,
    /// Inclusive character offset into the input.
    pub start_offset: usize,
    /// Exclusive character offset into the input.
    pub end_offset: usize,
    pub word_count: usize,
    pub character_count: usize,
}

/// Paginates `text` with the default character metrics.
pub fn compute_pages(
    text: &str,
    typography: &TypographyConfig,
) -> Result<Vec<PageDescriptor>, LayoutError> {
    compute_pages_with(text, typography, &CharMetrics::default())
}

/// Paginates `text` with explicit character metrics.
///
/// The configuration is validated before any text is examined; on error no
/// pages are produced. Empty text yields an empty vector.
pub fn compute_pages_with(
    text: &str,
    typography: &TypographyConfig,
    metrics: &CharMetrics,
) -> Result<Vec<PageDescriptor>, LayoutError> {
    let layout = page_layout(typography, metrics)?;
    Ok(paginate(text, &layout))
}

/// Splits `text` into pages of at most `layout.chars_per_page` characters.
pub fn paginate(text: &str, layout: &PageLayout) -> Vec<PageDescriptor> {
    // (byte_index, char) per character; byte index of char i is `chars[i].0`.
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let total = chars.len();
    let capacity = layout.chars_per_page.max(1);

    let byte_at = |i: usize| if i < total { chars[i].0 } else { text.len() };

    let mut pages = Vec::with_capacity(total / capacity + 1);
    let mut start = 0usize;

    while start < total {
        let end = next_break(&chars, start, capacity);
        let slice = &text[byte_at(start)..byte_at(end)];
        pages.push(PageDescriptor {
            page_number: pages.len() + 1,
            start_offset: start,
            end_offset: end,
            word_count: count_words(slice),
            character_count: end - start,
        });
        start = end;
    }

    pages
}

/// Returns the exclusive end offset of the page starting at `start`.
///
/// Always returns a value in `(start, chars.len()]`.
fn next_break(chars: &[(usize, char)], start: usize, capacity: usize) -> usize {
    let total = chars.len();
    let limit = start.saturating_add(capacity);
    if limit >= total {
        return total;
    }

    let is_ws = |i: usize| chars[i].1.is_whitespace();

    // Boundary already sits on whitespace on at least one side.
    if is_ws(limit - 1) || is_ws(limit) {
        return limit;
    }

    // Latest j in (start, limit) whose preceding character is whitespace.
    (start + 1..limit)
        .rev()
        .find(|&j| is_ws(j - 1))
        .unwrap_or(limit) // hard split: one token fills the whole page
}

/// Returns the text of each page, in order, in one pass over `text`.
///
/// Pages are expected in ascending offset order, as `paginate` produces them.
/// A page that starts before the previous one rewinds the cursor, so any
/// order still gives correct slices.
pub fn page_texts<'a>(
    text: &'a str,
    pages: &'a [PageDescriptor],
) -> impl Iterator<Item = &'a str> + 'a {
    let mut cursor = CharCursor::new(text);
    pages.iter().map(move |page| {
        let start = cursor.seek(page.start_offset);
        let end = cursor.seek(page.end_offset).max(start);
        &text[start..end]
    })
}

/// Character → byte offset mapping that walks forward; a backward seek restarts it.
struct CharCursor<'a> {
    text: &'a str,
    indices: std::str::CharIndices<'a>,
    /// Character offset the cursor sits on.
    offset: usize,
    /// Byte index of `offset` (or `text.len()` once exhausted).
    byte: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            indices: text.char_indices(),
            offset: 0,
            byte: 0,
        }
    }

    /// Moves to character `target` and returns its byte index, clamped to the text length.
    fn seek(&mut self, target: usize) -> usize {
        if target < self.offset {
            *self = Self::new(self.text);
        }
        while self.offset < target {
            match self.indices.next() {
                Some((b, c)) => {
                    self.byte = b + c.len_utf8();
                    self.offset += 1;
                }
                None => break,
            }
        }
        self.byte
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(chars_per_page: usize) -> PageLayout {
        PageLayout {
            lines_per_page: 1,
            chars_per_line: chars_per_page,
            chars_per_page,
        }
    }

    /// Slices a page by walking characters from the start of the text.
    fn page_text(text: &str, page: &PageDescriptor) -> String {
        text.chars()
            .skip(page.start_offset)
            .take(page.end_offset.saturating_sub(page.start_offset))
            .collect()
    }

    fn reassemble(text: &str, pages: &[PageDescriptor]) -> String {
        pages.iter().map(|p| page_text(text, p)).collect()
    }

    fn assert_well_formed(text: &str, pages: &[PageDescriptor]) {
        assert_eq!(reassemble(text, pages), text, "pages must partition the text");
        for (i, p) in pages.iter().enumerate() {
            assert_eq!(p.page_number, i + 1, "page numbers must be 1..=n");
            assert!(p.start_offset < p.end_offset, "pages must be non-empty");
            if let Some(next) = pages.get(i + 1) {
                assert_eq!(p.end_offset, next.start_offset, "pages must be contiguous");
            }
        }
        if let Some(last) = pages.last() {
            assert_eq!(last.end_offset, text.chars().count());
        }
    }

    /// Interior break must not sit between two non-whitespace chars unless the
    /// page is a full-capacity hard split of one token.
    fn assert_no_mid_word_breaks(text: &str, pages: &[PageDescriptor], capacity: usize) {
        let chars: Vec<char> = text.chars().collect();
        for p in &pages[..pages.len().saturating_sub(1)] {
            let before = chars[p.end_offset - 1];
            let after = chars[p.end_offset];
            if !before.is_whitespace() && !after.is_whitespace() {
                let body = &chars[p.start_offset..p.end_offset];
                assert!(
                    body.iter().all(|c| !c.is_whitespace()) && body.len() == capacity,
                    "mid-word break on page {} that is not a hard split",
                    p.page_number
                );
            }
        }
    }

    // ── basic behaviour ─────────────────────────────────────────────────────

    #[test]
    fn test_empty_text_yields_no_pages() {
        let pages = compute_pages("", &TypographyConfig::default()).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_short_text_is_one_page() {
        let text = "It was a dark and stormy night.";
        let pages = compute_pages(text, &TypographyConfig::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].start_offset, 0);
        assert_eq!(pages[0].end_offset, text.chars().count());
        assert_eq!(pages[0].word_count, 7);
        assert_eq!(pages[0].character_count, text.chars().count());
    }

    #[test]
    fn test_exact_capacity_is_one_page() {
        let text = "abcd efgh";
        let pages = paginate(text, &layout(9));
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_break_backs_off_to_whitespace() {
        // capacity 8: "hello wo|rld" → back off to after "hello "
        let text = "hello world";
        let pages = paginate(text, &layout(8));
        assert_eq!(pages.len(), 2);
        assert_eq!(page_text(text, &pages[0]), "hello ");
        assert_eq!(page_text(text, &pages[1]), "world");
        assert_eq!(pages[0].word_count, 1);
        assert_eq!(pages[1].word_count, 1);
    }

    #[test]
    fn test_break_on_whitespace_boundary_kept() {
        // capacity 5: "hello| world" → boundary already before a space.
        // Next page " worl|d" backs off to just after the leading space.
        let text = "hello world";
        let pages = paginate(text, &layout(5));
        assert_eq!(pages.len(), 3);
        assert_eq!(page_text(text, &pages[0]), "hello");
        assert_eq!(page_text(text, &pages[1]), " ");
        assert_eq!(page_text(text, &pages[2]), "world");
    }

    #[test]
    fn test_long_token_is_hard_split() {
        let text = "x".repeat(25);
        let pages = paginate(&text, &layout(10));
        let lens: Vec<usize> = pages.iter().map(|p| p.character_count).collect();
        assert_eq!(lens, vec![10, 10, 5]);
        assert_well_formed(&text, &pages);
    }

    #[test]
    fn test_url_after_short_word() {
        let text = "see https://example.com/a/very/long/path/that/never/ends";
        let pages = paginate(text, &layout(12));
        assert_eq!(page_text(text, &pages[0]), "see ");
        assert_well_formed(text, &pages);
        assert_no_mid_word_breaks(text, &pages, 12);
    }

    #[test]
    fn test_whitespace_only_text_still_paginated() {
        let text = " ".repeat(30);
        let pages = paginate(&text, &layout(10));
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.word_count == 0));
        assert_well_formed(&text, &pages);
    }

    #[test]
    fn test_capacity_one_makes_progress() {
        let text = "ab c";
        let pages = paginate(text, &layout(1));
        assert_eq!(pages.len(), 4);
        assert_well_formed(text, &pages);
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let text = "café crème brûlée à la carte";
        let pages = paginate(text, &layout(7));
        assert_well_formed(text, &pages);
        assert_no_mid_word_breaks(text, &pages, 7);
        let total: usize = pages.iter().map(|p| p.character_count).sum();
        assert_eq!(total, text.chars().count());
    }

    #[test]
    fn test_markup_is_literal_text() {
        let text = "<p>Chapter one</p>";
        let pages = paginate(text, &layout(100));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].character_count, text.len());
        assert_eq!(pages[0].word_count, 2);
    }

    // ── properties over a realistic chapter ─────────────────────────────────

    fn sample_chapter() -> String {
        let paragraph = "The lighthouse keeper climbed the spiral stairs each evening, \
                         counting steps aloud as the fog rolled over the harbour. \
                         Nobody in the village remembered when the lamp had last failed.\n\n";
        let mut text = paragraph.repeat(40);
        text.push_str("https://archive.example.org/records/lighthouse/logbook/1887/volume-three/entries");
        text
    }

    #[test]
    fn test_partition_contiguity_and_numbering() {
        let text = sample_chapter();
        let pages = compute_pages(&text, &TypographyConfig::default()).unwrap();
        assert!(pages.len() > 1, "sample chapter should span several pages");
        assert_well_formed(&text, &pages);
    }

    #[test]
    fn test_no_mid_word_splits_on_sample() {
        let text = sample_chapter();
        for capacity in [7, 13, 40, 97, 500] {
            let pages = paginate(&text, &layout(capacity));
            assert_well_formed(&text, &pages);
            assert_no_mid_word_breaks(&text, &pages, capacity);
            assert!(pages.iter().all(|p| p.character_count <= capacity));
        }
    }

    #[test]
    fn test_page_word_counts_sum_to_total() {
        let text = sample_chapter();
        let pages = compute_pages(&text, &TypographyConfig::default()).unwrap();
        let sum: usize = pages.iter().map(|p| p.word_count).sum();
        assert_eq!(sum, count_words(&text));
    }

    #[test]
    fn test_deterministic_output() {
        let text = sample_chapter();
        let t = TypographyConfig::default();
        let a = compute_pages(&text, &t).unwrap();
        let b = compute_pages(&text, &t).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn test_larger_font_yields_more_pages() {
        let text = sample_chapter();
        let small = compute_pages(&text, &TypographyConfig::default()).unwrap();
        let large = compute_pages(
            &text,
            &TypographyConfig {
                font_size_pt: 16.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(large.len() > small.len());
    }

    // ── configuration errors ────────────────────────────────────────────────

    #[test]
    fn test_zero_font_size_rejected_without_pages() {
        let t = TypographyConfig {
            font_size_pt: 0.0,
            ..Default::default()
        };
        let result = compute_pages("some text", &t);
        assert!(matches!(result, Err(LayoutError::Configuration { .. })));
    }

    #[test]
    fn test_margins_wider_than_page_rejected() {
        let t = TypographyConfig {
            margin_left_in: 3.5,
            margin_right_in: 3.0,
            ..Default::default()
        };
        assert!(compute_pages("some text", &t).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_even_for_empty_text() {
        let t = TypographyConfig {
            line_height: -1.0,
            ..Default::default()
        };
        assert!(compute_pages("", &t).is_err());
    }

    // ── page_texts ──────────────────────────────────────────────────────────

    #[test]
    fn test_page_texts_matches_char_walk() {
        let text = "café crème brûlée à la carte, s'il vous plaît";
        let pages = paginate(text, &layout(9));
        let batched: Vec<&str> = page_texts(text, &pages).collect();
        let single: Vec<String> = pages.iter().map(|p| page_text(text, p)).collect();
        assert_eq!(batched, single);
        assert_eq!(batched.concat(), text);
    }

    #[test]
    fn test_page_texts_long_chapter_reassembles() {
        // Many pages over one long text; each page is sliced from a single cursor.
        let text = "word ".repeat(400_000);
        let pages = compute_pages(&text, &TypographyConfig::default()).unwrap();
        assert!(pages.len() > 1000);
        let mut total = 0usize;
        for (page, slice) in pages.iter().zip(page_texts(&text, &pages)) {
            assert_eq!(slice.len(), page.character_count);
            total += slice.len();
        }
        assert_eq!(total, text.len());
    }

    #[test]
    fn test_page_texts_out_of_order_rewinds() {
        let text = "alpha beta gamma";
        let mut pages = paginate(text, &layout(6));
        pages.reverse();
        let slices: Vec<&str> = page_texts(text, &pages).collect();
        let expected: Vec<String> = pages.iter().map(|p| page_text(text, p)).collect();
        assert_eq!(slices, expected);
    }

    #[test]
    fn test_page_texts_clamps_past_end() {
        let page = PageDescriptor {
            page_number: 1,
            start_offset: 3,
            end_offset: 60,
            word_count: 0,
            character_count: 57,
        };
        let slices: Vec<&str> = page_texts("short", std::slice::from_ref(&page)).collect();
        assert_eq!(slices, vec!["rt"]);
    }
}
