//! Word/character counting and reading estimates shared by pagination, chapter
//! writes and the stats endpoints.

use serde::{Deserialize, Serialize};

/// Average adult silent-reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Words on a typical manuscript page.
pub const DEFAULT_WORDS_PER_PAGE: usize = 250;

/// Counts words after treating `<...>` tags as whitespace.
///
/// An unterminated `<` is kept as literal text.
pub fn count_words(text: &str) -> usize {
    strip_tags(text).split_whitespace().count()
}

/// Number of characters (Unicode scalar values), whitespace included.
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// Number of characters excluding whitespace.
pub fn count_characters_no_spaces(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Minutes needed to read `word_count` words at [`WORDS_PER_MINUTE`], rounded up.
pub fn estimate_reading_time(word_count: usize) -> usize {
    estimate_reading_time_at(word_count, WORDS_PER_MINUTE)
}

/// Minutes needed to read `word_count` words at `words_per_minute`, rounded up.
/// A rate of 0 is treated as 1.
pub fn estimate_reading_time_at(word_count: usize, words_per_minute: usize) -> usize {
    word_count.div_ceil(words_per_minute.max(1))
}

/// Manuscript page estimate: 0 for no words, otherwise at least one page.
/// A `words_per_page` of 0 is treated as 1.
pub fn estimate_pages(word_count: usize, words_per_page: usize) -> usize {
    if word_count == 0 {
        return 0;
    }
    word_count.div_ceil(words_per_page.max(1)).max(1)
}

/// Replaces every complete `<...>` span with a single space.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        match after_open.find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                out.push(' ');
                rest = &after_open[close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Aggregate counts for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub reading_time_minutes: usize,
    pub estimated_pages: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let word_count = count_words(text);
        Self {
            word_count,
            character_count: count_characters(text),
            character_count_no_spaces: count_characters_no_spaces(text),
            reading_time_minutes: estimate_reading_time(word_count),
            estimated_pages: estimate_pages(word_count, DEFAULT_WORDS_PER_PAGE),
        }
    }

    /// Sums counts and recomputes the estimates from the combined word count.
    pub fn combine<'a>(items: impl IntoIterator<Item = &'a TextStats>) -> Self {
        let (word_count, character_count, character_count_no_spaces) = items
            .into_iter()
            .fold((0, 0, 0), |(w, c, n), s| {
                (
                    w + s.word_count,
                    c + s.character_count,
                    n + s.character_count_no_spaces,
                )
            });
        Self {
            word_count,
            character_count,
            character_count_no_spaces,
            reading_time_minutes: estimate_reading_time(word_count),
            estimated_pages: estimate_pages(word_count, DEFAULT_WORDS_PER_PAGE),
        }
    }
}
