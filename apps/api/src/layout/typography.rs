//! Typography settings and the page geometry derived from them.
//!
//! Character widths are approximated by a single average width in em units
//! (relative to font size). The result is a page-break estimate, not glyph
//! placement.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Character metrics
// ────────────────────────────────────────────────────────────────────────────

/// PostScript / desktop-publishing points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Average glyph advance as a fraction of the font size for body text.
pub const AVERAGE_CHAR_WIDTH_EM: f64 = 0.5;

/// Tunable measurement constants used when converting a page into capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharMetrics {
    pub points_per_inch: f64,
    /// Average character width in em units at the configured font size.
    pub average_char_width_em: f64,
}

impl Default for CharMetrics {
    fn default() -> Self {
        Self {
            points_per_inch: POINTS_PER_INCH,
            average_char_width_em: AVERAGE_CHAR_WIDTH_EM,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typography configuration
// ────────────────────────────────────────────────────────────────────────────

/// Font, page and margin parameters for a printed book.
///
/// Missing fields deserialize to the trade-paperback defaults
/// (12pt, 1.5 line height, 6" × 9", 1" margins), so a partially stored
/// settings object still produces a complete configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyConfig {
    pub font_size_pt: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub margin_top_in: f64,
    pub margin_bottom_in: f64,
    pub margin_left_in: f64,
    pub margin_right_in: f64,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            font_size_pt: 12.0,
            line_height: 1.5,
            page_width_in: 6.0,
            page_height_in: 9.0,
            margin_top_in: 1.0,
            margin_bottom_in: 1.0,
            margin_left_in: 1.0,
            margin_right_in: 1.0,
        }
    }
}

impl TypographyConfig {
    /// Checks every field against its range. The first violation wins.
    pub fn validate(&self) -> Result<(), LayoutError> {
        require_positive("font_size_pt", self.font_size_pt)?;
        require_positive("line_height", self.line_height)?;
        require_positive("page_width_in", self.page_width_in)?;
        require_positive("page_height_in", self.page_height_in)?;
        require_non_negative("margin_top_in", self.margin_top_in)?;
        require_non_negative("margin_bottom_in", self.margin_bottom_in)?;
        require_non_negative("margin_left_in", self.margin_left_in)?;
        require_non_negative("margin_right_in", self.margin_right_in)?;

        require_under_half("margin_left_in", self.margin_left_in, "width", self.page_width_in)?;
        require_under_half("margin_right_in", self.margin_right_in, "width", self.page_width_in)?;
        require_under_half("margin_top_in", self.margin_top_in, "height", self.page_height_in)?;
        require_under_half(
            "margin_bottom_in",
            self.margin_bottom_in,
            "height",
            self.page_height_in,
        )?;
        Ok(())
    }

    /// Width of the text block in inches.
    pub fn usable_width_in(&self) -> f64 {
        self.page_width_in - self.margin_left_in - self.margin_right_in
    }

    /// Height of the text block in inches.
    pub fn usable_height_in(&self) -> f64 {
        self.page_height_in - self.margin_top_in - self.margin_bottom_in
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::configuration(
            field,
            format!("must be a finite number greater than 0, got {value}"),
        ))
    }
}

/// Each margin must stay under half of its page dimension.
fn require_under_half(
    field: &'static str,
    margin: f64,
    dimension: &str,
    page: f64,
) -> Result<(), LayoutError> {
    if margin < page / 2.0 {
        Ok(())
    } else {
        Err(LayoutError::configuration(
            field,
            format!("must be less than half the page {dimension} ({}in), got {margin}in", page / 2.0),
        ))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::configuration(
            field,
            format!("must be a finite number of at least 0, got {value}"),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derived page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Capacity of one page, derived from a validated `TypographyConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    pub lines_per_page: usize,
    pub chars_per_line: usize,
    pub chars_per_page: usize,
}

/// Computes page capacity. Every count is clamped to at least 1 so pagination
/// always makes progress.
///
/// Arithmetic is done in points so that the common configurations divide
/// exactly: 7in × 72 / (12pt × 1.5) = 28 lines.
pub fn page_layout(
    typography: &TypographyConfig,
    metrics: &CharMetrics,
) -> Result<PageLayout, LayoutError> {
    typography.validate()?;
    if !(metrics.points_per_inch.is_finite() && metrics.points_per_inch > 0.0) {
        return Err(LayoutError::configuration(
            "points_per_inch",
            format!("must be greater than 0, got {}", metrics.points_per_inch),
        ));
    }
    if !(metrics.average_char_width_em.is_finite() && metrics.average_char_width_em > 0.0) {
        return Err(LayoutError::configuration(
            "average_char_width_em",
            format!(
                "must be greater than 0, got {}",
                metrics.average_char_width_em
            ),
        ));
    }

    let usable_height_pt = typography.usable_height_in() * metrics.points_per_inch;
    let usable_width_pt = typography.usable_width_in() * metrics.points_per_inch;

    let line_pitch_pt = typography.font_size_pt * typography.line_height;
    let char_width_pt = typography.font_size_pt * metrics.average_char_width_em;

    let lines_per_page = floor_at_least_one(usable_height_pt / line_pitch_pt);
    let chars_per_line = floor_at_least_one(usable_width_pt / char_width_pt);

    Ok(PageLayout {
        lines_per_page,
        chars_per_line,
        chars_per_page: lines_per_page.saturating_mul(chars_per_line),
    })
}

fn floor_at_least_one(value: f64) -> usize {
    // `as` saturates on overflow; NaN cannot reach here after validation.
    (value.floor() as usize).max(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
