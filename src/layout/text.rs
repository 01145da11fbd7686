//! Label size estimation without a font engine.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Fixed per-character approximation of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    /// Advance of one display column, px
    pub char_width: f64,
    pub line_height: f64,
    /// Inner padding on every side of the box, px
    pub padding: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
            padding: 10.0,
        }
    }
}

impl TextMetrics {
    /// Display columns that fit on one line of a box `max_width_px` wide; at least 1.
    pub fn chars_per_line(&self, max_width_px: f64) -> usize {
        let budget = ((max_width_px - 2.0 * self.padding) / self.char_width).floor();
        if budget.is_finite() && budget >= 1.0 {
            budget as usize
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f64,
    pub height: f64,
}

/// Greedy word wrap of `text` into a box `max_width_px` wide.
///
/// A word longer than the line budget is kept whole on a line of its own.
pub fn estimate_text_block_size(text: &str, max_width_px: f64, metrics: &TextMetrics) -> TextBlock {
    let budget = metrics.chars_per_line(max_width_px);
    let lines = wrap_words(text, budget);

    TextBlock {
        height: lines.len() as f64 * metrics.line_height + 2.0 * metrics.padding,
        width: max_width_px,
        lines,
    }
}

fn wrap_words(text: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let projected = current.width() + 1 + word.width();
        if projected > budget {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_default_metrics_when_computing_budget_then_seventeen_columns() {
        assert_eq!(TextMetrics::default().chars_per_line(140.0), 17);
        assert_eq!(TextMetrics::default().chars_per_line(5.0), 1);
    }

    #[test]
    fn given_long_label_when_estimating_then_wraps_into_several_lines() {
        let block = estimate_text_block_size(
            "Photosynthesis converts light energy into chemical energy",
            140.0,
            &TextMetrics::default(),
        );

        assert!(block.lines.len() >= 2);
        assert!(block.lines.iter().all(|l| l.width() <= 17));
        assert_eq!(block.width, 140.0);
        assert_eq!(block.height, block.lines.len() as f64 * 14.0 + 20.0);
        assert_eq!(
            block.lines.join(" "),
            "Photosynthesis converts light energy into chemical energy"
        );
    }

    #[rstest]
    #[case("", vec![""])]
    #[case("   ", vec![""])]
    #[case("short", vec!["short"])]
    #[case("antidisestablishmentarianism ok", vec!["antidisestablishmentarianism", "ok"])]
    #[case("exactly seventeen", vec!["exactly seventeen"])]
    fn given_label_when_wrapping_then_lines_match(#[case] text: &str, #[case] expected: Vec<&str>) {
        let block = estimate_text_block_size(text, 140.0, &TextMetrics::default());
        assert_eq!(block.lines, expected);
    }

    #[test]
    fn given_wide_characters_when_wrapping_then_counted_as_two_columns() {
        // 9 CJK characters = 18 columns, over the 17-column budget with the next word
        let block = estimate_text_block_size("光合作用是植物能量 转换", 140.0, &TextMetrics::default());
        assert_eq!(block.lines.len(), 2);
    }
}
