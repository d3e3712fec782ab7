//! Line breaking for the computed surface

use crate::document::NodeKind;
use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Layout result for a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Byte range of the text this line covers
    pub byte_range: Range<usize>,
    /// Line height
    pub height: f32,
    /// Actual width of content
    pub width: f32,
}

/// Layout result for a block of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<LineLayout>,
    /// Total height including spacing after the block
    pub total_height: f32,
}

impl TextLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Line breaker
#[derive(Debug, Default, Clone)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Layout the text of a block into lines no wider than `max_width`
    pub fn layout_text(
        &self,
        text: &str,
        kind: NodeKind,
        max_width: f32,
        metrics: &FontMetrics,
    ) -> TextLayout {
        let line_height = metrics.line_height * kind.line_height_multiplier();
        let mut lines = Vec::new();

        if text.is_empty() {
            // Empty block still has one line
            lines.push(LineLayout {
                byte_range: 0..0,
                height: line_height,
                width: 0.0,
            });
        } else {
            let mut line_start = 0;
            let mut line_width: f32 = 0.0;
            let mut prev = 0;

            for (idx, opportunity) in linebreaks(text) {
                let segment = &text[prev..idx];
                let content = segment.trim_end_matches(['\n', '\r']);
                let width = text_width(content, metrics);
                let trailing = text_width(&content[content.trim_end().len()..], metrics);

                // Soft wrap before this segment
                if line_width > 0.0 && line_width + width - trailing > max_width {
                    lines.push(LineLayout {
                        byte_range: line_start..prev,
                        height: line_height,
                        width: line_width,
                    });
                    line_start = prev;
                    line_width = 0.0;
                }

                if width - trailing > max_width {
                    // Emergency break inside an over-long segment
                    for (offset, grapheme) in content.grapheme_indices(true) {
                        let w = text_width(grapheme, metrics);
                        if line_width > 0.0 && line_width + w > max_width {
                            lines.push(LineLayout {
                                byte_range: line_start..prev + offset,
                                height: line_height,
                                width: line_width,
                            });
                            line_start = prev + offset;
                            line_width = 0.0;
                        }
                        line_width += w;
                    }
                } else {
                    line_width += width;
                }

                if opportunity == BreakOpportunity::Mandatory {
                    lines.push(LineLayout {
                        byte_range: line_start..prev + content.len(),
                        height: line_height,
                        width: line_width,
                    });
                    line_start = idx;
                    line_width = 0.0;
                }
                prev = idx;
            }
        }

        let total_height = lines.iter().map(|l| l.height).sum::<f32>()
            + kind.spacing_after() * metrics.line_height;

        TextLayout { lines, total_height }
    }
}

fn text_width(text: &str, metrics: &FontMetrics) -> f32 {
    text.graphemes(true)
        .map(|g| {
            if g == "\t" {
                metrics.default_width * 4.0
            } else if g.chars().all(char::is_control) {
                0.0
            } else {
                g.chars().map(|c| metrics.width(c)).sum()
            }
        })
        .sum()
}
