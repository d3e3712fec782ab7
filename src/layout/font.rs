//! Font metrics for the computed surface

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
    /// Width of wide (CJK) characters
    pub wide_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px * 1.2 = 16.8
        let default_width = 8.41;
        Self {
            line_height: 16.8,
            char_widths: vec![default_width; 128],
            default_width,
            wide_width: 14.0,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
            wide_width: default_width,
        }
    }

    /// Uniform metrics: every character has the same width
    pub fn monospace(line_height: f32, char_width: f32) -> Self {
        Self {
            line_height,
            char_widths: vec![char_width; 128],
            default_width: char_width,
            wide_width: char_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if is_wide(c) {
            return self.wide_width;
        }
        self.default_width
    }
}

/// CJK ideographs, kana and full-width forms take a full em
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}
