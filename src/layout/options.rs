//! Page geometry and the page option resolver

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Page dimensions in CSS pixels (96 DPI), portrait
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A3: PageSize = PageSize { width: 1123.0, height: 1587.0 };
    pub const A4: PageSize = PageSize { width: 794.0, height: 1123.0 };
    pub const A5: PageSize = PageSize { width: 559.0, height: 794.0 };
    pub const B5: PageSize = PageSize { width: 665.0, height: 944.0 };
    pub const LETTER: PageSize = PageSize { width: 816.0, height: 1056.0 };
    pub const LEGAL: PageSize = PageSize { width: 816.0, height: 1344.0 };

    /// Look up a named preset
    pub fn preset(name: &str) -> Option<PageSize> {
        match name.to_ascii_lowercase().as_str() {
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "b5" => Some(Self::B5),
            "letter" => Some(Self::LETTER),
            "legal" => Some(Self::LEGAL),
            _ => None,
        }
    }
}

/// Page margins in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        // 2.54cm top/bottom, 3.18cm left/right
        Self {
            top: 96.0,
            bottom: 96.0,
            left: 120.0,
            right: 120.0,
        }
    }
}

impl Margins {
    /// Equal margins on all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Active page configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    pub size: PageSize,
    pub margins: Margins,
    pub orientation: Orientation,
    /// Height reserved for the page header region
    pub header_height: f32,
    /// Height reserved for the page footer region
    pub footer_height: f32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margins: Margins::default(),
            orientation: Orientation::Portrait,
            header_height: 0.0,
            footer_height: 0.0,
        }
    }
}

impl PageOptions {
    /// Options whose body is exactly `height` tall, with no margins
    pub fn with_body_height(height: f32) -> Self {
        Self {
            size: PageSize {
                width: PageSize::A4.width,
                height,
            },
            margins: Margins::uniform(0.0),
            ..Self::default()
        }
    }

    /// Page width and height after applying the orientation
    pub fn oriented_size(&self) -> (f32, f32) {
        match self.orientation {
            Orientation::Portrait => (self.size.width, self.size.height),
            Orientation::Landscape => (self.size.height, self.size.width),
        }
    }

    /// Height available to flowing content on one page
    pub fn body_height(&self) -> f32 {
        let (_, height) = self.oriented_size();
        (height - self.margins.top - self.margins.bottom - self.header_height - self.footer_height)
            .max(0.0)
    }

    /// Width available to flowing content on one page
    pub fn body_width(&self) -> f32 {
        let (width, _) = self.oriented_size();
        (width - self.margins.left - self.margins.right).max(0.0)
    }
}

/// Exposes the current page options and tracks configuration changes
///
/// Each change bumps the revision; consumers compare revisions instead of
/// caching the options across a change.
#[derive(Debug, Clone, Default)]
pub struct PageOptionResolver {
    options: PageOptions,
    revision: u64,
}

/// Page option resolver shared between the editor and its plugins
pub type SharedPageOptions = Rc<RefCell<PageOptionResolver>>;

impl PageOptionResolver {
    pub fn new(options: PageOptions) -> Self {
        Self { options, revision: 0 }
    }

    /// Wrap in a shared handle
    pub fn shared(options: PageOptions) -> SharedPageOptions {
        Rc::new(RefCell::new(Self::new(options)))
    }

    /// Current page options
    pub fn current_page_options(&self) -> PageOptions {
        self.options
    }

    /// Revision of the configuration; bumps on every change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the whole configuration
    pub fn set(&mut self, options: PageOptions) {
        if options != self.options {
            self.options = options;
            self.revision += 1;
        }
    }

    pub fn set_size(&mut self, size: PageSize) {
        self.set(PageOptions { size, ..self.options });
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.set(PageOptions { margins, ..self.options });
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.set(PageOptions {
            orientation,
            ..self.options
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_height() {
        let options = PageOptions::default();
        assert_eq!(options.body_height(), 1123.0 - 96.0 - 96.0);
        assert_eq!(options.body_width(), 794.0 - 240.0);

        let landscape = PageOptions {
            orientation: Orientation::Landscape,
            header_height: 40.0,
            ..options
        };
        assert_eq!(landscape.body_height(), 794.0 - 96.0 - 96.0 - 40.0);
    }

    #[test]
    fn test_with_body_height() {
        assert_eq!(PageOptions::with_body_height(800.0).body_height(), 800.0);
    }

    #[test]
    fn test_revision_bumps_on_change_only() {
        let mut resolver = PageOptionResolver::new(PageOptions::default());
        resolver.set_size(PageSize::A4);
        assert_eq!(resolver.revision(), 0);

        resolver.set_size(PageSize::LETTER);
        assert_eq!(resolver.revision(), 1);
        resolver.set_orientation(Orientation::Landscape);
        assert_eq!(resolver.revision(), 2);
        assert_eq!(resolver.current_page_options().oriented_size(), (1056.0, 816.0));
    }

    #[test]
    fn test_presets() {
        assert_eq!(PageSize::preset("A4"), Some(PageSize::A4));
        assert_eq!(PageSize::preset("tabloid"), None);
    }
}
