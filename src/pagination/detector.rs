//! Overflow/underflow detection for the page under the selection

use crate::document::Document;
use crate::editing::{Meta, Selection};
use crate::layout::{lenient_total_height, GeometryProber};
use crate::pagination::critical::is_critical_page;
use crate::pagination::PaginationState;

/// Outcome of one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    /// Page that was measured
    pub page_index: usize,
    /// Sum of the measured heights of the page body's children
    pub body_height: f32,
    /// A new page is needed
    pub inserting: bool,
    /// The page shrank since the last measurement
    pub deleting: bool,
}

impl Measured {
    /// Check if the reflow engine has work to do
    pub fn has_intent(&self) -> bool {
        self.inserting || self.deleting
    }

    /// Metadata recording this measurement on a transaction
    pub fn to_meta(&self) -> Meta {
        Meta {
            inserting: Some(self.inserting),
            deleting: Some(self.deleting),
            body_height: Some(self.body_height),
            measurement: true,
            join_history: true,
            ..Meta::default()
        }
    }
}

/// Measures the selection's page and derives insert/delete intents
#[derive(Debug, Clone, Copy)]
pub struct OverflowDetector {
    budget: f32,
}

impl OverflowDetector {
    /// Detector for a page body of height `budget`
    pub fn new(budget: f32) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> f32 {
        self.budget
    }

    /// Check if a body of this height overflows the page
    pub fn is_overflown(&self, height: f32) -> bool {
        height > self.budget
    }

    /// Measure the page holding the selection
    ///
    /// Returns `None` when nothing should be measured: composition is in
    /// progress, pagination is off, the selection is inside a table cell,
    /// or it resolves to no page.
    pub fn measure(
        &self,
        doc: &Document,
        selection: &Selection,
        state: &PaginationState,
        previous_height: f32,
        prober: &dyn GeometryProber,
    ) -> Option<Measured> {
        if state.composition_active || !state.run_enabled {
            return None;
        }
        // In-cell edits are measured on the next structural commit
        if selection.in_table_cell(doc) {
            return None;
        }

        let page_index = selection.page_index()?;
        let page = doc.page(page_index)?;
        let body = page.body()?;

        let body_height = lenient_total_height(prober, &body.children);
        let mut inserting = self.is_overflown(body_height);
        let mut deleting = previous_height > body_height;

        if inserting && is_critical_page(page) {
            tracing::debug!(page_index, body_height, "overflow on critical page left alone");
            inserting = false;
        }
        if inserting {
            deleting = false;
        }

        tracing::trace!(page_index, body_height, inserting, deleting, "measured page");
        Some(Measured {
            page_index,
            body_height,
            inserting,
            deleting,
        })
    }

    /// Measure every page once, used for the first pass after ready
    ///
    /// Inserting is set if any splittable page overflows. Deleting is set
    /// if a page other than the only one is empty, or if a page could take
    /// the first block of the page after it. Both may be set. The recorded
    /// height is that of the selection's page.
    pub fn measure_document(
        &self,
        doc: &Document,
        selection: &Selection,
        state: &PaginationState,
        prober: &dyn GeometryProber,
    ) -> Option<Measured> {
        if state.composition_active || !state.run_enabled {
            return None;
        }

        let page_index = selection.page_index().unwrap_or(0);
        let pages = doc.pages();
        let heights: Vec<f32> = pages
            .iter()
            .map(|page| {
                page.body()
                    .map(|b| lenient_total_height(prober, &b.children))
                    .unwrap_or(0.0)
            })
            .collect();

        let inserting = pages
            .iter()
            .zip(&heights)
            .any(|(page, &height)| self.is_overflown(height) && !is_critical_page(page));

        let deleting = pages.len() > 1
            && (0..pages.len()).any(|index| {
                let blocks = doc.body_blocks(index);
                if blocks.is_empty() {
                    return true;
                }
                doc.body_blocks(index + 1)
                    .first()
                    .map(|next| !self.is_overflown(heights[index] + prober.measure(next).height_or_zero()))
                    .unwrap_or(false)
            });

        Some(Measured {
            page_index,
            body_height: heights.get(page_index).copied().unwrap_or(0.0),
            inserting,
            deleting,
        })
    }
}
