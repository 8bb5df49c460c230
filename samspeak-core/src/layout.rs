//! Layout derivation: slot count, paging and grid sizing
//!
//! All functions are pure over a [`PadMapping`]. The one asymmetric rule lives
//! in [`visible_count`]: a page with no occupied pads shows six numbered
//! placeholders only when the whole mapping has no keys at all. A page that is
//! empty while other pages hold pads renders nothing.

use crate::pads::{PadMapping, PADS_PER_PAGE};

/// Background colours, picked by `index % PALETTE.len()`.
pub const PALETTE: [&str; 8] = [
    "#3498db", "#2ecc71", "#e74c3c", "#f39c12", "#9b59b6", "#1abc9c", "#34495e", "#16a085",
];

/// Beyond this many pages the indicator collapses to `n / total`.
pub const MAX_PAGE_DOTS: usize = 12;

/// Whole-mapping layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// max(6, highest index + 1)
    pub total_slots: usize,
    /// ceil(total_slots / 6)
    pub total_pages: usize,
}

impl Layout {
    pub fn derive(pads: &PadMapping) -> Self {
        let total_slots = total_slots(pads);
        Self {
            total_slots,
            total_pages: total_slots.div_ceil(PADS_PER_PAGE),
        }
    }

    /// Page dots are only drawn when there is somewhere to go.
    pub fn shows_page_indicators(&self) -> bool {
        self.total_pages > 1
    }

    /// Dot row for `current`, e.g. `○ ● ○`. `None` when there is a single page.
    pub fn page_indicator(&self, current: usize) -> Option<String> {
        if !self.shows_page_indicators() {
            return None;
        }
        let current = self.clamp_page(current);
        if self.total_pages > MAX_PAGE_DOTS {
            return Some(format!("{} / {}", current.saturating_add(1), self.total_pages));
        }
        let dots: Vec<&str> = (0..self.total_pages)
            .map(|p| if p == current { "●" } else { "○" })
            .collect();
        Some(dots.join(" "))
    }

    pub fn clamp_page(&self, page: usize) -> usize {
        page.min(self.total_pages.saturating_sub(1))
    }

    /// Slot indices listed by the editor: `0..total_slots`.
    pub fn slot_indices(&self) -> std::ops::Range<usize> {
        0..self.total_slots
    }
}

pub fn total_slots(pads: &PadMapping) -> usize {
    pads.max_index()
        .map(|max| max.saturating_add(1).max(PADS_PER_PAGE))
        .unwrap_or(PADS_PER_PAGE)
}

/// Slot indices belonging to `page`, occupied or not.
pub fn page_indices(page: usize) -> std::ops::Range<usize> {
    let start = page.saturating_mul(PADS_PER_PAGE);
    start..start.saturating_add(PADS_PER_PAGE)
}

/// Number of pads rendered on `page`.
pub fn visible_count(pads: &PadMapping, page: usize) -> usize {
    let occupied = page_indices(page).filter(|i| pads.is_occupied(*i)).count();
    if occupied > 0 {
        occupied
    } else if pads.is_empty() {
        PADS_PER_PAGE
    } else {
        0
    }
}

pub fn pad_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// CSS grid class for a given number of visible pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridClass {
    One,
    Two,
    Three,
    Four,
    Five,
    Full,
}

impl GridClass {
    pub fn for_count(count: usize) -> Self {
        match count {
            1 => GridClass::One,
            2 => GridClass::Two,
            3 => GridClass::Three,
            4 => GridClass::Four,
            5 => GridClass::Five,
            _ => GridClass::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridClass::One => "grid-1",
            GridClass::Two => "grid-2",
            GridClass::Three => "grid-3",
            GridClass::Four => "grid-4",
            GridClass::Five => "grid-5",
            GridClass::Full => "grid",
        }
    }
}

impl std::fmt::Display for GridClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadCell {
    pub index: usize,
    pub label: String,
    pub color: &'static str,
}

/// What the controller draws for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: usize,
    pub layout: Layout,
    pub grid: GridClass,
    pub cells: Vec<PadCell>,
}

impl PageView {
    /// Build the view for `page`, clamped into range.
    pub fn build(pads: &PadMapping, page: usize) -> Self {
        let layout = Layout::derive(pads);
        let page = layout.clamp_page(page);
        let count = visible_count(pads, page);

        // A full page shows every slot, placeholders included.
        let cells = page_indices(page)
            .filter(|i| count == PADS_PER_PAGE || pads.is_occupied(*i))
            .map(|index| PadCell {
                index,
                label: pads.label(index),
                color: pad_color(index),
            })
            .collect();

        Self {
            page,
            layout,
            grid: GridClass::for_count(count),
            cells,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.cells.len()
    }
}
