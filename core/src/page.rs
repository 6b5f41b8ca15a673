//! Page cursor arithmetic.

/// Clamp `page` into `[0, total_pages - 1]`.
///
/// With no pages at all, page 0 is the only valid (empty) page.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.min(total_pages.saturating_sub(1))
}

/// A page index plus the number of pages it moves within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub current: u32,
    pub total_pages: u32,
}

impl Cursor {
    pub fn new(current: u32, total_pages: u32) -> Self {
        Self {
            current: clamp_page(current, total_pages),
            total_pages,
        }
    }

    /// Target of a step back, or `None` on the first page.
    pub fn previous(self) -> Option<u32> {
        self.current.checked_sub(1)
    }

    /// Target of a step forward, or `None` on the last page.
    pub fn next(self) -> Option<u32> {
        self.current
            .checked_add(1)
            .filter(|&target| target < self.total_pages)
    }

    /// Clamped target of a jump.
    pub fn go_to(self, page: u32) -> u32 {
        clamp_page(page, self.total_pages)
    }
}
