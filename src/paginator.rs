use crate::config::DEFAULT_PAGE_SIZE;

/// "Load more" window over a filtered result.
///
/// The paginator cannot tell when the underlying result changes; whoever owns
/// it must call [`Paginator::reset`] on every filter change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    pages: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages currently revealed (starts at 1)
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Change the page size, e.g. for a narrow viewport. Keeps the page count.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// How many of `total` items are visible
    pub fn visible_count(&self, total: usize) -> usize {
        self.page_size.saturating_mul(self.pages).min(total)
    }

    /// The visible prefix of `items`
    pub fn visible_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_count(items.len())]
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible_count(total) < total
    }

    /// Reveal one more page. Does nothing once all `total` items are visible.
    pub fn advance(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.pages += 1;
        true
    }

    pub fn reset(&mut self) {
        self.pages = 1;
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
