use crate::page::PageId;

/// Ordered, duplicate-free page visit history, most recent last.
///
/// "Back" means *revisit the previous distinct page*: revisiting a page
/// already in the stack moves it to the end instead of appending a
/// duplicate, so A -> B -> A leaves [B, A] and repeated back presses
/// converge toward the home page instead of replaying loops.
#[derive(Debug, Default)]
pub struct HistoryStack {
    pages: Vec<PageId>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed page visit. Subpage-only changes never call this.
    pub fn record(&mut self, page: PageId) {
        self.pages.retain(|visited| *visited != page);
        self.pages.push(page);
    }

    /// Pop back to the previous distinct page.
    ///
    /// Returns `None` when there is nothing to go back to (empty history,
    /// or only the home page left) so the caller can fall through to the
    /// platform default. With a single non-home entry the stack is cleared
    /// and the home page is returned.
    pub fn pop_to_previous(&mut self) -> Option<PageId> {
        match self.pages.len() {
            0 => None,
            1 => {
                if self.pages[0] == PageId::HOME {
                    None
                } else {
                    self.pages.clear();
                    Some(PageId::HOME)
                }
            }
            _ => {
                self.pages.pop();
                self.pages.last().copied()
            }
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u16) -> PageId {
        PageId::new(n).unwrap()
    }

    #[test]
    fn test_record_collapses_revisits() {
        let mut history = HistoryStack::new();
        for n in [100, 200, 100, 300] {
            history.record(page(n));
        }
        assert_eq!(history.pages(), &[page(200), page(100), page(300)]);
    }

    #[test]
    fn test_pop_returns_previous_page() {
        let mut history = HistoryStack::new();
        for n in [200, 100, 300] {
            history.record(page(n));
        }

        assert_eq!(history.pop_to_previous(), Some(page(100)));
        assert_eq!(history.pages(), &[page(200), page(100)]);
    }

    #[test]
    fn test_single_entry_goes_home() {
        let mut history = HistoryStack::new();
        history.record(page(456));

        assert_eq!(history.pop_to_previous(), Some(PageId::HOME));
        assert!(history.is_empty());
    }

    #[test]
    fn test_already_home_is_unhandled() {
        let mut history = HistoryStack::new();
        history.record(PageId::HOME);

        assert_eq!(history.pop_to_previous(), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_empty_history_is_unhandled() {
        let mut history = HistoryStack::new();
        assert_eq!(history.pop_to_previous(), None);
    }
}
