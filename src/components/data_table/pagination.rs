/// Pages around the current one shown between the first and the last page button.
const SIBLINGS: u32 = 1;
/// Up to this many pages every page gets its own button.
const SHOW_ALL_UP_TO: u32 = 2 * SIBLINGS + 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page(u32),
    Ellipsis,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit as u64).max(1) as u32;
        Self {
            page: page.clamp(1, total_pages),
            limit,
            total,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    /// A new page size always starts over on the first page.
    pub fn with_limit(&self, limit: u32) -> Self {
        Self::new(1, limit, self.total)
    }

    pub fn buttons(&self) -> Vec<PageButton> {
        let last = self.total_pages;
        if last <= SHOW_ALL_UP_TO {
            return (1..=last).map(PageButton::Page).collect();
        }

        let window = 2 * SIBLINGS + 1;
        let (start, end) = if self.page <= SIBLINGS + 2 {
            (2, 1 + window)
        } else if self.page >= last - SIBLINGS - 1 {
            (last - window, last - 1)
        } else {
            (self.page - SIBLINGS, self.page + SIBLINGS)
        };

        let mut buttons = vec![PageButton::Page(1)];
        buttons.push(gap(2, start));
        buttons.extend((start..=end).map(PageButton::Page));
        buttons.push(gap(end + 1, last));
        buttons.push(PageButton::Page(last));
        buttons.dedup();
        buttons
    }
}

/// What stands for the pages `from..to`. An ellipsis never hides a single page.
fn gap(from: u32, to: u32) -> PageButton {
    if to <= from + 1 {
        PageButton::Page(from)
    } else {
        PageButton::Ellipsis
    }
}

/// The page size after `current` in `options`, wrapping around.
pub fn cycle_page_size(options: &[u32], current: u32, forward: bool) -> Option<u32> {
    if options.is_empty() {
        return None;
    }
    let idx = options.iter().position(|it| *it == current);
    let next = match (idx, forward) {
        (None, _) => 0,
        (Some(idx), true) => (idx + 1) % options.len(),
        (Some(idx), false) => (idx + options.len() - 1) % options.len(),
    };
    Some(options[next])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{PageButton::*, *};

    #[test]
    fn test_total_pages_is_derived() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
    }

    #[test]
    fn test_boundaries_disable_previous_and_next() {
        let first = Pagination::new(1, 10, 35);
        let last = Pagination::new(4, 10, 35);

        assert!(!first.has_previous());
        assert_eq!(first.next_page(), Some(2));
        assert!(!last.has_next());
        assert_eq!(last.previous_page(), Some(3));
    }

    #[test]
    fn test_page_size_change_resets_to_first_page() {
        let pagination = Pagination::new(7, 10, 200);

        let changed = pagination.with_limit(50);

        assert_eq!(changed.page, 1);
        assert_eq!(changed.limit, 50);
        assert_eq!(changed.total_pages, 4);
    }

    #[test]
    fn test_few_pages_show_all_buttons() {
        let buttons = Pagination::new(3, 10, 70).buttons();

        assert_eq!(buttons, vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7)]);
    }

    #[test]
    fn test_window_in_the_middle() {
        let buttons = Pagination::new(10, 10, 200).buttons();

        assert_eq!(
            buttons,
            vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_window_at_the_edges() {
        let start = Pagination::new(1, 10, 200).buttons();
        let end = Pagination::new(20, 10, 200).buttons();

        assert_eq!(start, vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(20)]);
        assert_eq!(end, vec![Page(1), Ellipsis, Page(17), Page(18), Page(19), Page(20)]);
    }

    #[test]
    fn test_single_hidden_page_gets_a_button() {
        let fourth = Pagination::new(4, 10, 80).buttons();
        let fifth = Pagination::new(5, 10, 80).buttons();

        assert_eq!(
            fourth,
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(8)]
        );
        assert_eq!(
            fifth,
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Page(7), Page(8)]
        );
    }

    #[test]
    fn test_cycle_page_size() {
        let options = [10, 20, 50];

        assert_eq!(cycle_page_size(&options, 20, true), Some(50));
        assert_eq!(cycle_page_size(&options, 50, true), Some(10));
        assert_eq!(cycle_page_size(&options, 10, false), Some(50));
        assert_eq!(cycle_page_size(&options, 15, true), Some(10));
        assert_eq!(cycle_page_size(&[], 15, true), None);
    }
}
