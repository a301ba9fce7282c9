pub mod pagination_bar {
    use ratatui::{
        prelude::*,
        style::palette::tailwind::{INDIGO, SLATE},
    };

    use crate::components::data_table::{PagerTarget, Pagination, pagination::PageButton};

    const GAP: &str = " ";

    /// One-line pager: previous, page buttons with ellipses, next, total count and
    /// the page size selector. Every clickable segment is reported with its area.
    pub struct PaginationBar {
        pagination: Pagination,
    }

    impl PaginationBar {
        pub fn new(pagination: Pagination) -> Self {
            Self { pagination }
        }

        fn segments(&self) -> Vec<(Span<'static>, Option<PagerTarget>)> {
            let p = self.pagination;
            let enabled = Style::new().fg(SLATE.c200);
            let disabled = Style::new().fg(SLATE.c600);

            let mut segments = vec![match p.previous_page() {
                Some(page) => (Span::styled("‹ 上一页", enabled), Some(PagerTarget::Page(page))),
                None => (Span::styled("‹ 上一页", disabled), None),
            }];
            for button in p.buttons() {
                segments.push(match button {
                    PageButton::Page(page) if page == p.page => {
                        let style = Style::new().bg(INDIGO.c700).add_modifier(Modifier::BOLD);
                        (Span::styled(format!(" {page} "), style), None)
                    }
                    PageButton::Page(page) => (
                        Span::styled(format!(" {page} "), enabled),
                        Some(PagerTarget::Page(page)),
                    ),
                    PageButton::Ellipsis => (Span::styled("…", disabled), None),
                });
            }
            segments.push(match p.next_page() {
                Some(page) => (Span::styled("下一页 ›", enabled), Some(PagerTarget::Page(page))),
                None => (Span::styled("下一页 ›", disabled), None),
            });
            segments.push((Span::styled(format!(" 共 {} 条", p.total), disabled), None));
            segments.push((
                Span::styled(format!(" 每页 {} 条 ▾", p.limit), enabled),
                Some(PagerTarget::PageSize),
            ));
            segments
        }

        /// Renders the bar and returns the areas of its clickable segments.
        pub fn render_with_targets(self, area: Rect, buf: &mut Buffer) -> Vec<(Rect, PagerTarget)> {
            let mut targets = Vec::new();
            if area.is_empty() {
                return targets;
            }
            let y = area.y;
            let mut x = area.x;
            for (span, target) in self.segments() {
                let remaining = area.right().saturating_sub(x);
                if remaining == 0 {
                    break;
                }
                let (end, _) = buf.set_span(x, y, &span, remaining);
                if let Some(target) = target {
                    targets.push((Rect::new(x, y, end - x, 1), target));
                }
                x = buf.set_span(end, y, &Span::raw(GAP), area.right().saturating_sub(end)).0;
            }
            targets
        }
    }

    impl Widget for PaginationBar {
        fn render(self, area: Rect, buf: &mut Buffer) {
            self.render_with_targets(area, buf);
        }
    }

}

pub mod spinner {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

    pub fn frame(tick: usize) -> &'static str {
        FRAMES[tick % FRAMES.len()]
    }
}
