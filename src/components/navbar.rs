use std::collections::HashSet;

use color_eyre::Result;
use itertools::Itertools;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style, Stylize, palette::tailwind},
    text::Line,
    widgets::Tabs,
};

use super::Component;
use crate::{
    action::{Action, Page},
    layout::LayoutSlot,
};

/// Page tabs. Pages holding unsaved order changes get a marker.
#[derive(Debug, Default)]
pub struct NavBar {
    active: Page,
    unsaved: HashSet<Page>,
}

impl NavBar {
    fn titles(&self) -> Vec<Line<'static>> {
        Page::ALL
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                let title = Line::from(format!("{} {page}", idx + 1));
                if self.unsaved.contains(page) {
                    let mut title = title;
                    title.push_span(" ●".fg(tailwind::AMBER.c400));
                    title
                } else {
                    title
                }
            })
            .collect_vec()
    }
}

impl Component for NavBar {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::SetActivePage(page) => self.active = page,
            Action::SetUnsavedMarker { page, unsaved: true } => {
                self.unsaved.insert(page);
            }
            Action::SetUnsavedMarker { page, unsaved: false } => {
                self.unsaved.remove(&page);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let area = crate::layout::main_vert(LayoutSlot::NavBar, area);
        let selected = Page::ALL.iter().position(|it| *it == self.active);

        let tabs = Tabs::new(self.titles())
            .select(selected)
            .style(Style::new().fg(tailwind::SLATE.c400))
            .highlight_style(
                Style::new()
                    .fg(tailwind::SLATE.c50)
                    .bg(tailwind::INDIGO.c700)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unsaved_marker_follows_actions() {
        let mut navbar = NavBar::default();

        navbar
            .update(Action::SetUnsavedMarker {
                page: Page::CareerItems,
                unsaved: true,
            })
            .unwrap();
        assert_eq!(navbar.titles()[2].spans.len(), 2);

        navbar
            .update(Action::SetUnsavedMarker {
                page: Page::CareerItems,
                unsaved: false,
            })
            .unwrap();
        assert_eq!(navbar.titles()[2].spans.len(), 1);
    }
}
