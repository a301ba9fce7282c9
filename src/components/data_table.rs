//! Table of ordered rows with optional drag reordering, column sorting and
//! pagination. The table only reports intents through [TableEvent]; what to do with
//! a new order is up to the page that owns it.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Position, Rect},
    widgets::TableState,
};

use crate::shared::{Direction, ranking::move_to_index};

pub mod column;
mod draw;
pub mod drag;
pub mod pagination;
pub mod sort;

pub use column::{Column, SortKey};
pub use pagination::Pagination;
pub use sort::{SortConfig, SortDirection, SortMode};

use self::{
    drag::{DragState, DragUpdate},
    pagination::cycle_page_size,
    sort::{cycle_internal, toggle_external, view_order},
};

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent<T> {
    /// Full new order after a drop, in the same shape the rows were handed in.
    Reorder(Vec<T>),
    /// External sort mode only: the sort the caller should apply.
    Sort(SortConfig),
    /// External sort mode only: back to the caller's natural order.
    SortCleared,
    PageChanged(u32),
    /// The page is implied to be 1 again.
    PageSizeChanged(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerTarget {
    Page(u32),
    PageSize,
}

/// Screen areas of the last draw, for mouse hit testing.
#[derive(Debug, Default)]
struct HitAreas {
    header: Rect,
    body: Rect,
    columns: Vec<(Rect, &'static str)>,
    pager: Vec<(Rect, PagerTarget)>,
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    draggable: bool,
    drag_enabled: bool,
    sort_mode: SortMode,
    sort: Option<SortConfig>,
    pagination: Option<Pagination>,
    page_size_options: Vec<u32>,
    loading: bool,
    empty_message: &'static str,

    drag: DragState,
    drag_threshold: u16,
    state: TableState,
    spinner_tick: usize,
    hit: HitAreas,
}

impl<T> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            draggable: false,
            drag_enabled: true,
            sort_mode: SortMode::Internal,
            sort: None,
            pagination: None,
            page_size_options: vec![10, 20, 50, 100],
            loading: false,
            empty_message: "暂无数据",
            drag: DragState::default(),
            drag_threshold: 1,
            state: TableState::default(),
            spinner_tick: 0,
            hit: HitAreas::default(),
        }
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    pub fn empty_message(mut self, message: &'static str) -> Self {
        self.empty_message = message;
        self
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            self.drag.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_pagination(&mut self, pagination: Option<Pagination>) {
        self.pagination = pagination;
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn set_page_size_options(&mut self, options: Vec<u32>) {
        self.page_size_options = options;
    }

    pub fn set_drag_threshold(&mut self, threshold: u16) {
        self.drag_threshold = threshold;
    }

    /// Temporarily allows or forbids dragging, e.g. while a save is in flight.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
        if !enabled {
            self.drag.cancel();
        }
    }

    /// Sorting is active. The displayed order is then not the rank order.
    pub fn is_sorted(&self) -> bool {
        self.sort.is_some()
    }

    pub fn sort(&self) -> Option<SortConfig> {
        self.sort
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    /// Keeps the selection on an existing row after the rows were replaced.
    pub fn clamp_selection(&mut self, len: usize) {
        let row = self.state.selected().unwrap_or(0);
        self.select_row(row, len);
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
    }

    /// Index into the caller's rows of the selected row.
    pub fn selected_item_index(&self, items: &[T]) -> Option<usize> {
        let row = self.state.selected()?;
        self.view_order(items).get(row).copied()
    }

    pub fn select_item(&mut self, items: &[T], item_idx: usize) {
        if let Some(row) = self.view_order(items).iter().position(|it| *it == item_idx) {
            self.select_row(row, items.len());
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, items: &[T]) {
        draw::draw(self, frame, area, items);
    }

    fn can_drag(&self) -> bool {
        self.draggable && self.drag_enabled && !self.is_sorted() && !self.loading
    }

    fn effective_sort(&self) -> Option<SortConfig> {
        match self.sort_mode {
            SortMode::Internal => self.sort,
            SortMode::External => None,
        }
    }

    fn view_order(&self, items: &[T]) -> Vec<usize> {
        view_order(items, &self.columns, self.effective_sort())
    }

    fn widths(&self) -> Vec<Constraint> {
        let handle = self.draggable.then_some(Constraint::Length(1));
        handle
            .into_iter()
            .chain(self.columns.iter().map(|it| it.width))
            .collect()
    }

    fn select_row(&mut self, row: usize, len: usize) {
        if len == 0 {
            self.state.select(None);
        } else {
            self.state.select(Some(row.min(len - 1)));
        }
    }

    fn select_relative(&mut self, direction: Direction, len: usize) {
        let next = match (self.state.selected(), direction) {
            (None, _) => 0,
            (Some(row), Direction::Up) => row.saturating_sub(1),
            (Some(row), Direction::Down) => row + 1,
        };
        self.select_row(next, len);
    }

    fn select_relative_column(&mut self, forward: bool) {
        let count = self.columns.len();
        if count == 0 {
            return;
        }
        let next = match self.state.selected_column() {
            None => 0,
            Some(idx) if forward => (idx + 1) % count,
            Some(idx) => (idx + count - 1) % count,
        };
        self.state.select_column(Some(next));
    }

    fn selected_column_key(&self) -> Option<&'static str> {
        let idx = self.state.selected_column()?;
        self.columns.get(idx).map(|it| it.key)
    }

    fn row_at(&self, x: u16, y: u16, len: usize) -> Option<usize> {
        if !self.hit.body.contains(Position { x, y }) {
            return None;
        }
        let row = self.state.offset() + (y - self.hit.body.y) as usize;
        (row < len).then_some(row)
    }

    fn column_at(&self, x: u16, y: u16) -> Option<&'static str> {
        self.hit
            .columns
            .iter()
            .find(|(rect, _)| rect.contains(Position { x, y }))
            .map(|(_, key)| *key)
    }

    fn pager_target_at(&self, x: u16, y: u16) -> Option<PagerTarget> {
        self.hit
            .pager
            .iter()
            .find(|(rect, _)| rect.contains(Position { x, y }))
            .map(|(_, target)| *target)
    }

    fn toggle_sort(&mut self, key: &'static str) -> Option<TableEvent<T>> {
        let sortable = self.columns.iter().any(|it| it.key == key && it.is_sortable());
        if !sortable {
            return None;
        }
        self.drag.cancel();
        match self.sort_mode {
            SortMode::Internal => {
                self.sort = cycle_internal(self.sort, key);
                None
            }
            SortMode::External => {
                let next = toggle_external(self.sort, key);
                self.sort = Some(next);
                Some(TableEvent::Sort(next))
            }
        }
    }

    fn clear_sort(&mut self) -> Option<TableEvent<T>> {
        self.sort.take()?;
        match self.sort_mode {
            SortMode::Internal => None,
            SortMode::External => Some(TableEvent::SortCleared),
        }
    }

    fn change_page(&mut self, page: Option<u32>) -> Option<TableEvent<T>> {
        let pagination = self.pagination.as_mut()?;
        let page = page?.clamp(1, pagination.total_pages);
        if page == pagination.page {
            return None;
        }
        pagination.page = page;
        self.drag.cancel();
        Some(TableEvent::PageChanged(page))
    }

    fn change_page_size(&mut self, forward: bool) -> Option<TableEvent<T>> {
        let pagination = self.pagination?;
        let limit = cycle_page_size(&self.page_size_options, pagination.limit, forward)?;
        if limit == pagination.limit {
            return None;
        }
        self.pagination = Some(pagination.with_limit(limit));
        self.drag.cancel();
        Some(TableEvent::PageSizeChanged(limit))
    }

    fn apply_pager_target(&mut self, target: PagerTarget) -> Option<TableEvent<T>> {
        match target {
            PagerTarget::Page(page) => self.change_page(Some(page)),
            PagerTarget::PageSize => self.change_page_size(true),
        }
    }
}

impl<T: Clone> DataTable<T> {
    pub fn handle_key(&mut self, items: &[T], key: KeyEvent) -> Option<TableEvent<T>> {
        if self.drag.is_dragging() {
            let update = match key.code {
                KeyCode::Up => self.drag.nudge(Direction::Up, items.len()),
                KeyCode::Down => self.drag.nudge(Direction::Down, items.len()),
                KeyCode::Char(' ') | KeyCode::Enter => self.drag.drop_here(),
                KeyCode::Esc => {
                    if let Some(from) = self.drag.dragged_row() {
                        self.select_row(from, items.len());
                    }
                    self.drag.cancel()
                }
                _ => DragUpdate::None,
            };
            return self.apply_drag_update(items, update);
        }

        let pagination = self.pagination;
        match key.code {
            KeyCode::Up => self.select_relative(Direction::Up, items.len()),
            KeyCode::Down => self.select_relative(Direction::Down, items.len()),
            KeyCode::Tab => self.select_relative_column(true),
            KeyCode::BackTab => self.select_relative_column(false),
            KeyCode::Char('o') => {
                let key = self.selected_column_key()?;
                return self.toggle_sort(key);
            }
            KeyCode::Char('O') => return self.clear_sort(),
            KeyCode::Char(' ') if self.can_drag() => {
                let row = self.state.selected()?;
                if row < items.len() {
                    self.drag.pick_up(row);
                }
            }
            KeyCode::PageUp => return self.change_page(pagination?.previous_page()),
            KeyCode::PageDown => return self.change_page(pagination?.next_page()),
            KeyCode::Home => return self.change_page(Some(1)),
            KeyCode::End => return self.change_page(pagination.map(|it| it.total_pages)),
            KeyCode::Char('+') | KeyCode::Char('=') => return self.change_page_size(true),
            KeyCode::Char('-') => return self.change_page_size(false),
            _ => {}
        }
        None
    }

    pub fn handle_mouse(&mut self, items: &[T], mouse: MouseEvent) -> Option<TableEvent<T>> {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = self.pager_target_at(x, y) {
                    return self.apply_pager_target(target);
                }
                if self.hit.header.contains(Position { x, y }) {
                    let key = self.column_at(x, y)?;
                    return self.toggle_sort(key);
                }
                let row = self.row_at(x, y, items.len())?;
                self.select_row(row, items.len());
                if self.can_drag() {
                    self.drag.press(row, x, y);
                }
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let row = self.row_at(x, y, items.len());
                let update = self.drag.pointer_moved(x, y, row, self.drag_threshold);
                self.apply_drag_update(items, update)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let row = self.row_at(x, y, items.len());
                let update = self.drag.release(row);
                self.apply_drag_update(items, update)
            }
            MouseEventKind::ScrollUp => {
                self.select_relative(Direction::Up, items.len());
                None
            }
            MouseEventKind::ScrollDown => {
                self.select_relative(Direction::Down, items.len());
                None
            }
            _ => None,
        }
    }

    fn apply_drag_update(&mut self, items: &[T], update: DragUpdate) -> Option<TableEvent<T>> {
        match update {
            DragUpdate::Hover(row) | DragUpdate::Clicked(row) => {
                self.select_row(row, items.len());
                None
            }
            DragUpdate::Dropped { from, to } => {
                let mut reordered = items.to_vec();
                if !move_to_index(&mut reordered, from, to) {
                    return None;
                }
                self.select_row(to, items.len());
                Some(TableEvent::Reorder(reordered))
            }
            DragUpdate::None | DragUpdate::Started | DragUpdate::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyModifiers, MouseEvent};
    use pretty_assertions::assert_eq;

    use super::*;

    fn columns() -> Vec<Column<&'static str>> {
        vec![
            Column::new("name", "名称", Constraint::Fill(1), |row: &&'static str| {
                row.to_string()
            })
            .sortable(|row| SortKey::from(*row)),
            Column::new("len", "长度", Constraint::Length(4), |row: &&'static str| {
                row.len().to_string()
            }),
        ]
    }

    fn table() -> DataTable<&'static str> {
        DataTable::new(columns()).draggable(true)
    }

    fn press(table: &mut DataTable<&'static str>, items: &[&'static str], code: KeyCode) -> Option<TableEvent<&'static str>> {
        table.handle_key(items, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    const ITEMS: [&str; 5] = ["A", "B", "C", "D", "E"];

    #[test]
    fn test_keyboard_drag_reinserts() {
        let mut table = table();
        table.select_row(2, ITEMS.len());

        press(&mut table, &ITEMS, KeyCode::Char(' '));
        press(&mut table, &ITEMS, KeyCode::Up);
        press(&mut table, &ITEMS, KeyCode::Up);
        let event = press(&mut table, &ITEMS, KeyCode::Enter);

        assert_eq!(event, Some(TableEvent::Reorder(vec!["C", "A", "B", "D", "E"])));
        assert_eq!(table.selected_item_index(&ITEMS), Some(0));
    }

    #[test]
    fn test_keyboard_drag_cancel_keeps_order() {
        let mut table = table();
        table.select_row(1, ITEMS.len());

        press(&mut table, &ITEMS, KeyCode::Char(' '));
        press(&mut table, &ITEMS, KeyCode::Down);
        let event = press(&mut table, &ITEMS, KeyCode::Esc);

        assert_eq!(event, None);
        assert!(!table.is_dragging());
        assert_eq!(table.selected_item_index(&ITEMS), Some(1));
    }

    #[test]
    fn test_pointer_drag_needs_threshold() {
        let mut table = table();
        table.set_drag_threshold(2);
        table.hit.body = Rect::new(0, 1, 20, 5);

        table.handle_mouse(&ITEMS, mouse(MouseEventKind::Down(MouseButton::Left), 3, 3));
        table.handle_mouse(&ITEMS, mouse(MouseEventKind::Drag(MouseButton::Left), 4, 3));
        assert!(!table.is_dragging());
        let click = table.handle_mouse(&ITEMS, mouse(MouseEventKind::Up(MouseButton::Left), 4, 3));
        assert_eq!(click, None);
        assert_eq!(table.selected_item_index(&ITEMS), Some(2));

        table.handle_mouse(&ITEMS, mouse(MouseEventKind::Down(MouseButton::Left), 3, 3));
        table.handle_mouse(&ITEMS, mouse(MouseEventKind::Drag(MouseButton::Left), 3, 1));
        assert!(table.is_dragging());
        let drop = table.handle_mouse(&ITEMS, mouse(MouseEventKind::Up(MouseButton::Left), 3, 1));
        assert_eq!(drop, Some(TableEvent::Reorder(vec!["C", "A", "B", "D", "E"])));
    }

    #[test]
    fn test_internal_sort_switches_columns_exclusively() {
        let mut table = DataTable::new(vec![
            Column::new("a", "A", Constraint::Fill(1), |row: &&'static str| row.to_string())
                .sortable(|row| SortKey::from(*row)),
            Column::new("b", "B", Constraint::Fill(1), |row: &&'static str| row.to_string())
                .sortable(|row| SortKey::from(row.len() as i64)),
        ]);

        table.toggle_sort("a");
        table.toggle_sort("a");
        table.toggle_sort("b");

        assert_eq!(
            table.sort(),
            Some(SortConfig {
                key: "b",
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn test_internal_sort_changes_view_and_blocks_drag() {
        let mut table = table();
        let items = ["B", "C", "A"];
        table.state.select_column(Some(0));

        assert_eq!(press(&mut table, &items, KeyCode::Char('o')), None);
        press(&mut table, &items, KeyCode::Char('o'));
        table.select_row(0, items.len());

        assert_eq!(table.selected_item_index(&items), Some(1));
        press(&mut table, &items, KeyCode::Char(' '));
        assert!(!table.is_dragging());
    }

    #[test]
    fn test_unsortable_column_is_ignored() {
        let mut table = table();
        table.state.select_column(Some(1));

        assert_eq!(press(&mut table, &ITEMS, KeyCode::Char('o')), None);
        assert!(!table.is_sorted());
    }

    #[test]
    fn test_external_sort_reports_and_keeps_caller_order() {
        let mut table = table().sort_mode(SortMode::External);
        let items = ["B", "C", "A"];
        table.state.select_column(Some(0));

        let event = press(&mut table, &items, KeyCode::Char('o'));

        let expected = SortConfig {
            key: "name",
            direction: SortDirection::Ascending,
        };
        assert_eq!(event, Some(TableEvent::Sort(expected)));
        table.select_row(0, items.len());
        assert_eq!(table.selected_item_index(&items), Some(0));
    }

    #[test]
    fn test_clearing_external_sort_is_reported_once() {
        let mut table = table().sort_mode(SortMode::External);
        table.toggle_sort("name");

        assert_eq!(press(&mut table, &ITEMS, KeyCode::Char('O')), Some(TableEvent::SortCleared));
        assert_eq!(press(&mut table, &ITEMS, KeyCode::Char('O')), None);
        assert!(!table.is_sorted());
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut table = table();
        table.set_page_size_options(vec![10, 20, 50]);
        table.set_pagination(Some(Pagination::new(3, 10, 95)));

        let event = press(&mut table, &ITEMS, KeyCode::Char('+'));

        assert_eq!(event, Some(TableEvent::PageSizeChanged(20)));
        assert_eq!(table.pagination().map(|it| it.page), Some(1));
    }

    #[test]
    fn test_paging_stops_at_boundaries() {
        let mut table = table();
        table.set_pagination(Some(Pagination::new(1, 10, 25)));

        assert_eq!(press(&mut table, &ITEMS, KeyCode::PageUp), None);
        assert_eq!(press(&mut table, &ITEMS, KeyCode::PageDown), Some(TableEvent::PageChanged(2)));
        assert_eq!(press(&mut table, &ITEMS, KeyCode::End), Some(TableEvent::PageChanged(3)));
        assert_eq!(press(&mut table, &ITEMS, KeyCode::PageDown), None);
    }

    #[test]
    fn test_disabled_drag_does_not_pick_up() {
        let mut table = table();
        table.select_row(0, ITEMS.len());
        table.set_drag_enabled(false);

        press(&mut table, &ITEMS, KeyCode::Char(' '));

        assert!(!table.is_dragging());
    }
}
