use lazy_static::lazy_static;
use ratatui::layout::{Constraint, Layout, Rect};

lazy_static! {
    static ref MAIN_LAYOUT: Layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(2),
    ]);
}

pub enum LayoutSlot {
    NavBar = 0,
    MainCanvas = 1,
    StatusBar = 2,
}

pub fn main_vert(slot: LayoutSlot, area: Rect) -> Rect {
    MAIN_LAYOUT.areas::<3>(area)[slot as usize]
}
