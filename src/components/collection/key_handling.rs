use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CollectionEntity, CollectionPage, action::PageAction};
use crate::{action::Notice, shared::Direction};

pub(super) fn handle<E: CollectionEntity>(page: &mut CollectionPage<E>, key: KeyEvent) -> PageAction<E> {
    // A keyboard drag owns the arrow keys until it is dropped or cancelled.
    if page.table.is_dragging() {
        return table_key(page, key);
    }

    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Up if shift => PageAction::Move(Direction::Up),
        KeyCode::Down if shift => PageAction::Move(Direction::Down),
        KeyCode::Char('K') => PageAction::Move(Direction::Up),
        KeyCode::Char('J') => PageAction::Move(Direction::Down),
        KeyCode::Char('s') if page.is_batched() => PageAction::Save,
        KeyCode::Char('x') if page.is_batched() => PageAction::Reset,
        KeyCode::Char('r') => PageAction::Refresh,
        KeyCode::Char(' ') if page.table.is_draggable() => match page.reorder_blocked() {
            Some(blocked) => PageAction::Notify(blocked),
            None => table_key(page, key),
        },
        KeyCode::Char(' ') => PageAction::Notify(Notice::info("请使用 ⇧↑↓ 调整顺序")),
        _ => table_key(page, key),
    }
}

fn table_key<E: CollectionEntity>(page: &mut CollectionPage<E>, key: KeyEvent) -> PageAction<E> {
    match page.table.handle_key(page.controller.local_items(), key) {
        Some(event) => PageAction::Table(event),
        None => PageAction::None,
    }
}
