//! One page per ordered collection. The page wires a [DataTable] to a
//! [ReorderController] and to the transport thread.

use std::fmt;

use color_eyre::{
    Result,
    eyre::{WrapErr, eyre},
};
use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};
use ratatui::{
    prelude::*,
    style::palette::tailwind,
    widgets::{Block, BorderType, Borders},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use super::{
    Component,
    data_table::{Column, DataTable, SortMode, TableEvent},
};
use crate::{
    action::{Action, Notice, Page, RelevantKey},
    config::Config,
    layout::LayoutSlot,
    reorder::{PersistenceMode, ReorderController, ReorderEffect, ReorderRequest, ReorderTransport},
    shared::{Direction, OrderedEntity, ranking::position_of},
    transport::{self, Collection, Command, PageQuery, Records},
};

mod entities;
mod key_handling;
mod transport_handling;

mod action {
    use crate::{action::Notice, components::data_table::TableEvent, shared::Direction};

    pub enum PageAction<E> {
        None,
        Move(Direction),
        Save,
        Reset,
        Refresh,
        Table(TableEvent<E>),
        Notify(Notice),
    }
}

use action::PageAction;

/// Entity type that can be listed and reordered on a [CollectionPage].
pub trait CollectionEntity: OrderedEntity + fmt::Debug + 'static {
    const COLLECTION: Collection;
    const PAGE: Page;

    fn columns() -> Vec<Column<Self>>;
    /// The records of this entity type, if `records` holds them.
    fn from_records(records: Records) -> Option<Vec<Self>>;
}

/// Reorder transport that hands requests to the transport thread. The outcome
/// comes back as a transport event.
pub struct CommandTransport {
    collection: Collection,
    tx: Option<UnboundedSender<Command>>,
}

impl CommandTransport {
    fn sender(&self) -> Result<&UnboundedSender<Command>> {
        self.tx
            .as_ref()
            .ok_or_else(|| eyre!("{} transport is not connected", self.collection))
    }

    fn fetch(&self, fetch_id: u64, query: PageQuery) -> Result<()> {
        self.sender()?
            .send(Command::FetchPage {
                collection: self.collection,
                fetch_id,
                query,
            })
            .wrap_err("handing fetch to transport")
    }
}

impl ReorderTransport for CommandTransport {
    fn submit(&mut self, request: ReorderRequest) -> Result<()> {
        self.sender()?
            .send(Command::Reorder {
                collection: self.collection,
                ticket: request.ticket,
                ranks: request.ranks,
            })
            .wrap_err("handing reorder to transport")
    }
}

pub struct CollectionPage<E: CollectionEntity> {
    controller: ReorderController<E, CommandTransport>,
    table: DataTable<E>,
    action_tx: Option<UnboundedSender<Action>>,

    active: bool,
    query: PageQuery,
    /// Only the answer to the latest fetch is applied.
    fetch_id: u64,
    shown_unsaved: bool,
}

impl<E: CollectionEntity> CollectionPage<E> {
    pub fn new(mode: PersistenceMode, sort_mode: SortMode, draggable: bool) -> Self {
        let transport = CommandTransport {
            collection: E::COLLECTION,
            tx: None,
        };
        Self {
            controller: ReorderController::new(mode, transport),
            table: DataTable::new(E::columns())
                .draggable(draggable)
                .sort_mode(sort_mode),
            action_tx: None,
            active: false,
            query: PageQuery {
                page: 1,
                limit: 20,
                sort: None,
            },
            fetch_id: 0,
            shown_unsaved: false,
        }
    }

    fn is_batched(&self) -> bool {
        self.controller.mode() == PersistenceMode::Batched
    }

    fn fetch(&mut self) -> Result<()> {
        self.fetch_id += 1;
        self.table.set_loading(true);
        if let Err(err) = self.controller.transport().fetch(self.fetch_id, self.query) {
            self.table.set_loading(false);
            return Err(err);
        }
        Ok(())
    }

    fn refetch(&mut self) -> Option<Notice> {
        let discarded = self.controller.has_unsaved_changes();
        match self.fetch() {
            Err(err) => {
                error!("Unable to fetch {}: {err:?}", E::COLLECTION);
                Some(Notice::error(format!("加载{}失败：{err}", E::PAGE)))
            }
            Ok(()) if discarded => Some(Notice::info("未保存的排序已丢弃")),
            Ok(()) => None,
        }
    }

    /// Reordering is refused while the view is sorted or a request is outstanding.
    fn reorder_blocked(&self) -> Option<Notice> {
        if self.table.is_sorted() {
            Some(Notice::info("排序状态下无法调整顺序，按 O 取消排序"))
        } else if self.controller.is_pending() {
            Some(Notice::info("上一次排序仍在提交中，请稍候"))
        } else if self.table.is_loading() {
            Some(Notice::info("数据加载中，请稍候"))
        } else {
            None
        }
    }

    fn move_selected(&mut self, direction: Direction) -> Option<Notice> {
        if let Some(blocked) = self.reorder_blocked() {
            return Some(blocked);
        }
        let items = self.controller.local_items();
        let idx = self.table.selected_item_index(items)?;
        let id = items[idx].id().clone();

        let effect = self.controller.move_entity(&id, direction);
        let items = self.controller.local_items();
        if let Some(new_idx) = position_of(items, &id) {
            self.table.select_item(items, new_idx);
        }
        self.report_effect(effect)
    }

    fn adopt_order(&mut self, new_order: Vec<E>) -> Option<Notice> {
        if let Some(blocked) = self.reorder_blocked() {
            return Some(blocked);
        }
        let effect = self.controller.reorder(new_order);
        debug!("{} reorder: {effect:?}", E::COLLECTION);
        None
    }

    fn save(&mut self) -> Option<Notice> {
        if !self.controller.has_unsaved_changes() {
            return Some(Notice::info("没有需要保存的排序"));
        }
        if self.controller.is_pending() {
            return Some(Notice::info("上一次排序仍在提交中，请稍候"));
        }
        match self.controller.save_order() {
            Ok(ReorderEffect::Submitted(_)) => Some(Notice::info("正在保存排序…")),
            effect => self.report_effect(effect),
        }
    }

    fn reset(&mut self) -> Option<Notice> {
        if !self.controller.has_unsaved_changes() {
            return None;
        }
        self.controller.reset_order();
        self.table.clamp_selection(self.controller.local_items().len());
        Some(Notice::info("已恢复为服务器顺序"))
    }

    fn report_effect(&self, effect: Result<ReorderEffect>) -> Option<Notice> {
        match effect {
            Ok(effect) => {
                debug!("{} reorder: {effect:?}", E::COLLECTION);
                None
            }
            Err(err) => {
                error!("Reordering {} failed: {err:?}", E::COLLECTION);
                Some(Notice::error(format!("排序更新失败：{err}")))
            }
        }
    }

    fn handle_table_event(&mut self, event: TableEvent<E>) -> Option<Notice> {
        match event {
            TableEvent::Reorder(new_order) => self.adopt_order(new_order),
            TableEvent::Sort(sort) => {
                self.query.sort = Some(sort);
                self.query.page = 1;
                self.refetch()
            }
            TableEvent::SortCleared => {
                self.query.sort = None;
                self.query.page = 1;
                self.refetch()
            }
            TableEvent::PageChanged(page) => {
                self.query.page = page;
                self.refetch()
            }
            TableEvent::PageSizeChanged(limit) => {
                self.query.limit = limit;
                self.query.page = 1;
                self.refetch()
            }
        }
    }

    fn perform_action(&mut self, action: PageAction<E>) -> Result<Option<Action>> {
        let notice = match action {
            PageAction::None => None,
            PageAction::Move(direction) => self.move_selected(direction),
            PageAction::Save => self.save(),
            PageAction::Reset => self.reset(),
            PageAction::Refresh => self.refetch(),
            PageAction::Table(event) => self.handle_table_event(event),
            PageAction::Notify(notice) => Some(notice),
        };
        self.sync_indicators()?;
        Ok(notice.map(Action::Notify))
    }

    /// Mirrors controller state into the table and the navigation bar.
    fn sync_indicators(&mut self) -> Result<()> {
        self.table.set_drag_enabled(!self.controller.is_pending());

        let unsaved = self.controller.has_unsaved_changes();
        if unsaved != self.shown_unsaved {
            self.shown_unsaved = unsaved;
            if let Some(tx) = &self.action_tx {
                tx.send(Action::SetUnsavedMarker {
                    page: E::PAGE,
                    unsaved,
                })?;
            }
        }
        Ok(())
    }

    fn relevant_keys(&self) -> Vec<RelevantKey> {
        let mut keys = vec![
            RelevantKey::new("↑↓", "选择"),
            RelevantKey::new("⇧↑↓", "移动"),
        ];
        if self.table.is_draggable() {
            keys.push(RelevantKey::new("Space", "拖动"));
        }
        keys.extend([
            RelevantKey::new("Tab/o", "排序"),
            RelevantKey::new("PgUp/PgDn", "翻页"),
            RelevantKey::new("+/-", "每页条数"),
            RelevantKey::new("r", "刷新"),
        ]);
        if self.is_batched() {
            keys.push(RelevantKey::new("s", "保存排序"));
            keys.push(RelevantKey::new("x", "还原"));
        }
        keys
    }
}

impl<E: CollectionEntity> Component for CollectionPage<E> {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn register_transport_handler(&mut self, tx: UnboundedSender<Command>) -> Result<()> {
        self.controller.transport_mut().tx = Some(tx);
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        let table = config.table;
        self.query.limit = table.page_size;
        self.table.set_page_size_options(table.page_size_options);
        self.table.set_drag_threshold(table.drag_activation_distance);
        Ok(())
    }

    fn init(&mut self, _area: Size) -> Result<()> {
        self.fetch()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if !self.active || key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        let action = key_handling::handle(self, key);
        self.perform_action(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.active {
            return Ok(None);
        }
        let action = match self.table.handle_mouse(self.controller.local_items(), mouse) {
            Some(event) => PageAction::Table(event),
            None => PageAction::None,
        };
        self.perform_action(action)
    }

    fn handle_transport_event(&mut self, event: transport::Event) -> Result<Option<Action>> {
        if event.collection() != E::COLLECTION {
            return Ok(None);
        }
        let action = transport_handling::handle(self, event);
        self.perform_action(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.table.tick(),
            Action::SetActivePage(page) => {
                self.active = page == E::PAGE;
                if self.active {
                    return Ok(Some(Action::SetRelevantKeys(self.relevant_keys())));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        let area = crate::layout::main_vert(LayoutSlot::MainCanvas, area);

        let mut block = Block::new()
            .borders(!Borders::BOTTOM)
            .border_type(BorderType::Rounded)
            .title(format!(" {} ", E::PAGE));
        if self.controller.is_pending() {
            block = block.title_top(Line::from(" 提交中… ").right_aligned().fg(tailwind::SKY.c400));
        } else if self.controller.has_unsaved_changes() {
            block = block.title_top(
                Line::from(" ● 有未保存的排序 ")
                    .right_aligned()
                    .fg(tailwind::AMBER.c400),
            );
        }
        frame.render_widget(&block, area);

        self.table
            .draw(frame, block.inner(area), self.controller.local_items());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::{
        components::data_table::{Pagination, SortConfig, SortDirection},
        reorder::Ticket,
        shared::EntityId,
        transport::{Banner, CareerItem, Category, Event, LoadedPage},
    };

    fn category(id: i64, rank: i64, name: &str) -> Category {
        Category {
            id: EntityId::Int(id),
            name: name.to_owned(),
            rank,
            description: None,
            item_count: 0,
        }
    }

    fn career_item(id: i64, rank: i64, title: &str) -> CareerItem {
        CareerItem {
            id: EntityId::Int(id),
            title: title.to_owned(),
            rank,
            category_name: None,
            is_published: true,
        }
    }

    fn started<E: CollectionEntity>(
        mut page: CollectionPage<E>,
    ) -> (CollectionPage<E>, UnboundedReceiver<Command>, UnboundedReceiver<Action>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        page.register_transport_handler(cmd_tx).unwrap();
        page.register_action_handler(action_tx).unwrap();
        page.init(Size::default()).unwrap();
        page.update(Action::SetActivePage(E::PAGE)).unwrap();
        (page, cmd_rx, action_rx)
    }

    fn load<E: CollectionEntity>(page: &mut CollectionPage<E>, fetch_id: u64, records: Records) {
        let total = records.count() as u64;
        let event = Event::PageLoaded {
            collection: E::COLLECTION,
            fetch_id,
            page: LoadedPage {
                records,
                pagination: Pagination::new(1, 20, total),
            },
        };
        page.handle_transport_event(event).unwrap();
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn names(page: &CollectionPage<Category>) -> Vec<String> {
        page.controller
            .local_items()
            .iter()
            .map(|it| it.name.clone())
            .collect()
    }

    fn last_reorder(cmd_rx: &mut UnboundedReceiver<Command>) -> (Ticket, Vec<i64>) {
        let mut last = None;
        while let Ok(cmd) = cmd_rx.try_recv() {
            if let Command::Reorder { ticket, ranks, .. } = cmd {
                let ids = ranks
                    .iter()
                    .map(|it| match it.id {
                        EntityId::Int(id) => id,
                        EntityId::Text(_) => -1,
                    })
                    .collect();
                last = Some((ticket, ids));
            }
        }
        last.expect("a reorder command")
    }

    fn categories_page() -> (CollectionPage<Category>, UnboundedReceiver<Command>, UnboundedReceiver<Action>) {
        let (mut page, cmd_rx, action_rx) = started(CollectionPage::<Category>::new(
            PersistenceMode::Immediate,
            SortMode::Internal,
            true,
        ));
        let records = Records::Categories(vec![
            category(3, 30, "C"),
            category(1, 10, "A"),
            category(2, 20, "B"),
        ]);
        load(&mut page, 1, records);
        (page, cmd_rx, action_rx)
    }

    #[test]
    fn test_init_fetches_first_page() {
        let (_page, mut cmd_rx, _) = started(CollectionPage::<Category>::new(
            PersistenceMode::Immediate,
            SortMode::Internal,
            false,
        ));

        let Ok(Command::FetchPage {
            collection,
            fetch_id,
            query,
        }) = cmd_rx.try_recv()
        else {
            panic!("expected a fetch");
        };
        assert_eq!(collection, Collection::Categories);
        assert_eq!(fetch_id, 1);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_loaded_page_is_rank_sorted() {
        let (page, _, _) = categories_page();

        assert_eq!(names(&page), vec!["A", "B", "C"]);
        assert!(!page.table.is_loading());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let (mut page, _cmd_rx, _action_rx) = categories_page();
        page.handle_key_event(key(KeyCode::Char('r'), KeyModifiers::NONE))
            .unwrap();

        load(&mut page, 1, Records::Categories(vec![category(9, 1, "Z")]));

        assert_eq!(names(&page), vec!["A", "B", "C"]);
        assert!(page.table.is_loading());
    }

    #[test]
    fn test_shift_move_submits_and_rolls_back_on_failure() {
        let (mut page, mut cmd_rx, _) = categories_page();

        page.handle_key_event(key(KeyCode::Down, KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(names(&page), vec!["B", "A", "C"]);
        let (ticket, ids) = last_reorder(&mut cmd_rx);
        assert_eq!(ids, vec![2, 1, 3]);

        // Busy while the request is out
        page.handle_key_event(key(KeyCode::Char('J'), KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(names(&page), vec!["B", "A", "C"]);

        let action = page
            .handle_transport_event(Event::ReorderFailed {
                collection: Collection::Categories,
                ticket,
                message: "502 Bad Gateway".into(),
            })
            .unwrap();

        assert_eq!(names(&page), vec!["A", "B", "C"]);
        assert!(matches!(action, Some(Action::Notify(notice)) if notice.message.contains("502")));
    }

    #[test]
    fn test_move_is_refused_while_sorted() {
        let (mut page, mut cmd_rx, _) = categories_page();
        page.handle_key_event(key(KeyCode::Tab, KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Char('o'), KeyModifiers::NONE))
            .unwrap();

        let action = page
            .handle_key_event(key(KeyCode::Down, KeyModifiers::SHIFT))
            .unwrap();

        assert!(matches!(action, Some(Action::Notify(_))));
        assert_eq!(names(&page), vec!["A", "B", "C"]);
        while let Ok(cmd) = cmd_rx.try_recv() {
            assert!(!matches!(cmd, Command::Reorder { .. }));
        }
    }

    #[test]
    fn test_other_collections_are_ignored() {
        let (mut page, _, _) = categories_page();

        let action = page
            .handle_transport_event(Event::FetchFailed {
                collection: Collection::Banners,
                fetch_id: 1,
                message: "boom".into(),
            })
            .unwrap();

        assert_eq!(action, None);
    }

    #[test]
    fn test_batched_drag_save_flow() {
        let (mut page, mut cmd_rx, mut action_rx) = started(CollectionPage::<CareerItem>::new(
            PersistenceMode::Batched,
            SortMode::Internal,
            true,
        ));
        let records = Records::CareerItems(vec![
            career_item(1, 1, "A"),
            career_item(2, 2, "B"),
            career_item(3, 3, "C"),
        ]);
        load(&mut page, 1, records);

        page.handle_key_event(key(KeyCode::Down, KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Down, KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Char(' '), KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Up, KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Up, KeyModifiers::NONE))
            .unwrap();
        page.handle_key_event(key(KeyCode::Char(' '), KeyModifiers::NONE))
            .unwrap();

        assert!(page.controller.has_unsaved_changes());
        let marked = std::iter::from_fn(|| action_rx.try_recv().ok()).any(|it| {
            it == Action::SetUnsavedMarker {
                page: Page::CareerItems,
                unsaved: true,
            }
        });
        assert!(marked);

        page.handle_key_event(key(KeyCode::Char('s'), KeyModifiers::NONE))
            .unwrap();
        let (ticket, ids) = last_reorder(&mut cmd_rx);
        assert_eq!(ids, vec![3, 1, 2]);

        page.handle_transport_event(Event::Reordered {
            collection: Collection::CareerItems,
            ticket,
        })
        .unwrap();
        assert!(!page.controller.has_unsaved_changes());
    }

    #[test]
    fn test_batched_reset_restores_server_order() {
        let (mut page, _cmd_rx, _action_rx) = started(CollectionPage::<CareerItem>::new(
            PersistenceMode::Batched,
            SortMode::Internal,
            true,
        ));
        load(
            &mut page,
            1,
            Records::CareerItems(vec![career_item(1, 1, "A"), career_item(2, 2, "B")]),
        );

        page.handle_key_event(key(KeyCode::Char('J'), KeyModifiers::SHIFT))
            .unwrap();
        assert!(page.controller.has_unsaved_changes());
        page.handle_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE))
            .unwrap();

        let titles: Vec<_> = page
            .controller
            .local_items()
            .iter()
            .map(|it| it.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(!page.controller.has_unsaved_changes());
    }
    fn banner(id: i64, rank: i64, title: &str) -> Banner {
        Banner {
            id: EntityId::Int(id),
            title: title.to_owned(),
            rank,
            image_url: None,
            link_url: None,
            is_active: true,
        }
    }

    #[test]
    fn test_server_sorted_page_is_shown_as_answered() {
        let (mut page, mut cmd_rx, _) = started(CollectionPage::<Banner>::new(
            PersistenceMode::Immediate,
            SortMode::External,
            false,
        ));
        let sort = SortConfig {
            key: "title",
            direction: SortDirection::Ascending,
        };

        page.perform_action(PageAction::Table(TableEvent::Sort(sort)))
            .unwrap();
        let sorted_fetch = std::iter::from_fn(|| cmd_rx.try_recv().ok())
            .filter_map(|cmd| match cmd {
                Command::FetchPage { fetch_id, query, .. } => Some((fetch_id, query.sort)),
                _ => None,
            })
            .last();
        assert_eq!(sorted_fetch, Some((2, Some(sort))));

        let records = Records::Banners(vec![
            banner(1, 3, "A"),
            banner(2, 2, "B"),
            banner(3, 1, "C"),
        ]);
        load(&mut page, 2, records);

        let titles: Vec<_> = page
            .controller
            .local_items()
            .iter()
            .map(|it| it.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_drop_on_immediate_page_waits_for_save() {
        let (mut page, mut cmd_rx, _action_rx) = categories_page();
        let mut dropped = page.controller.local_items().to_vec();
        dropped.swap(0, 1);

        page.perform_action(PageAction::Table(TableEvent::Reorder(dropped)))
            .unwrap();

        assert_eq!(names(&page), vec!["B", "A", "C"]);
        assert!(page.controller.has_unsaved_changes());
        while let Ok(cmd) = cmd_rx.try_recv() {
            assert!(!matches!(cmd, Command::Reorder { .. }));
        }
    }
}
