use tracing::{debug, error};

use super::{CollectionEntity, CollectionPage, action::PageAction};
use crate::{action::Notice, transport::Event};

pub(super) fn handle<E: CollectionEntity>(page: &mut CollectionPage<E>, event: Event) -> PageAction<E> {
    match event {
        Event::PageLoaded {
            fetch_id,
            page: loaded,
            ..
        } if fetch_id == page.fetch_id => {
            page.table.set_loading(false);
            let Some(items) = E::from_records(loaded.records) else {
                error!("Records of {} answered with another collection", E::COLLECTION);
                return PageAction::Notify(Notice::error(format!("加载{}失败：数据格式不匹配", E::PAGE)));
            };
            page.query.page = loaded.pagination.page;
            page.query.limit = loaded.pagination.limit;
            page.table.set_pagination(Some(loaded.pagination));
            // Rows sorted by the server stay in the order they arrived in.
            if page.query.sort.is_some() {
                page.controller.sync_from_server_as_is(items);
            } else {
                page.controller.sync_from_server(items);
            }
            page.table.clamp_selection(page.controller.local_items().len());
            PageAction::None
        }
        Event::FetchFailed {
            fetch_id, message, ..
        } if fetch_id == page.fetch_id => {
            page.table.set_loading(false);
            PageAction::Notify(Notice::error(format!("加载{}失败：{message}", E::PAGE)))
        }
        Event::PageLoaded { fetch_id, .. } | Event::FetchFailed { fetch_id, .. } => {
            debug!("Dropping answer to superseded fetch {fetch_id} of {}", E::COLLECTION);
            PageAction::None
        }
        Event::Reordered { ticket, .. } => notify(page.controller.handle_outcome(ticket, Ok(()))),
        Event::ReorderFailed { ticket, message, .. } => {
            notify(page.controller.handle_outcome(ticket, Err(message)))
        }
    }
}

fn notify<E>(notice: Option<Notice>) -> PageAction<E> {
    notice.map_or(PageAction::None, PageAction::Notify)
}
