use color_eyre::Report;
use tracing::{error, info};

use super::{
    client::ApiClient,
    model::{Command, Event},
};

/// Runs one command against the backend. Failures become failure events, so every
/// command is answered by exactly one event.
pub(super) async fn handle(client: &ApiClient, cmd: Command) -> Event {
    match cmd {
        Command::FetchPage {
            collection,
            fetch_id,
            query,
        } => match client.fetch_page(collection, &query).await {
            Ok(page) => {
                info!(
                    "Loaded {} {collection} of page {}/{}",
                    page.records.count(),
                    page.pagination.page,
                    page.pagination.total_pages
                );
                Event::PageLoaded {
                    collection,
                    fetch_id,
                    page,
                }
            }
            Err(err) => {
                error!("Error fetching {collection}: {err:?}");
                Event::FetchFailed {
                    collection,
                    fetch_id,
                    message: describe(&err),
                }
            }
        },
        Command::Reorder {
            collection,
            ticket,
            ranks,
        } => match client.reorder(collection, &ranks).await {
            Ok(()) => Event::Reordered { collection, ticket },
            Err(err) => {
                error!("Error reordering {collection}: {err:?}");
                Event::ReorderFailed {
                    collection,
                    ticket,
                    message: describe(&err),
                }
            }
        },
    }
}

/// Short enough for the status bar: the innermost cause only.
fn describe(err: &Report) -> String {
    err.root_cause().to_string()
}
