//! Directory fetch handler.

use roster_core::directory::{DirectorySource, HttpDirectory};
use roster_core::pipeline::FetchTicket;

use crate::events::UiEvent;

pub async fn fetch_directory(source: HttpDirectory, ticket: FetchTicket) -> UiEvent {
    tracing::debug!(url = source.url(), "Fetching directory");
    let result = source.fetch().await;
    UiEvent::DirectoryFetched { ticket, result }
}
