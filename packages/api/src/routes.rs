//! Route handlers.

use std::convert::Infallible;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use futures_util::{Stream, StreamExt};
use list_core::BroadcastEvent;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/create", post(create_item))
        .route("/items", get(list_items))
        .route("/sse", get(stream_events))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
struct CreateItemForm {
    item: Option<String>,
}

async fn create_item(
    State(state): State<AppState>,
    Form(form): Form<CreateItemForm>,
) -> Result<impl IntoResponse> {
    let text = form
        .item
        .filter(|item| !item.is_empty())
        .ok_or(ApiError::ItemNotProvided)?;

    tracing::info!(item = %text, "Create item");
    let item = state.store.append(&text).await?;
    tracing::debug!(id = %item.id, "Item stored");

    Ok((StatusCode::CREATED, "Item created"))
}

async fn list_items(State(state): State<AppState>) -> Result<Html<String>> {
    let items = state.store.list_recent(state.items_limit).await?;

    let html = items
        .iter()
        .map(|item| {
            format!(
                r#"<div class="item">{}</div>"#,
                escape_html(item.text.as_str())
            )
        })
        .collect::<String>();

    Ok(Html(html))
}

async fn stream_events(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let subscription = state.endpoint.open()?;
    let events = subscription
        .into_stream()
        .map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// SSE frame for a broadcast event: `event:` name, `data:` payload and an
/// `id:` line when the event carries a sequence id.
pub fn to_sse_event(event: &BroadcastEvent) -> Event {
    let frame = Event::default()
        .event(event.event_name())
        .data(event.payload.as_str());
    match &event.sequence_id {
        Some(id) => frame.id(id.as_str()),
        None => frame,
    }
}

/// Escape text for use inside HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("milk"), "milk");
        assert_eq!(
            escape_html(r#"<b>"fish" & 'chips'</b>"#),
            "&lt;b&gt;&quot;fish&quot; &amp; &#39;chips&#39;&lt;/b&gt;"
        );
    }
}
