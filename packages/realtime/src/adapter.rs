//! Change-feed adapter: turns store mutations into ItemAdded broadcasts.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use list_core::{BroadcastEvent, ChangeFeed, ChangeOperation, ChangeRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::broadcaster::Broadcaster;

/// How a single change record is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    /// Broadcast this event.
    Accept(BroadcastEvent),
    /// Not an operation that adds an item.
    Ignore(ChangeOperation),
    /// An insert or replace without usable text.
    Malformed(&'static str),
}

/// Decide what to do with `record`.
///
/// Only `insert` and `replace` carrying a non-empty `fullDocument.text`
/// produce an event. The document id, when present, becomes the sequence id.
pub fn classify(record: &ChangeRecord) -> Relevance {
    let operation = record.operation();
    if !operation.adds_item() {
        return Relevance::Ignore(operation);
    }

    let Some(document) = record.full_document.as_ref() else {
        return Relevance::Malformed("missing fullDocument");
    };

    let text = match document.text.as_deref() {
        None => return Relevance::Malformed("missing fullDocument.text"),
        Some("") => return Relevance::Malformed("empty fullDocument.text"),
        Some(text) => text,
    };

    let mut event = BroadcastEvent::item_added(text);
    if let Some(id) = &document.id {
        event = event.with_sequence_id(id.clone());
    }
    Relevance::Accept(event)
}

/// Supervised subscription loop over a [`ChangeFeed`].
///
/// Feed failures never end the loop: a failed subscribe, a stream error, or a
/// closed stream is logged and the feed is re-subscribed after a doubling
/// delay between `retry_initial` and `retry_max`. The loop only exits when the
/// broadcaster is gone.
pub struct FeedAdapter {
    feed: Arc<dyn ChangeFeed>,
    broadcaster: Broadcaster,
    retry_initial: Duration,
    retry_max: Duration,
    subscribed: watch::Sender<bool>,
}

impl FeedAdapter {
    pub fn new(feed: Arc<dyn ChangeFeed>, broadcaster: Broadcaster) -> Self {
        Self {
            feed,
            broadcaster,
            retry_initial: Duration::from_millis(250),
            retry_max: Duration::from_secs(10),
            subscribed: watch::Sender::new(false),
        }
    }

    /// Whether a feed subscription is currently open.
    pub fn status(&self) -> watch::Receiver<bool> {
        self.subscribed.subscribe()
    }

    /// Set the re-subscribe backoff bounds.
    pub fn with_retry(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_initial = initial;
        self.retry_max = max.max(initial);
        self
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let mut backoff = self.retry_initial;

        loop {
            match self.feed.subscribe().await {
                Ok(mut records) => {
                    tracing::info!("Subscribed to change feed");
                    backoff = self.retry_initial;
                    self.subscribed.send_replace(true);

                    while let Some(next) = records.next().await {
                        match next {
                            Ok(record) => {
                                if !self.forward(&record).await {
                                    return;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Dropping unreadable change record");
                            }
                        }
                    }

                    self.subscribed.send_replace(false);
                    tracing::warn!(
                        retry_in_ms = backoff.as_millis() as u64,
                        "Change feed closed, resubscribing"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "Change feed subscription failed"
                    );
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.retry_max);
        }
    }

    /// Returns `false` once the broadcaster is unavailable.
    async fn forward(&self, record: &ChangeRecord) -> bool {
        match classify(record) {
            Relevance::Accept(event) => {
                tracing::info!("{}", event.description());
                match self.broadcaster.publish(event).await {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!(error = %e, "Change feed adapter stopping");
                        false
                    }
                }
            }
            Relevance::Ignore(op) => {
                tracing::debug!(op = %op, "Ignoring change record");
                true
            }
            Relevance::Malformed(reason) => {
                tracing::warn!(
                    op = %record.operation_type,
                    reason,
                    "Dropping malformed change record"
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use list_core::{EventKind, ItemDocument};

    use super::*;

    fn record(op: &str, id: Option<&str>, text: Option<&str>) -> ChangeRecord {
        ChangeRecord {
            operation_type: op.to_string(),
            full_document: Some(ItemDocument {
                id: id.map(str::to_string),
                text: text.map(str::to_string),
                created_at: None,
            }),
        }
    }

    #[test]
    fn test_insert_and_replace_are_accepted() {
        for op in ["insert", "replace"] {
            let Relevance::Accept(event) = classify(&record(op, Some("01A"), Some("milk"))) else {
                panic!("{op} should be accepted");
            };
            assert_eq!(event.kind, EventKind::ItemAdded);
            assert_eq!(event.payload, "milk");
            assert_eq!(event.sequence_id.as_deref(), Some("01A"));
        }
    }

    #[test]
    fn test_missing_id_leaves_sequence_empty() {
        let Relevance::Accept(event) = classify(&ChangeRecord::insert("eggs")) else {
            panic!("insert should be accepted");
        };
        assert_eq!(event.sequence_id, None);
    }

    #[test]
    fn test_other_operations_are_ignored() {
        assert_eq!(
            classify(&record("delete", None, Some("milk"))),
            Relevance::Ignore(ChangeOperation::Delete)
        );
        assert_eq!(
            classify(&record("update", None, Some("milk"))),
            Relevance::Ignore(ChangeOperation::Update)
        );
        assert_eq!(
            classify(&record("invalidate", None, None)),
            Relevance::Ignore(ChangeOperation::Other("invalidate".to_string()))
        );
    }

    #[test]
    fn test_malformed_inserts() {
        let no_doc = ChangeRecord::new(ChangeOperation::Insert, None);
        assert!(matches!(classify(&no_doc), Relevance::Malformed(_)));
        assert!(matches!(
            classify(&record("insert", None, None)),
            Relevance::Malformed(_)
        ));
        assert!(matches!(
            classify(&record("insert", None, Some(""))),
            Relevance::Malformed(_)
        ));
    }
}
