#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use list_core::{ChangeFeed, ChangeRecord, FeedError, FeedFuture};
use tokio::sync::mpsc;

type Sender = mpsc::UnboundedSender<Result<ChangeRecord, FeedError>>;

/// Poll `condition` until it holds or five seconds pass.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Change feed driven by the test. Each successful subscribe opens a fresh
/// channel; `close` ends the current stream.
#[derive(Default)]
pub struct ScriptedFeed {
    current: Mutex<Option<Sender>>,
    attempts: AtomicUsize,
    failures_left: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` subscribe calls fail.
    pub fn fail_next_subscribes(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_subscribed(&self) -> bool {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Emit a record on the open stream. Returns `false` if none is open.
    pub fn push(&self, record: ChangeRecord) -> bool {
        self.emit(Ok(record))
    }

    pub fn push_error(&self, message: &str) -> bool {
        self.emit(Err(FeedError::Stream(message.to_string())))
    }

    fn emit(&self, item: Result<ChangeRecord, FeedError>) -> bool {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }

    /// End the current stream.
    pub fn close(&self) {
        self.current.lock().unwrap().take();
    }
}

impl ChangeFeed for ScriptedFeed {
    fn subscribe(&self) -> FeedFuture<'_> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);

            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(FeedError::Subscribe("scripted failure".to_string()));
            }

            let (tx, rx) = mpsc::unbounded_channel();
            *self.current.lock().unwrap() = Some(tx);

            let records = stream::unfold(rx, |mut rx| async move {
                let item = rx.recv().await?;
                Some((item, rx))
            });
            Ok(records.boxed())
        })
    }
}
