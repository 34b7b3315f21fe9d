//! Debounced confidentiality scanning.
//!
//! Each `schedule` call cancels the pending timer (if any) and starts a new one;
//! only the timer that survives a full quiescence window dispatches a scan.
//! A dispatched scan is never cancelled: its outcome is published when it
//! arrives, even if newer edits exist (last write wins). At most one scan is
//! in flight; a timer that fires while another scan runs waits its turn.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::ContentBlock;
use crate::scanner::classifier::{run_scan, ConfidentialityClassifier, ScanOutcome};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct ScanScheduler {
    classifier: Arc<dyn ConfidentialityClassifier>,
    keywords: Arc<[String]>,
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
    in_flight: Arc<tokio::sync::Mutex<()>>,
    latest: Arc<watch::Sender<Option<ScanOutcome>>>,
}

impl ScanScheduler {
    pub fn new(
        classifier: Arc<dyn ConfidentialityClassifier>,
        keywords: Vec<String>,
        delay: Duration,
    ) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            classifier,
            keywords: keywords.into(),
            delay,
            pending: Mutex::new(None),
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
            latest: Arc::new(tx),
        }
    }

    /// Restarts the quiescence timer for `blocks`. Must be called inside a tokio runtime.
    pub fn schedule(&self, blocks: Vec<ContentBlock>) {
        let token = CancellationToken::new();
        if let Some(previous) = self.swap_pending(Some(token.clone())) {
            previous.cancel();
            debug!("Superseded pending confidentiality scan");
        }

        let classifier = Arc::clone(&self.classifier);
        let keywords = Arc::clone(&self.keywords);
        let latest = Arc::clone(&self.latest);
        let in_flight = Arc::clone(&self.in_flight);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            // Past this point the scan is dispatched and is no longer cancellable.
            let _slot = in_flight.lock().await;
            let outcome = run_scan(classifier.as_ref(), &keywords, &blocks).await;
            latest.send_replace(Some(outcome));
        });
    }

    /// Cancels the pending timer, if any. In-flight scans are unaffected.
    pub fn cancel_pending(&self) {
        if let Some(token) = self.swap_pending(None) {
            token.cancel();
        }
    }

    /// Most recent published outcome.
    pub fn latest(&self) -> Option<ScanOutcome> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ScanOutcome>> {
        self.latest.subscribe()
    }

    fn swap_pending(&self, next: Option<CancellationToken>) -> Option<CancellationToken> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *pending, next)
    }
}

impl Drop for ScanScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
