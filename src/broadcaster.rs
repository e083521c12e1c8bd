use crate::decorate::Decorator;
use crate::discord::ChatSink;
use crate::history::ConversationId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No conversation has been active yet.
    Skipped,
    Sent(ConversationId),
    Failed(ConversationId),
}

/// Posts a decorated phrase into the most recently active conversation on a
/// fixed cadence, independent of inbound traffic.
///
/// The interval is measured from the end of the previous tick. A failed
/// tick is logged and the loop carries on.
#[derive(Clone)]
pub struct CadenceBroadcaster {
    sink: Arc<dyn ChatSink>,
    decorator: Arc<Decorator>,
    last_active: watch::Receiver<Option<ConversationId>>,
    phrase: String,
    interval: Duration,
    cancel: CancellationToken,
}

impl CadenceBroadcaster {
    pub fn new(
        sink: Arc<dyn ChatSink>,
        decorator: Arc<Decorator>,
        last_active: watch::Receiver<Option<ConversationId>>,
        phrase: impl Into<String>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            sink,
            decorator,
            last_active,
            phrase: phrase.into(),
            interval,
            cancel,
        }
    }

    /// Run until the cancellation token fires.
    ///
    /// ```rust,ignore
    /// let broadcaster = CadenceBroadcaster::new(sink, decorator, rx, phrase, interval, cancel.child_token());
    /// tokio::spawn(broadcaster.run());
    /// ```
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "cadence broadcaster started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("cadence broadcaster stopped");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    // Each tick runs in its own task so a panic only costs that tick.
                    let ticker = self.clone();
                    match tokio::spawn(async move { ticker.tick().await }).await {
                        Ok(outcome) => debug!(?outcome, "cadence tick finished"),
                        Err(e) => error!(error = %e, "cadence tick aborted"),
                    }
                }
            }
        }
    }

    pub async fn tick(&self) -> TickOutcome {
        let current = *self.last_active.borrow();
        let Some(conversation) = current else {
            debug!("no active conversation, skipping cadence tick");
            return TickOutcome::Skipped;
        };

        let text = self
            .decorator
            .append_with(&self.phrase, &mut rand::thread_rng());
        match self.sink.send(conversation, &text).await {
            Ok(()) => {
                info!(conversation, "cadence message sent");
                TickOutcome::Sent(conversation)
            }
            Err(e) => {
                warn!(conversation, error = %e, "cadence message failed");
                TickOutcome::Failed(conversation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecorationPolicy;
    use crate::test_support::{test_tokens, RecordingSink};

    const PHRASE: &str = "still here. still judging you.";

    fn broadcaster(
        sink: Arc<RecordingSink>,
        rx: watch::Receiver<Option<ConversationId>>,
        cancel: CancellationToken,
    ) -> CadenceBroadcaster {
        CadenceBroadcaster::new(
            sink,
            Arc::new(Decorator::new(test_tokens(), DecorationPolicy::default())),
            rx,
            PHRASE,
            Duration::from_secs(60),
            cancel,
        )
    }

    #[tokio::test]
    async fn unset_pointer_skips_without_sending() {
        let sink = Arc::new(RecordingSink::new());
        let (_tx, rx) = watch::channel(None);
        let b = broadcaster(sink.clone(), rx, CancellationToken::new());

        assert_eq!(b.tick().await, TickOutcome::Skipped);
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn tick_sends_decorated_phrase_to_last_active() {
        let sink = Arc::new(RecordingSink::new());
        let (tx, rx) = watch::channel(None);
        let b = broadcaster(sink.clone(), rx, CancellationToken::new());

        tx.send_replace(Some(7));
        assert_eq!(b.tick().await, TickOutcome::Sent(7));
        tx.send_replace(Some(8));
        assert_eq!(b.tick().await, TickOutcome::Sent(8));

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, 7);
        assert_eq!(sent[1].0, 8);
        for (_, text) in sent {
            assert!(text.starts_with(PHRASE));
            let tokens = text[PHRASE.len()..].split_whitespace().count();
            assert!((1..=3).contains(&tokens));
        }
    }

    #[tokio::test]
    async fn send_failure_is_reported_as_failed_tick() {
        let sink = Arc::new(RecordingSink::failing());
        let (_tx, rx) = watch::channel(Some(9));
        let b = broadcaster(sink.clone(), rx, CancellationToken::new());

        assert_eq!(b.tick().await, TickOutcome::Failed(9));
        assert_eq!(b.tick().await, TickOutcome::Failed(9));
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_on_interval_and_stops_on_cancel() {
        let sink = Arc::new(RecordingSink::new());
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(broadcaster(sink.clone(), rx, cancel.clone()).run());

        // First interval: nothing active yet.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(sink.attempts(), 0);

        tx.send_replace(Some(42));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.attempts(), 1);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.attempts(), 2);

        cancel.cancel();
        handle.await.unwrap();
        assert!(sink.sent().iter().all(|(c, _)| *c == 42));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_ticks_do_not_stop_the_loop() {
        let sink = Arc::new(RecordingSink::failing());
        let (_tx, rx) = watch::channel(Some(5));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(broadcaster(sink.clone(), rx, cancel.clone()).run());

        tokio::time::sleep(Duration::from_secs(60 * 3 + 1)).await;
        assert_eq!(sink.attempts(), 3);

        cancel.cancel();
        handle.await.unwrap();
    }
}
