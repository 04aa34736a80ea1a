use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::PollingConfig;
use crate::platform::{Marker, Platform, UpdateBatch};
use crate::router::Router;

/// Long-polling driver: fetches update batches and feeds them to the router.
pub struct Poller {
    platform: Arc<dyn Platform>,
    router: Router,
    config: PollingConfig,
}

impl Poller {
    pub fn new(platform: Arc<dyn Platform>, router: Router, config: PollingConfig) -> Self {
        Self {
            platform,
            router,
            config,
        }
    }

    /// Route every update of `batch` in arrival order and return the marker
    /// for the next fetch. A batch without a marker keeps the current one.
    async fn advance(&self, marker: Option<Marker>, batch: UpdateBatch) -> Option<Marker> {
        for update in batch.updates {
            self.router.route(update).await;
        }
        batch.marker.or(marker)
    }

    /// Poll until `shutdown` resolves.
    ///
    /// Shutdown is observed while waiting on the long poll or the retry
    /// delay, never halfway through a batch. A failed fetch is logged and
    /// retried after `retry_delay_secs` with the same marker.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut marker: Option<Marker> = None;

        loop {
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                fetched = self.platform.fetch_updates(
                    marker,
                    self.config.timeout_secs,
                    self.config.limit,
                ) => fetched,
            };

            match fetched {
                Ok(batch) => marker = self.advance(marker, batch).await,
                Err(e) => {
                    error!("Polling failed: {}", e);
                    info!("Retrying in {} seconds...", self.config.retry_delay_secs);
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.config.retry_delay()) => {}
                    }
                }
            }
        }

        info!("Polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::responder;
    use crate::error::ApiError;
    use crate::platform::max::tests::{client, UNREACHABLE};
    use crate::platform::max::MaxClient;
    use crate::platform::{BotInfo, BotStarted, ChatId, MessageAck, OutboundMessage, Update};
    use crate::testing::{protocol_error, Call, FakePlatform};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Real HTTP client that counts how often the feed was polled.
    struct CountingClient {
        inner: MaxClient,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl Platform for CountingClient {
        async fn get_bot_info(&self) -> Result<BotInfo, ApiError> {
            self.inner.get_bot_info().await
        }

        async fn send_message(
            &self,
            chat_id: ChatId,
            message: &OutboundMessage,
        ) -> Result<MessageAck, ApiError> {
            self.inner.send_message(chat_id, message).await
        }

        async fn answer_callback(
            &self,
            callback_id: &str,
            notification: &str,
        ) -> Result<(), ApiError> {
            self.inner.answer_callback(callback_id, notification).await
        }

        async fn fetch_updates(
            &self,
            marker: Option<Marker>,
            timeout: u32,
            limit: u32,
        ) -> Result<UpdateBatch, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_updates(marker, timeout, limit).await
        }
    }

    fn poller(platform: Arc<FakePlatform>) -> Poller {
        let router = Router::new(responder(platform.clone()), None);
        Poller::new(platform, router, PollingConfig::default())
    }

    fn started(chat_id: i64) -> Update {
        Update::BotStarted(BotStarted {
            chat_id: Some(chat_id),
            ..BotStarted::default()
        })
    }

    fn batch(updates: Vec<Update>, marker: Option<Marker>) -> Result<UpdateBatch, ApiError> {
        Ok(UpdateBatch { updates, marker })
    }

    #[tokio::test]
    async fn test_batch_without_marker_keeps_previous() {
        let (platform, exhausted) = FakePlatform::with_fetches(vec![
            batch(vec![], Some(10)),
            batch(vec![started(1)], None),
        ]);
        let platform = Arc::new(platform);

        poller(platform.clone())
            .run(async {
                let _ = exhausted.await;
            })
            .await;

        assert_eq!(platform.fetch_markers(), vec![None, Some(10), Some(10)]);
        assert_eq!(platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_each_fetch_uses_previous_marker() {
        let (platform, exhausted) = FakePlatform::with_fetches(vec![
            batch(vec![started(1)], Some(100)),
            batch(vec![], Some(101)),
            batch(vec![started(2), started(3)], Some(105)),
        ]);
        let platform = Arc::new(platform);

        poller(platform.clone())
            .run(async {
                let _ = exhausted.await;
            })
            .await;

        assert_eq!(
            platform.fetch_markers(),
            vec![None, Some(100), Some(101), Some(105)]
        );
    }

    #[tokio::test]
    async fn test_updates_routed_in_order() {
        let (platform, exhausted) = FakePlatform::with_fetches(vec![batch(
            vec![started(1), started(2), started(3)],
            Some(1),
        )]);
        let platform = Arc::new(platform);

        poller(platform.clone())
            .run(async {
                let _ = exhausted.await;
            })
            .await;

        let chats: Vec<_> = platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { chat_id, .. } => Some(chat_id),
                _ => None,
            })
            .collect();
        assert_eq!(chats, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_loop() {
        let (platform, exhausted) = FakePlatform::with_fetches(vec![
            batch(vec![], Some(7)),
            Err(protocol_error("GET /updates")),
            batch(vec![started(4)], Some(8)),
        ]);
        let platform = Arc::new(platform);
        let started_at = tokio::time::Instant::now();

        poller(platform.clone())
            .run(async {
                let _ = exhausted.await;
            })
            .await;

        // The failed fetch is retried with the same marker after the delay.
        assert_eq!(
            platform.fetch_markers(),
            vec![None, Some(7), Some(7), Some(8)]
        );
        assert!(started_at.elapsed() >= Duration::from_secs(5));
        assert_eq!(platform.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_retry_delay() {
        let (platform, _exhausted) =
            FakePlatform::with_fetches(vec![Err(protocol_error("GET /updates"))]);
        let platform = Arc::new(platform);

        poller(platform.clone())
            .run(tokio::time::sleep(Duration::from_secs(1)))
            .await;

        assert_eq!(platform.fetch_markers(), vec![None]);
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_polling_until_shutdown() {
        let platform = Arc::new(CountingClient {
            inner: client(UNREACHABLE),
            fetches: AtomicUsize::new(0),
        });
        let router = Router::new(responder(Arc::new(FakePlatform::new())), None);
        let config = PollingConfig {
            retry_delay_secs: 0,
            ..PollingConfig::default()
        };
        let started_at = std::time::Instant::now();

        Poller::new(platform.clone(), router, config)
            .run(tokio::time::sleep(Duration::from_millis(300)))
            .await;

        assert!(platform.fetches.load(Ordering::SeqCst) >= 2);
        assert!(started_at.elapsed() >= Duration::from_millis(300));
    }
}
