//! Filtered subscription wrapper, ported from `crawl_events::streaming`.

use tokio::sync::broadcast;

use super::errors::EventBusError;
use super::types::CrawlEvent;

/// A `broadcast::Receiver` that only yields events passing `filter`.
pub struct FilteredReceiver<F>
where
    F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
{
    receiver: broadcast::Receiver<CrawlEvent>,
    filter: F,
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
{
    pub fn new(receiver: broadcast::Receiver<CrawlEvent>, filter: F) -> Self {
        Self { receiver, filter }
    }

    pub async fn recv(&mut self) -> Result<CrawlEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if (self.filter)(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(broadcast::error::RecvError::Lagged(n)) => return Err(EventBusError::ReceiverLagged(n)),
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<CrawlEvent, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if (self.filter)(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::TryRecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(broadcast::error::TryRecvError::Lagged(n)) => return Err(EventBusError::ReceiverLagged(n)),
                Err(broadcast::error::TryRecvError::Empty) => return Err(EventBusError::PublishFailed("no event available".into())),
            }
        }
    }

    pub fn would_receive(&self, event: &CrawlEvent) -> bool {
        (self.filter)(event)
    }
}
