//! Outlets for fetched price payloads.

use tokio::sync::mpsc;

/// Accepts payloads without waiting for or reporting delivery.
pub trait Publisher: Send + Sync {
    /// Hands `payload` off. Failures are logged, never returned.
    fn publish(&self, payload: String);
}

/// Forwards payloads into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, payload: String) {
        if self.tx.send(payload).is_err() {
            log::warn!("Dropping price payload: receiver closed");
        }
    }
}

/// Logs the size of each payload and discards it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&self, payload: String) {
        log::info!("Price payload ({} bytes)", payload.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_delivers_in_order() {
        let (publisher, mut rx) = ChannelPublisher::channel();
        publisher.publish("one".to_string());
        publisher.publish("two".to_string());
        assert_eq!(rx.try_recv().unwrap(), "one");
        assert_eq!(rx.try_recv().unwrap(), "two");
    }

    #[test]
    fn closed_channel_is_not_an_error() {
        let (publisher, rx) = ChannelPublisher::channel();
        drop(rx);
        publisher.publish("lost".to_string());
    }
}
