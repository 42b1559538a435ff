use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info};

use super::{EventPublisher, TelemetryEvent};

/// In-process fan-out to channel subscribers
pub struct ChannelPublisher {
    subscribers: Vec<Sender<TelemetryEvent>>,
    capacity: usize,
    dropped: u64,
}

impl ChannelPublisher {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// New listener; it only sees events broadcast after this call
    pub fn subscribe(&mut self) -> Receiver<TelemetryEvent> {
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.push(sender);
        receiver
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Events lost to full subscriber queues
    #[cfg(test)]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl EventPublisher for ChannelPublisher {
    fn broadcast(&mut self, stream: &str, payload: &str, timestamp: u64) {
        if self.subscribers.is_empty() {
            return;
        }

        let event = TelemetryEvent::new(stream, payload, timestamp);
        let mut dropped = 0;
        self.subscribers.retain(|subscriber| match subscriber.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                info!("Telemetry listener disconnected");
                false
            }
        });

        if dropped > 0 {
            self.dropped += dropped;
            debug!(
                "Dropped '{}' event for {} slow listener(s), {} lost so far",
                stream, dropped, self.dropped
            );
        }
    }
}
