//! Per-session publish/subscribe.
//!
//! Each subscriber is a bounded channel. Publishing never waits: a subscriber
//! whose queue is full or whose receiver has gone away is dropped on the spot.

use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

pub type SubscriberId = u64;

/// A live subscription; dropping `receiver` ends it at the next publish.
#[derive(Debug)]
pub struct Subscription<T> {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<T>,
}

#[derive(Debug)]
pub struct Hub<T> {
    capacity: usize,
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, mpsc::Sender<T>>,
}

impl<T: Clone> Hub<T> {
    /// `capacity` is the per-subscriber queue length and must be at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: 0,
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber and hand it `initial` before anything else.
    ///
    /// The subscriber is only kept if `initial` was queued.
    pub fn subscribe(&mut self, initial: T) -> Subscription<T> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = self.next_id;
        self.next_id += 1;

        // Without its snapshot the subscriber is not registered, and the
        // receiver sees a closed channel.
        match tx.try_send(initial) {
            Ok(()) => {
                self.subscribers.insert(id, tx);
            }
            Err(e) => debug!(subscriber = id, "Initial snapshot not delivered: {}", e),
        }

        Subscription { id, receiver: rx }
    }

    /// Returns whether the subscriber was still registered
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Offer `event` to every subscriber; returns how many accepted it.
    pub fn publish(&mut self, event: &T) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|id, tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(subscriber = id, "Dropping lagging subscriber");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = id, "Dropping closed subscriber");
                false
            }
        });
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
