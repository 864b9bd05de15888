/// LoadFailureNotifier - fan-out of load failures to subscribers.
///
/// Failures arrive from the selection engine on any thread; the tileset
/// lifecycle re-posts them to the main-thread queue, so `broadcast`
/// always runs on the main thread.

use std::sync::Mutex;
use crate::selection::LoadError;

const SOURCE: &str = "galaxy3d::tiles::LoadFailureNotifier";

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&LoadError) + Send>;

#[derive(Default)]
pub struct LoadFailureNotifier {
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Mutex<u64>,
}

impl LoadFailureNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&LoadError) + Send + 'static) -> SubscriptionId {
        let id = match self.next_id.lock() {
            Ok(mut next) => {
                *next += 1;
                SubscriptionId(*next)
            }
            Err(_) => SubscriptionId(0),
        };
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push((id, Box::new(subscriber)));
        }
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Log the failure and hand it to every subscriber
    pub fn broadcast(&self, error: &LoadError) {
        crate::engine_warn!(
            SOURCE,
            "{:?} load failed (HTTP {}): {}",
            error.request_type, error.http_status_code, error.message
        );
        if let Ok(subscribers) = self.subscribers.lock() {
            for (_, subscriber) in subscribers.iter() {
                subscriber(error);
            }
        }
    }
}

#[cfg(test)]
#[path = "load_failure_tests.rs"]
mod tests;
