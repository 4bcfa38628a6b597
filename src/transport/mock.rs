//! Mock transport for testing.
//!
//! An in-memory hub: tests inject messages either queued (delivered on the
//! next `service_once`, modeling a poll-driven middleware) or immediately
//! (modeling delivery from an asynchronous callback thread). Published
//! payloads are captured for inspection.

use super::{RequestFn, SubscriberFn, Transport};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Mock transport hub for unit and integration testing
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    subscribers: HashMap<String, Vec<SubscriberFn>>,
    handlers: HashMap<String, RequestFn>,
    pending: VecDeque<(String, Vec<u8>)>,
    published: HashMap<String, Vec<Vec<u8>>>,
}

impl MockTransport {
    /// Create a new empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery on the next `service_once`
    pub fn inject(&self, channel: &str, payload: &[u8]) {
        let mut inner = self.inner.lock();
        inner.pending.push_back((channel.to_string(), payload.to_vec()));
    }

    /// Deliver a message to subscribers immediately, from the calling thread
    pub fn inject_now(&self, channel: &str, payload: &[u8]) {
        self.dispatch(channel, payload);
    }

    /// Invoke a registered request handler and return its response
    pub fn request(&self, name: &str, payload: &[u8]) -> Result<Vec<u8>> {
        // Take the handler out so it can re-enter the hub (e.g. publish).
        let mut handler = {
            let mut inner = self.inner.lock();
            inner
                .handlers
                .remove(name)
                .ok_or_else(|| Error::Transport(format!("no handler registered for '{}'", name)))?
        };

        let result = handler(payload);

        self.inner.lock().handlers.insert(name.to_string(), handler);
        result
    }

    /// All payloads published on a channel so far
    pub fn published(&self, channel: &str) -> Vec<Vec<u8>> {
        self.inner
            .lock()
            .published
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of messages still queued for delivery
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    fn dispatch(&self, channel: &str, payload: &[u8]) {
        // Callbacks run without the hub lock held so they may call back in.
        let mut subscribers = {
            let mut inner = self.inner.lock();
            inner.subscribers.remove(channel).unwrap_or_default()
        };

        for callback in subscribers.iter_mut() {
            callback(payload);
        }

        let mut inner = self.inner.lock();
        // Keep any subscribers registered while dispatching.
        if let Some(added) = inner.subscribers.remove(channel) {
            subscribers.extend(added);
        }
        inner.subscribers.insert(channel.to_string(), subscribers);
    }
}

impl Transport for MockTransport {
    fn subscribe(&self, channel: &str, callback: SubscriberFn) -> Result<()> {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .entry(channel.to_string())
            .or_default()
            .push(callback);
        Ok(())
    }

    fn service_once(&self) -> Result<()> {
        loop {
            let next = self.inner.lock().pending.pop_front();
            match next {
                Some((channel, payload)) => self.dispatch(&channel, &payload),
                None => break,
            }
        }
        Ok(())
    }

    fn register_request_handler(&self, name: &str, handler: RequestFn) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner
            .published
            .entry(channel.to_string())
            .or_default()
            .push(payload.to_vec());
        Ok(())
    }
}
