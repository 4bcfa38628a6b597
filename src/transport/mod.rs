//! Transport layer boundary.
//!
//! The bridge never talks to the network itself; the hosting process
//! supplies an implementation of [`Transport`] (message bus, middleware
//! binding, in-process hub). Subscriber callbacks may be invoked from any
//! thread, including re-entrantly from within [`Transport::service_once`],
//! so implementations must not hold internal locks while dispatching.

use crate::error::Result;

pub mod mock;
pub use mock::MockTransport;

/// Handler invoked once per delivered message
pub type SubscriberFn = Box<dyn FnMut(&[u8]) + Send>;

/// Synchronous request/response handler; the returned bytes are the response
pub type RequestFn = Box<dyn FnMut(&[u8]) -> Result<Vec<u8>> + Send>;

/// Transport trait for stream subscription and publication
pub trait Transport: Send + Sync {
    /// Register a handler invoked once per message delivered on `channel`.
    ///
    /// The callback may fire from an unspecified thread or from inside
    /// `service_once`.
    fn subscribe(&self, channel: &str, callback: SubscriberFn) -> Result<()>;

    /// Perform one non-blocking dispatch of any pending deliveries.
    fn service_once(&self) -> Result<()>;

    /// Expose a named synchronous request/response endpoint.
    fn register_request_handler(&self, name: &str, handler: RequestFn) -> Result<()>;

    /// Emit a payload to a named channel.
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()>;
}
