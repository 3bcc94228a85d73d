// Herald - an in-process event dispatcher for Rust
//
// This library maps event names to handlers and fans dispatched events out
// to every registered handler concurrently.

// Re-export the dispatcher
pub use herald_events::*;

// Re-export crates used by handler implementations
pub use async_trait::async_trait;
pub use serde_json;
pub use tokio;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::async_trait;
    pub use herald_events::{
        Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherError, Event, EventHandler,
        EventMetadata, GenericEvent, HandlerRef,
    };
}
