//! In-process event dispatching for Herald
//!
//! This crate maps event names to ordered lists of handlers and fans each
//! dispatched event out to all of its handlers concurrently.
//!
//! ## Features
//!
//! - **Named events** - Handlers are registered per event name
//! - **Identity-based registry** - A handler is registered at most once per name
//! - **Concurrent fan-out** - Every handler runs as its own task
//! - **Join barrier** - Dispatch completes only after all handlers finish
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald_events::*;
//! use async_trait::async_trait;
//!
//! struct WelcomeMailer;
//!
//! #[async_trait]
//! impl EventHandler for WelcomeMailer {
//!     async fn handle(&self, event: &dyn Event) {
//!         if let Some(user) = event.payload().downcast_ref::<serde_json::Value>() {
//!             println!("Sending welcome email to {}", user["email"]);
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DispatcherError> {
//!     let dispatcher = Dispatcher::new();
//!     let mailer = HandlerRef::new(WelcomeMailer);
//!
//!     dispatcher.register("user_created", mailer.clone())?;
//!
//!     let event = GenericEvent::new(
//!         "user_created",
//!         serde_json::json!({"email": "alice@example.com"}),
//!     );
//!     dispatcher.dispatch(event).await;
//!
//!     dispatcher.remove("user_created", &mailer)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Handler Identity
//!
//! Handlers are compared by identity, not by value. Keep the [`HandlerRef`]
//! (or the `Arc` it was built from) to check or remove a registration later:
//!
//! ```rust,ignore
//! let audit = Arc::new(AuditHandler::default());
//! dispatcher.register("order_placed", audit.clone().into())?;
//!
//! assert!(dispatcher.has("order_placed", &audit.clone().into()));
//! assert_eq!(dispatcher.find_index("order_placed", &audit.into()), Some(0));
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! let dispatcher = DispatcherBuilder::new()
//!     .enable_logging(false)  // Silence dispatcher logs
//!     .build();
//!
//! // Or read HERALD_EVENTS_LOG from the environment
//! let dispatcher = DispatcherBuilder::from_env().build();
//! ```

pub mod dispatcher;
pub mod event;

pub use dispatcher::{
    Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherError, LOG_ENV_VAR, Result,
};
pub use event::{Event, EventHandler, EventMetadata, GenericEvent, HandlerRef};
