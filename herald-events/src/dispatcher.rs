//! Dispatcher implementation

use crate::event::{Event, HandlerRef};
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Environment variable read by [`DispatcherConfig::from_env`]
pub const LOG_ENV_VAR: &str = "HERALD_EVENTS_LOG";

/// In-process event dispatcher
///
/// Maps event names to ordered lists of handlers. Dispatching an event runs
/// every handler registered under its name concurrently and waits for all
/// of them to finish.
///
/// The registry is internally synchronized, so a dispatcher (or any of its
/// clones, which share the registry) can be used from many tasks and
/// threads at once.
#[derive(Clone)]
pub struct Dispatcher {
    /// Handlers registered for each event name, in registration order
    handlers: Arc<DashMap<String, Vec<HandlerRef>>>,

    /// Configuration
    config: Arc<DispatcherConfig>,
}

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Enable dispatcher logging
    pub enable_logging: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
        }
    }
}

impl DispatcherConfig {
    /// Create config from environment variables.
    ///
    /// `HERALD_EVENTS_LOG=0|false` turns logging off. Unset or unparsable
    /// values keep the default.
    pub fn from_env() -> Self {
        let enable_logging = std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(true);

        Self { enable_logging }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Dispatcher {
    /// Create new dispatcher with an empty registry
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create dispatcher with custom config
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    /// Get the dispatcher configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register a handler for an event name
    ///
    /// The handler is appended after any handlers already registered under
    /// `event_name`. Registering the same handler twice under one name fails
    /// and leaves the registry unchanged.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let dispatcher = Dispatcher::new();
    /// let handler = HandlerRef::new(MailerHandler::default());
    ///
    /// dispatcher.register("user_created", handler.clone())?;
    /// assert!(dispatcher.register("user_created", handler).is_err());
    /// ```
    pub fn register(&self, event_name: impl Into<String>, handler: HandlerRef) -> Result<()> {
        let event_name = event_name.into();

        let duplicate = {
            let mut handlers = self.handlers.entry(event_name.clone()).or_default();
            if handlers.contains(&handler) {
                true
            } else {
                handlers.push(handler);
                false
            }
        };

        if duplicate {
            if self.config.enable_logging {
                debug!("Handler already registered for event: {}", event_name);
            }
            return Err(DispatcherError::DuplicateHandler { event_name });
        }

        if self.config.enable_logging {
            debug!("Registered handler for event: {}", event_name);
        }

        Ok(())
    }

    /// Check whether a handler is registered for an event name
    pub fn has(&self, event_name: &str, handler: &HandlerRef) -> bool {
        self.handlers
            .get(event_name)
            .is_some_and(|handlers| handlers.contains(handler))
    }

    /// Position of a handler in the registration order of an event name
    ///
    /// Returns `None` when the handler is not registered under `event_name`.
    pub fn find_index(&self, event_name: &str, handler: &HandlerRef) -> Option<usize> {
        self.handlers
            .get(event_name)
            .and_then(|handlers| handlers.iter().position(|h| h == handler))
    }

    /// Remove a handler from an event name
    ///
    /// The remaining handlers keep their relative order.
    pub fn remove(&self, event_name: &str, handler: &HandlerRef) -> Result<()> {
        let removed = match self.handlers.get_mut(event_name) {
            Some(mut handlers) => match handlers.iter().position(|h| h == handler) {
                Some(index) => {
                    handlers.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };

        if !removed {
            if self.config.enable_logging {
                debug!("Handler not found for event: {}", event_name);
            }
            return Err(DispatcherError::HandlerNotFound {
                event_name: event_name.to_string(),
            });
        }

        // get_mut guard is released above; remove_if rechecks emptiness under the write lock
        self.handlers
            .remove_if(event_name, |_, handlers| handlers.is_empty());

        if self.config.enable_logging {
            debug!("Removed handler for event: {}", event_name);
        }

        Ok(())
    }

    /// Remove all handlers for an event name
    ///
    /// Returns the number of handlers removed.
    pub fn remove_all(&self, event_name: &str) -> usize {
        let removed = self
            .handlers
            .remove(event_name)
            .map(|(_, handlers)| handlers.len())
            .unwrap_or(0);

        if self.config.enable_logging && removed > 0 {
            debug!("Removed {} handlers for event: {}", removed, event_name);
        }

        removed
    }

    /// Clear all handlers
    pub fn clear(&self) {
        self.handlers.clear();
        if self.config.enable_logging {
            debug!("Cleared all event handlers");
        }
    }

    /// Dispatch an event
    ///
    /// Every handler registered under the event's name is spawned as its own
    /// task, and this call completes once all of them have finished. With no
    /// handlers registered it returns immediately.
    ///
    /// Handlers run in no particular order. A panicking handler does not stop
    /// the others; once they are done the first panic is resumed here.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let dispatcher = Dispatcher::new();
    /// dispatcher.register("user_created", HandlerRef::new(MailerHandler::default()))?;
    ///
    /// dispatcher
    ///     .dispatch(GenericEvent::new("user_created", json!({"id": 1})))
    ///     .await;
    /// ```
    pub async fn dispatch<E: Event>(&self, event: E) {
        // Snapshot so handlers never run under a registry lock
        let handlers = match self.handlers.get(event.event_name()) {
            Some(handlers) if !handlers.is_empty() => handlers.value().clone(),
            _ => {
                if self.config.enable_logging {
                    trace!("No handlers registered for event: {}", event.event_name());
                }
                return;
            }
        };

        if self.config.enable_logging {
            debug!(
                "Dispatching event: {} to {} handlers",
                event.event_name(),
                handlers.len()
            );
        }

        let event: Arc<dyn Event> = Arc::new(event);

        let tasks: Vec<_> = handlers
            .into_iter()
            .map(|handler| {
                let event = Arc::clone(&event);
                tokio::spawn(async move { handler.handle(event.as_ref()).await })
            })
            .collect();

        let mut panic = None;
        for result in join_all(tasks).await {
            let Err(e) = result else { continue };

            if e.is_panic() {
                if self.config.enable_logging {
                    error!("Handler panicked for event: {}", event.event_name());
                }
                if panic.is_none() {
                    panic = Some(e.into_panic());
                }
            } else if self.config.enable_logging {
                error!("Handler task cancelled for event: {}: {}", event.event_name(), e);
            }
        }

        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }
    }

    /// Get handler count for an event name
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers.get(event_name).map(|h| h.len()).unwrap_or(0)
    }

    /// Get the handlers for an event name, in registration order
    pub fn handlers(&self, event_name: &str) -> Vec<HandlerRef> {
        self.handlers
            .get(event_name)
            .map(|h| h.value().clone())
            .unwrap_or_default()
    }

    /// Get all event names with at least one handler, sorted
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Check whether no handlers are registered at all
    pub fn is_empty(&self) -> bool {
        self.handlers.iter().all(|entry| entry.value().is_empty())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event_names", &self.event_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Dispatcher errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatcherError {
    #[error("handler already registered")]
    DuplicateHandler { event_name: String },

    #[error("handler not found")]
    HandlerNotFound { event_name: String },
}

impl DispatcherError {
    /// Event name the failed operation targeted
    pub fn event_name(&self) -> &str {
        match self {
            Self::DuplicateHandler { event_name } | Self::HandlerNotFound { event_name } => {
                event_name
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatcherError>;

/// Dispatcher builder
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create new dispatcher builder
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
        }
    }

    /// Start from environment configuration
    pub fn from_env() -> Self {
        Self {
            config: DispatcherConfig::from_env(),
        }
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> Dispatcher {
        Dispatcher::with_config(self.config)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
