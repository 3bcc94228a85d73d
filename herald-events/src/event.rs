//! Event and handler definitions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;
use uuid::Uuid;

/// Event trait
///
/// Anything dispatched through the [`Dispatcher`](crate::Dispatcher) must
/// implement this trait. Handlers are looked up by [`Event::event_name`].
pub trait Event: Send + Sync + Debug + 'static {
    /// Get event name
    fn event_name(&self) -> &str;

    /// Get event timestamp
    fn timestamp(&self) -> DateTime<Utc>;

    /// Get the opaque event payload
    fn payload(&self) -> &dyn Any;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Base event metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub id: Uuid,

    /// Event name/type
    pub name: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Optional correlation ID for tracing
    pub correlation_id: Option<Uuid>,
}

impl EventMetadata {
    /// Create new event metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    /// Set correlation ID
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }
}

/// An event with a JSON payload.
///
/// Useful when callers don't need a dedicated event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericEvent {
    /// Event metadata
    #[serde(flatten)]
    pub metadata: EventMetadata,

    /// Event payload
    pub payload: serde_json::Value,
}

impl GenericEvent {
    /// Create new event
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            metadata: EventMetadata::new(name),
            payload,
        }
    }

    /// Event ID
    pub fn id(&self) -> Uuid {
        self.metadata.id
    }

    /// Payload as JSON
    pub fn data(&self) -> &serde_json::Value {
        &self.payload
    }
}

impl Event for GenericEvent {
    fn event_name(&self) -> &str {
        &self.metadata.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }

    fn payload(&self) -> &dyn Any {
        &self.payload
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Event handler trait
///
/// The future returned by `handle` resolving is the handler's completion
/// signal. A dispatch waits for it, so a handler that never completes keeps
/// the dispatch pending.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handle the event
    async fn handle(&self, event: &dyn Event);
}

/// Shared reference to a registered handler.
///
/// Equality is identity: two references are equal only when they point at
/// the same handler allocation. State captured by the handler plays no part.
///
/// ```rust,ignore
/// let audit = Arc::new(AuditHandler::default());
/// let a = HandlerRef::from(audit.clone());
/// let b = HandlerRef::from(audit);
/// assert_eq!(a, b);
/// assert_ne!(a, HandlerRef::new(AuditHandler::default()));
/// ```
#[derive(Clone)]
pub struct HandlerRef(pub(crate) Arc<dyn EventHandler>);

impl HandlerRef {
    /// Wrap a handler in a new shared reference
    pub fn new<H: EventHandler>(handler: H) -> Self {
        Self(Arc::new(handler))
    }

    /// Stable identity of the underlying handler
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Invoke the handler
    pub async fn handle(&self, event: &dyn Event) {
        self.0.handle(event).await
    }
}

impl<H: EventHandler> From<Arc<H>> for HandlerRef {
    fn from(handler: Arc<H>) -> Self {
        Self(handler)
    }
}

impl From<Arc<dyn EventHandler>> for HandlerRef {
    fn from(handler: Arc<dyn EventHandler>) -> Self {
        Self(handler)
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for HandlerRef {}

impl Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerRef({:#x})", self.id())
    }
}
