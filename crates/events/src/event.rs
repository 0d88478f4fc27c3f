use chrono::{DateTime, Utc};

/// A lifecycle event describing a committed mutation.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - emitted **after** the mutation is persisted
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "orders.line_item.saved").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
