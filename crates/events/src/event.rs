//! Event identity and causal linkage.

use core::fmt::Debug;

/// Identifies a single event within one run of the event loop.
///
/// Identifiers are assigned in emission order and are unique for the lifetime
/// of the [`EventQueue`] that produced them.
///
/// [`EventQueue`]: crate::EventQueue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value of the identifier.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

/// The payload carried by an [`Event`].
pub trait EventPayload: Debug {
    /// A short, stable, human-readable name for this event kind.
    fn kind(&self) -> &'static str;
}

/// An immutable event, linked to the event whose handling caused it.
///
/// Parent links form a directed forest: an event can only name a parent that
/// was dispatched strictly earlier in the same run, so causal chains are
/// acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<T> {
    /// The identity of this event.
    id: EventId,
    /// The identity of the causal parent, if this is not a root event.
    parent: Option<EventId>,
    /// The payload.
    payload: T,
}

impl<T: EventPayload> Event<T> {
    pub(crate) const fn new(id: EventId, parent: Option<EventId>, payload: T) -> Self {
        Self { id, parent, payload }
    }

    /// The identity of this event.
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// The identity of the event whose handling emitted this one, or `None`
    /// for root events injected from outside a dispatch.
    pub const fn parent(&self) -> Option<EventId> {
        self.parent
    }

    /// A reference to the payload.
    pub const fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the event, returning its payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// The human-readable kind of the payload.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}
