//! The FIFO event queue and the emission capability.

use crate::{Event, EventId, EventPayload};
use alloc::{collections::VecDeque, sync::Arc};
use spin::Mutex;

/// Queue state shared between the [`EventQueue`] owner and its [`Emitter`]s.
#[derive(Debug)]
struct Inner<T> {
    /// Events awaiting dispatch, in emission order.
    pending: VecDeque<Event<T>>,
    /// The identity assigned to the next emitted event.
    next_id: u64,
    /// The event currently being dispatched, used to stamp causal parents.
    current: Option<EventId>,
}

impl<T> Inner<T> {
    const fn new() -> Self {
        Self { pending: VecDeque::new(), next_id: 0, current: None }
    }
}

/// Owns the FIFO of pending events and assigns event identities.
///
/// The queue hands out cloneable [`Emitter`]s; popping an event via
/// [`EventQueue::next`] marks it as the one currently being dispatched, so
/// that any emission performed while handling it is parented to it.
#[derive(Debug)]
pub struct EventQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: EventPayload> EventQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::new())) }
    }

    /// Returns a new [`Emitter`] handle onto this queue.
    pub fn emitter(&self) -> Emitter<T> {
        Emitter { inner: Arc::clone(&self.inner) }
    }

    /// Pops the head of the queue and marks it as the event being dispatched.
    /// Returns `None` once the queue is drained, clearing the dispatch marker.
    pub fn next(&self) -> Option<Event<T>> {
        let mut inner = self.inner.lock();
        match inner.pending.pop_front() {
            Some(event) => {
                inner.current = Some(event.id());
                Some(event)
            }
            None => {
                inner.current = None;
                None
            }
        }
    }

    /// Clears the dispatch marker so that the next emission is a root event.
    pub fn begin_run(&self) {
        self.inner.lock().current = None;
    }

    /// The number of events awaiting dispatch.
    pub fn pending(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Whether no events await dispatch.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }
}

impl<T: EventPayload> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A capability to enqueue events for later dispatch.
///
/// Emission is O(1), never fails, never blocks, and never dispatches
/// synchronously, so it is safe to call from within a dispatch.
#[derive(Debug)]
pub struct Emitter<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: EventPayload> Emitter<T> {
    /// Appends `payload` to the tail of the queue, parented to the event
    /// currently being dispatched (if any), and returns the new identity.
    pub fn emit(&self, payload: T) -> EventId {
        let mut inner = self.inner.lock();
        let id = EventId::new(inner.next_id);
        inner.next_id += 1;
        trace!(target: "events", kind = payload.kind(), id = id.value(), "Queueing event");
        let parent = inner.current;
        inner.pending.push_back(Event::new(id, parent, payload));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Tick(u64);

    impl EventPayload for Tick {
        fn kind(&self) -> &'static str {
            "tick"
        }
    }

    #[test]
    fn test_queue_fifo_order() {
        let queue = EventQueue::new();
        let emitter = queue.emitter();
        for i in 0..4 {
            emitter.emit(Tick(i));
        }
        assert_eq!(queue.pending(), 4);
        for i in 0..4 {
            assert_eq!(queue.next().unwrap().payload(), &Tick(i));
        }
        assert!(queue.next().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_ids_monotonic() {
        let queue = EventQueue::new();
        let emitter = queue.emitter();
        let a = emitter.emit(Tick(0));
        let b = emitter.emit(Tick(1));
        assert!(a < b);
        assert_eq!(a.value() + 1, b.value());
    }

    #[test]
    fn test_emission_outside_dispatch_is_root() {
        let queue = EventQueue::new();
        queue.emitter().emit(Tick(0));
        assert_eq!(queue.next().unwrap().parent(), None);
    }

    #[test]
    fn test_emission_during_dispatch_is_parented() {
        let queue = EventQueue::new();
        let emitter = queue.emitter();
        emitter.emit(Tick(0));

        let root = queue.next().unwrap();
        emitter.emit(Tick(1));
        emitter.emit(Tick(2));

        // Both children were emitted while the root was being dispatched.
        let first = queue.next().unwrap();
        assert_eq!(first.parent(), Some(root.id()));
        let second = queue.next().unwrap();
        assert_eq!(second.parent(), Some(root.id()));
    }

    #[test]
    fn test_begin_run_clears_parent_marker() {
        let queue = EventQueue::new();
        let emitter = queue.emitter();
        emitter.emit(Tick(0));
        let _ = queue.next();

        queue.begin_run();
        emitter.emit(Tick(1));
        assert_eq!(queue.next().unwrap().parent(), None);
    }

    #[test]
    fn test_cloned_emitters_share_queue() {
        let queue = EventQueue::new();
        let a = queue.emitter();
        let b = a.clone();
        a.emit(Tick(0));
        b.emit(Tick(1));
        assert_eq!(queue.pending(), 2);
    }
}
