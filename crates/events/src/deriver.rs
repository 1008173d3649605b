//! The reactive handler abstraction.

use crate::{Event, EventPayload};
use alloc::{boxed::Box, vec::Vec};
use async_trait::async_trait;
use core::fmt::Debug;

/// A reactive event handler.
///
/// Derivers are offered every dispatched event and report whether they
/// recognized it. Returning `false` lets the event fall through to the next
/// deriver in a [`MultiDeriver`] chain; it must never be treated as an error.
#[async_trait]
pub trait Deriver {
    /// The payload type of the events this deriver reacts to.
    type Event: EventPayload;

    /// Reacts to `event`, returning whether it was handled.
    async fn on_event(&mut self, event: &Event<Self::Event>) -> bool;
}

/// Wraps a closure as a [`Deriver`].
pub struct DeriverFunc<E, F> {
    f: F,
    _marker: core::marker::PhantomData<fn(E)>,
}

impl<E, F> DeriverFunc<E, F>
where
    E: EventPayload,
    F: FnMut(&Event<E>) -> bool,
{
    /// Wraps `f` as a deriver.
    pub const fn new(f: F) -> Self {
        Self { f, _marker: core::marker::PhantomData }
    }
}

impl<E, F> Debug for DeriverFunc<E, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeriverFunc").finish_non_exhaustive()
    }
}

#[async_trait]
impl<E, F> Deriver for DeriverFunc<E, F>
where
    E: EventPayload + Sync,
    F: FnMut(&Event<E>) -> bool + Send,
{
    type Event = E;

    async fn on_event(&mut self, event: &Event<E>) -> bool {
        (self.f)(event)
    }
}

/// An ordered fan-out over boxed derivers.
///
/// Each event is offered to the derivers in registration order until one
/// reports it handled.
pub struct MultiDeriver<E> {
    derivers: Vec<Box<dyn Deriver<Event = E> + Send>>,
}

impl<E: EventPayload> MultiDeriver<E> {
    /// Creates an empty deriver chain.
    pub const fn new() -> Self {
        Self { derivers: Vec::new() }
    }

    /// Appends a deriver to the end of the chain.
    pub fn push(&mut self, deriver: impl Deriver<Event = E> + Send + 'static) {
        self.derivers.push(Box::new(deriver));
    }

    /// Builder-style [`MultiDeriver::push`].
    pub fn with(mut self, deriver: impl Deriver<Event = E> + Send + 'static) -> Self {
        self.push(deriver);
        self
    }
}

impl<E: EventPayload> Default for MultiDeriver<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for MultiDeriver<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MultiDeriver").field("derivers", &self.derivers.len()).finish()
    }
}

#[async_trait]
impl<E: EventPayload + Sync> Deriver for MultiDeriver<E> {
    type Event = E;

    async fn on_event(&mut self, event: &Event<E>) -> bool {
        for deriver in self.derivers.iter_mut() {
            if deriver.on_event(event).await {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventQueue;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Tick;

    impl EventPayload for Tick {
        fn kind(&self) -> &'static str {
            "tick"
        }
    }

    fn dispatchable() -> Event<Tick> {
        let queue = EventQueue::new();
        queue.emitter().emit(Tick);
        queue.next().unwrap()
    }

    #[tokio::test]
    async fn test_multi_deriver_falls_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let mut mux = MultiDeriver::new()
            .with(DeriverFunc::new(|_: &Event<Tick>| false))
            .with(DeriverFunc::new(move |_: &Event<Tick>| {
                seen.fetch_add(1, Ordering::Relaxed);
                true
            }));

        assert!(mux.on_event(&dispatchable()).await);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_multi_deriver_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let mut mux = MultiDeriver::new()
            .with(DeriverFunc::new(|_: &Event<Tick>| true))
            .with(DeriverFunc::new(move |_: &Event<Tick>| {
                seen.fetch_add(1, Ordering::Relaxed);
                true
            }));

        assert!(mux.on_event(&dispatchable()).await);
        assert_eq!(hits.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_multi_deriver_all_decline() {
        let mut mux = MultiDeriver::new()
            .with(DeriverFunc::new(|_: &Event<Tick>| false))
            .with(DeriverFunc::new(|_: &Event<Tick>| false));

        assert!(!mux.on_event(&dispatchable()).await);
    }

    #[tokio::test]
    async fn test_empty_multi_deriver_declines() {
        let mut mux: MultiDeriver<Tick> = MultiDeriver::new();
        assert!(!mux.on_event(&dispatchable()).await);
    }
}
