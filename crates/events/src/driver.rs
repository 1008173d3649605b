//! The run-to-completion event loop.

use crate::{Deriver, Emitter, EventQueue};
use core::fmt::Debug;

/// The external end condition consulted by [`EventDriver::run_to_completion`]
/// after every dispatched event.
pub trait EndCondition {
    /// The error surfaced when the run ends with a failure.
    type Error;

    /// Whether the loop should stop.
    fn is_closing(&self) -> bool;

    /// The result to return once closing; `None` is success.
    fn result(&self) -> Option<Self::Error>;
}

/// A single-threaded cooperative scheduler over a FIFO event queue.
///
/// Exactly one event is dispatched at a time; deriver reactions may enqueue
/// further events, which are appended to the tail and therefore observed
/// strictly after everything already queued, preserving causal order.
pub struct EventDriver<D, End>
where
    D: Deriver,
    End: EndCondition,
{
    /// The composed deriver tree offered every event.
    deriver: D,
    /// The pending event queue.
    queue: EventQueue<D::Event>,
    /// The end condition supplied by the host.
    end: End,
}

impl<D, End> EventDriver<D, End>
where
    D: Deriver,
    End: EndCondition,
{
    /// Creates a new driver dispatching `queue` onto `deriver`.
    ///
    /// Derivers are expected to already hold [`Emitter`]s onto the same queue.
    pub const fn new(queue: EventQueue<D::Event>, deriver: D, end: End) -> Self {
        Self { deriver, queue, end }
    }

    /// Returns an [`Emitter`] onto the driver's queue, for hosts injecting
    /// external events between runs.
    pub fn emitter(&self) -> Emitter<D::Event> {
        self.queue.emitter()
    }

    /// Enqueues `initial` as a root event, then drains the queue.
    ///
    /// After each dispatched event the end condition is consulted: once it
    /// reports closing, the loop stops and returns its carried result
    /// verbatim. If the queue empties without closing, the loop returns
    /// success; the host re-invokes it when new external input arrives.
    pub async fn run_to_completion(&mut self, initial: D::Event) -> Result<(), End::Error> {
        self.queue.begin_run();
        self.queue.emitter().emit(initial);
        loop {
            let Some(event) = self.queue.next() else {
                debug!(target: "events", "Event queue drained, run going idle");
                return Ok(());
            };
            trace!(
                target: "events",
                kind = event.kind(),
                id = event.id().value(),
                "Dispatching event"
            );
            if !self.deriver.on_event(&event).await {
                debug!(target: "events", kind = event.kind(), "Event not handled by any deriver");
            }
            if self.end.is_closing() {
                return self.end.result().map_or(Ok(()), Err);
            }
        }
    }
}

impl<D, End> Debug for EventDriver<D, End>
where
    D: Deriver,
    End: EndCondition,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventDriver").field("queue", &self.queue).finish_non_exhaustive()
    }
}
