//! The deriver that drives the derivation pipeline.

use crate::{DriverPipeline, RollupEvent, StepError};
use alloc::{boxed::Box, format};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use op_alloy_protocol::{BlockInfo, L2BlockInfo};
use op_alloy_rpc_types_engine::OpAttributesWithParent;
use opflow_events::{Deriver, Emitter, Event};

/// Whether derived attributes are awaiting downstream confirmation.
///
/// While awaiting confirmation, step requests are accepted but perform no
/// pipeline call, so at most one [`RollupEvent::DerivedAttributes`] is ever
/// in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AttributesState {
    /// No attributes are outstanding; steps may produce new ones.
    #[default]
    Idle,
    /// A [`RollupEvent::DerivedAttributes`] was emitted and no matching
    /// [`RollupEvent::ConfirmReceivedAttributes`] has arrived yet.
    AwaitingConfirmation,
}

/// Drives the derivation pipeline in reaction to step, reset and
/// confirmation events, classifying every step outcome into exactly one
/// control event.
///
/// Constructed once per node run; the confirmation state toggles for the
/// node's entire lifetime.
#[derive(Debug)]
pub struct PipelineDeriver<P> {
    /// The derivation pipeline. Exclusively owned; see [`DriverPipeline`].
    pipeline: P,
    /// Emission capability onto the node's event queue.
    emitter: Emitter<RollupEvent>,
    /// Confirmation backpressure state.
    attributes: AttributesState,
}

impl<P: DriverPipeline> PipelineDeriver<P> {
    /// Creates a new deriver around `pipeline`, emitting onto `emitter`.
    pub const fn new(pipeline: P, emitter: Emitter<RollupEvent>) -> Self {
        Self { pipeline, emitter, attributes: AttributesState::Idle }
    }

    /// The current confirmation state.
    pub const fn attributes_state(&self) -> AttributesState {
        self.attributes
    }

    /// A read-only handle to the pipeline.
    pub const fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Invokes a pipeline step toward `pending_safe` and classifies the
    /// outcome.
    async fn step(&mut self, pending_safe: L2BlockInfo) {
        // Don't generate attributes if there are already attributes in-flight.
        if self.attributes == AttributesState::AwaitingConfirmation {
            debug!(target: "pipeline", "Previously sent attributes are unconfirmed to be received");
            return;
        }

        let pre_origin = self.pipeline.origin();
        trace!(target: "pipeline", onto_origin = ?pre_origin, "Derivation pipeline step");
        let result = self.pipeline.step(pending_safe).await;
        let post_origin = self.pipeline.origin();
        if pre_origin != post_origin {
            self.emitter.emit(RollupEvent::DeriverL1Status {
                origin: post_origin,
                last_l2: pending_safe,
            });
        }

        match result {
            Ok(Some(attributes)) => self.emit_derived_attributes(attributes),
            // Continue with the next step if we can.
            Ok(None) => {
                self.emitter.emit(RollupEvent::DeriverMore);
            }
            Err(err @ StepError::Eof) => {
                debug!(target: "pipeline", progress = ?post_origin, %err, "Derivation process went idle");
                self.emitter.emit(RollupEvent::DeriverIdle { origin: post_origin });
            }
            Err(err @ StepError::EngineSyncing) => {
                debug!(
                    target: "pipeline",
                    progress = ?post_origin,
                    %err,
                    "Derivation process went idle because the engine is syncing"
                );
                self.emitter.emit(RollupEvent::DeriverIdle { origin: post_origin });
            }
            Err(StepError::Reset(err)) => {
                self.emitter.emit(RollupEvent::Reset { err });
            }
            Err(err @ StepError::Temporary(_)) => {
                self.emitter.emit(RollupEvent::EngineTemporaryError { err });
            }
            Err(err @ StepError::Critical(_)) => {
                self.emitter.emit(RollupEvent::CriticalError { err });
            }
            // Don't do a backoff for this error.
            Err(StepError::NotEnoughData) => {
                self.emitter.emit(RollupEvent::DeriverMore);
            }
            Err(err @ StepError::Unclassified(_)) => {
                error!(target: "pipeline", %err, "Derivation process error");
                self.emitter.emit(RollupEvent::EngineTemporaryError { err });
            }
        }
    }

    /// Requests deposits-only attributes directly from the pipeline.
    async fn deposits_only_attributes(
        &mut self,
        parent_block: BlockNumHash,
        derived_from: BlockInfo,
    ) {
        warn!(target: "pipeline", origin = ?self.pipeline.origin(), "Deriving deposits-only attributes");
        match self.pipeline.deposits_only_attributes(parent_block, derived_from).await {
            Ok(attributes) => self.emit_derived_attributes(attributes),
            Err(err) => {
                self.emitter.emit(RollupEvent::CriticalError {
                    err: StepError::Critical(format!("deriving deposits-only attributes: {err}")),
                });
            }
        }
    }

    fn emit_derived_attributes(&mut self, attributes: OpAttributesWithParent) {
        self.attributes = AttributesState::AwaitingConfirmation;
        self.emitter.emit(RollupEvent::DerivedAttributes { attributes });
    }
}

#[async_trait]
impl<P> Deriver for PipelineDeriver<P>
where
    P: DriverPipeline + Send + Sync,
{
    type Event = RollupEvent;

    async fn on_event(&mut self, event: &Event<RollupEvent>) -> bool {
        match event.payload() {
            RollupEvent::Reset { .. } => self.pipeline.reset(),
            RollupEvent::PipelineStep { pending_safe } => self.step(*pending_safe).await,
            RollupEvent::ConfirmPipelineReset => self.pipeline.confirm_engine_reset(),
            RollupEvent::ConfirmReceivedAttributes => self.attributes = AttributesState::Idle,
            RollupEvent::DepositsOnlyAttributesRequest { parent_block, derived_from } => {
                self.deposits_only_attributes(*parent_block, *derived_from).await
            }
            _ => return false,
        }
        true
    }
}
