//! The control event taxonomy exchanged between the node's derivers.

use crate::{
    engine::{OpExecutionPayloadEnvelope, PayloadInfo},
    errors::{ResetError, StepError},
};
use alloc::string::String;
use alloy_eips::BlockNumHash;
use op_alloy_protocol::{BlockInfo, L2BlockInfo};
use op_alloy_rpc_types_engine::OpAttributesWithParent;
use opflow_events::EventPayload;

/// A control event of the rollup node.
///
/// The set is closed: adding a variant is a compile-time-checked change
/// across every deriver, as each dispatches by exhaustive match.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum RollupEvent {
    /// Request to reset the pipeline to a known-good L1 anchor.
    Reset {
        /// The error that requested the reset.
        err: ResetError,
    },
    /// Request to advance derivation toward the pending safe block.
    PipelineStep {
        /// The L2 block derivation is stepping onto.
        pending_safe: L2BlockInfo,
    },
    /// Derivation went idle: no more data is available at the current origin,
    /// or the engine cannot accept attributes yet.
    DeriverIdle {
        /// The L1 origin the pipeline is anchored to.
        origin: BlockInfo,
    },
    /// The pipeline's L1 origin moved while stepping.
    DeriverL1Status {
        /// The new L1 origin.
        origin: BlockInfo,
        /// The L2 block derivation was stepping onto.
        last_l2: L2BlockInfo,
    },
    /// Another step may make progress immediately; no backoff is needed.
    DeriverMore,
    /// Previously emitted attributes were consumed; new ones may be
    /// generated.
    ConfirmReceivedAttributes,
    /// The engine-side pipeline reset completed.
    ConfirmPipelineReset,
    /// New payload attributes are ready to be applied to the engine.
    DerivedAttributes {
        /// The derived payload attributes.
        attributes: OpAttributesWithParent,
    },
    /// Request a deposits-only version of the attributes from the pipeline,
    /// bypassing the normal step path.
    DepositsOnlyAttributesRequest {
        /// The L2 block to build on.
        parent_block: BlockNumHash,
        /// The L1 block the replaced attributes were derived from.
        derived_from: BlockInfo,
    },
    /// A transient processing failure; the host schedules a retry with
    /// backoff.
    EngineTemporaryError {
        /// The classified error.
        err: StepError,
    },
    /// An unrecoverable failure; the host decides shutdown.
    CriticalError {
        /// The classified error.
        err: StepError,
    },
    /// The engine started building a payload.
    BuildStarted {
        /// Identity of the build job.
        info: PayloadInfo,
        /// Unix timestamp in milliseconds at which the build started.
        build_started: u64,
        /// The L2 block the payload builds on.
        parent_block: L2BlockInfo,
        /// Whether the payload should be promoted to (local) safe once built.
        concluding: bool,
        /// The L1 block the payload was derived from. `Some` marks a
        /// pipeline-derived target; `None` marks an unsafe head extension.
        derived_from: Option<BlockInfo>,
    },
    /// Request to seal an in-progress build.
    BuildSeal {
        /// Identity of the build job.
        info: PayloadInfo,
        /// Unix timestamp in milliseconds at which the build started.
        build_started: u64,
        /// Whether the payload should be promoted to (local) safe once built.
        concluding: bool,
        /// The L1 block the payload was derived from.
        derived_from: BlockInfo,
    },
    /// The engine rejected a payload. Observational only; recovery is the
    /// engine deriver's responsibility.
    PayloadInvalid {
        /// The rejected payload envelope.
        envelope: OpExecutionPayloadEnvelope,
        /// The rejection reason.
        err: String,
    },
}

impl EventPayload for RollupEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Reset { .. } => "reset-event",
            Self::PipelineStep { .. } => "pipeline-step",
            Self::DeriverIdle { .. } => "derivation-idle",
            Self::DeriverL1Status { .. } => "deriver-l1-status",
            Self::DeriverMore => "deriver-more",
            Self::ConfirmReceivedAttributes => "confirm-received-attributes",
            Self::ConfirmPipelineReset => "confirm-pipeline-reset",
            Self::DerivedAttributes { .. } => "derived-attributes",
            Self::DepositsOnlyAttributesRequest { .. } => {
                "deposits-only-payload-attributes-request"
            }
            Self::EngineTemporaryError { .. } => "engine-temporary-error",
            Self::CriticalError { .. } => "critical-error",
            Self::BuildStarted { .. } => "build-started",
            Self::BuildSeal { .. } => "build-seal",
            Self::PayloadInvalid { .. } => "payload-invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(
            RollupEvent::Reset { err: ResetError::BadTimestamp(0, 0) }.kind(),
            "reset-event"
        );
        assert_eq!(
            RollupEvent::PipelineStep { pending_safe: Default::default() }.kind(),
            "pipeline-step"
        );
        assert_eq!(RollupEvent::DeriverIdle { origin: Default::default() }.kind(), "derivation-idle");
        assert_eq!(RollupEvent::DeriverMore.kind(), "deriver-more");
        assert_eq!(RollupEvent::ConfirmReceivedAttributes.kind(), "confirm-received-attributes");
        assert_eq!(RollupEvent::ConfirmPipelineReset.kind(), "confirm-pipeline-reset");
        assert_eq!(
            RollupEvent::DepositsOnlyAttributesRequest {
                parent_block: Default::default(),
                derived_from: Default::default(),
            }
            .kind(),
            "deposits-only-payload-attributes-request"
        );
        assert_eq!(
            RollupEvent::CriticalError { err: StepError::NotEnoughData }.kind(),
            "critical-error"
        );
    }
}
