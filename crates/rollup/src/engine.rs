//! Engine-side event handling for payload builds.

use crate::RollupEvent;
use alloc::boxed::Box;
use alloy_primitives::B256;
use alloy_rpc_types_engine::{ExecutionPayloadEnvelopeV2, ExecutionPayloadFieldV2, PayloadId};
use async_trait::async_trait;
use op_alloy_protocol::BlockInfo;
use op_alloy_rpc_types_engine::OpExecutionPayloadEnvelopeV3;
use opflow_events::{Deriver, Emitter, Event};

/// Identity of an in-progress payload build job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadInfo {
    /// The engine-assigned build job id.
    pub id: PayloadId,
    /// The timestamp of the payload under construction.
    pub timestamp: u64,
}

/// This structure maps for the return value of `engine_getPayload` of OP Stack execution layers,
/// for all supported versions of the protocol.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OpExecutionPayloadEnvelope {
    /// Version 2 of the execution payload envelope.
    V2(ExecutionPayloadEnvelopeV2),
    /// Version 3 of the execution payload envelope.
    V3(OpExecutionPayloadEnvelopeV3),
}

impl OpExecutionPayloadEnvelope {
    /// The block hash of the wrapped payload.
    pub fn block_hash(&self) -> B256 {
        match self {
            Self::V2(env) => match &env.execution_payload {
                ExecutionPayloadFieldV2::V1(payload) => payload.block_hash,
                ExecutionPayloadFieldV2::V2(payload) => payload.payload_inner.block_hash,
            },
            Self::V3(env) => env.execution_payload.payload_inner.payload_inner.block_hash,
        }
    }

    /// The block number of the wrapped payload.
    pub fn block_number(&self) -> u64 {
        match self {
            Self::V2(env) => match &env.execution_payload {
                ExecutionPayloadFieldV2::V1(payload) => payload.block_number,
                ExecutionPayloadFieldV2::V2(payload) => payload.payload_inner.block_number,
            },
            Self::V3(env) => env.execution_payload.payload_inner.payload_inner.block_number,
        }
    }

    /// The timestamp of the wrapped payload.
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::V2(env) => match &env.execution_payload {
                ExecutionPayloadFieldV2::V1(payload) => payload.timestamp,
                ExecutionPayloadFieldV2::V2(payload) => payload.payload_inner.timestamp,
            },
            Self::V3(env) => env.execution_payload.payload_inner.payload_inner.timestamp,
        }
    }
}

// Deserializes the untagged envelope by trying each variant in falling order.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OpExecutionPayloadEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum ExecutionPayloadDesc {
            V3(OpExecutionPayloadEnvelopeV3),
            V2(ExecutionPayloadEnvelopeV2),
        }
        match ExecutionPayloadDesc::deserialize(deserializer)? {
            ExecutionPayloadDesc::V3(payload) => Ok(Self::V3(payload)),
            ExecutionPayloadDesc::V2(payload) => Ok(Self::V2(payload)),
        }
    }
}

/// Reacts to the engine-side build lifecycle events.
///
/// Sequences sealing for pipeline-derived builds and records rejected
/// payloads; recovery from a rejection is initiated elsewhere.
#[derive(Debug)]
pub struct EngineDeriver {
    /// Emission capability onto the node's event queue.
    emitter: Emitter<RollupEvent>,
}

impl EngineDeriver {
    /// Creates a new engine deriver emitting onto `emitter`.
    pub const fn new(emitter: Emitter<RollupEvent>) -> Self {
        Self { emitter }
    }

    /// A build started. Pipeline-derived builds are immediately scheduled for
    /// sealing; unsafe head extensions are sealed on their own clock.
    fn on_build_started(
        &mut self,
        info: PayloadInfo,
        build_started: u64,
        concluding: bool,
        derived_from: Option<BlockInfo>,
    ) {
        let Some(derived_from) = derived_from else {
            return;
        };
        self.emitter.emit(RollupEvent::BuildSeal { info, build_started, concluding, derived_from });
    }

    /// The engine rejected a payload.
    fn on_payload_invalid(&self, envelope: &OpExecutionPayloadEnvelope, err: &str) {
        warn!(
            target: "engine",
            block_hash = %envelope.block_hash(),
            block_number = envelope.block_number(),
            timestamp = envelope.timestamp(),
            err,
            "Payload rejected by the engine"
        );
    }
}

#[async_trait]
impl Deriver for EngineDeriver {
    type Event = RollupEvent;

    async fn on_event(&mut self, event: &Event<RollupEvent>) -> bool {
        match event.payload() {
            RollupEvent::BuildStarted { info, build_started, concluding, derived_from, .. } => {
                self.on_build_started(*info, *build_started, *concluding, *derived_from)
            }
            RollupEvent::PayloadInvalid { envelope, err } => {
                self.on_payload_invalid(envelope, err)
            }
            _ => return false,
        }
        true
    }
}
