//! Abstracts the derivation pipeline from the deriver that drives it.

use crate::errors::StepError;
use alloc::boxed::Box;
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use op_alloy_protocol::{BlockInfo, L2BlockInfo};
use op_alloy_rpc_types_engine::OpAttributesWithParent;

/// The deriver's view of the derivation pipeline.
///
/// The pipeline handle is exclusively owned by the
/// [`PipelineDeriver`](crate::PipelineDeriver); no other component may call
/// its stepping or reset operations, which rules out interleaved or duplicate
/// steps. All calls are bounded-latency and performed on the calling thread.
#[async_trait]
pub trait DriverPipeline {
    /// Attempts to progress derivation toward `pending_safe`.
    ///
    /// Returns `Ok(Some(_))` when new attributes were produced, `Ok(None)`
    /// when the step made progress without producing attributes, and a
    /// classified [`StepError`] otherwise.
    async fn step(
        &mut self,
        pending_safe: L2BlockInfo,
    ) -> Result<Option<OpAttributesWithParent>, StepError>;

    /// The L1 block the pipeline is currently anchored to.
    fn origin(&self) -> BlockInfo;

    /// Resets the pipeline to its known-good anchor.
    fn reset(&mut self);

    /// Acknowledges that the engine-side reset completed.
    fn confirm_engine_reset(&mut self);

    /// Produces a deposits-only version of the attributes directly after
    /// `parent_block`, bypassing the normal step path.
    async fn deposits_only_attributes(
        &mut self,
        parent_block: BlockNumHash,
        derived_from: BlockInfo,
    ) -> Result<OpAttributesWithParent, StepError>;
}
