//! The closed error taxonomy for pipeline step outcomes.

use alloc::string::String;
use alloy_primitives::B256;
use thiserror::Error;

/// An error requiring the pipeline to be re-anchored to a known-good L1 block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResetError {
    /// The pipeline detected an L1 reorg. The first hash is the expected
    /// block, the second is the parent hash of the next L1 origin.
    #[error("L1 reorg detected: expected {0}, got {1}")]
    ReorgDetected(B256, B256),
    /// A derived block has an unexpected parent hash. The first hash is the
    /// expected parent, the second is the actual one.
    #[error("bad parent hash: expected {0}, got {1}")]
    BadParentHash(B256, B256),
    /// A derived block has an unexpected timestamp. The first argument is the
    /// expected timestamp, the second is the actual one.
    #[error("bad timestamp: expected {0}, got {1}")]
    BadTimestamp(u64, u64),
}

/// The classified outcome of a failed or data-starved pipeline step.
///
/// The set is closed and exhaustively handled by the
/// [`PipelineDeriver`](crate::PipelineDeriver): every category is converted
/// into exactly one outbound event, and none of them unwinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No more L1 data is available; derivation is caught up and idle.
    /// Not a failure condition.
    #[error("EOF")]
    Eof,
    /// The execution engine is still syncing and cannot accept attributes yet.
    #[error("engine is syncing")]
    EngineSyncing,
    /// The pipeline state is inconsistent with the chain and must be reset.
    #[error("pipeline reset required: {0}")]
    Reset(#[from] ResetError),
    /// A transient failure; the host retries the step with backoff.
    #[error("temporary error: {0}")]
    Temporary(String),
    /// An unrecoverable failure; derivation must halt.
    #[error("critical error: {0}")]
    Critical(String),
    /// The current stage needs more input that is expected imminently; the
    /// step is retried without any backoff.
    #[error("not enough data")]
    NotEnoughData,
    /// An error the pipeline could not classify. Handled like
    /// [`StepError::Temporary`], surfaced at error severity so an unexpected
    /// condition never silently halts progress.
    #[error("unclassified error: {0}")]
    Unclassified(String),
}
