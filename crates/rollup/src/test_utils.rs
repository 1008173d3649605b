//! Test utilities for the rollup derivers.

use crate::{DriverPipeline, StepError};
use alloc::{boxed::Box, collections::VecDeque, format, string::String, sync::Arc, vec::Vec};
use alloy_eips::BlockNumHash;
use alloy_rpc_types_engine::PayloadAttributes;
use async_trait::async_trait;
use op_alloy_protocol::{BlockInfo, L2BlockInfo};
use op_alloy_rpc_types_engine::{OpAttributesWithParent, OpPayloadAttributes};
use spin::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, Layer};

/// A scripted [`DriverPipeline`] that replays queued step outcomes and records
/// the calls made against it.
#[derive(Debug, Default)]
pub struct TestPipeline {
    /// The current L1 origin.
    pub origin: BlockInfo,
    /// Queued step outcomes, optionally moving the origin when consumed.
    pub steps: VecDeque<(Result<Option<OpAttributesWithParent>, StepError>, Option<BlockInfo>)>,
    /// Queued deposits-only outcomes.
    pub deposits: VecDeque<Result<OpAttributesWithParent, StepError>>,
    /// Number of times the pipeline was reset.
    pub resets: usize,
    /// Number of times the engine-side reset was confirmed.
    pub reset_confirmations: usize,
    /// Arguments of every deposits-only request.
    pub deposits_requests: Vec<(BlockNumHash, BlockInfo)>,
}

impl TestPipeline {
    /// Queues a step outcome that leaves the origin unchanged.
    pub fn push_step(&mut self, result: Result<Option<OpAttributesWithParent>, StepError>) {
        self.steps.push_back((result, None));
    }

    /// Queues a step outcome that moves the origin to `origin` when consumed.
    pub fn push_step_with_origin(
        &mut self,
        result: Result<Option<OpAttributesWithParent>, StepError>,
        origin: BlockInfo,
    ) {
        self.steps.push_back((result, Some(origin)));
    }
}

#[async_trait]
impl DriverPipeline for TestPipeline {
    async fn step(
        &mut self,
        _pending_safe: L2BlockInfo,
    ) -> Result<Option<OpAttributesWithParent>, StepError> {
        let Some((result, origin)) = self.steps.pop_front() else {
            return Err(StepError::Eof);
        };
        if let Some(origin) = origin {
            self.origin = origin;
        }
        result
    }

    fn origin(&self) -> BlockInfo {
        self.origin
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn confirm_engine_reset(&mut self) {
        self.reset_confirmations += 1;
    }

    async fn deposits_only_attributes(
        &mut self,
        parent_block: BlockNumHash,
        derived_from: BlockInfo,
    ) -> Result<OpAttributesWithParent, StepError> {
        self.deposits_requests.push((parent_block, derived_from));
        self.deposits.pop_front().unwrap_or_else(|| Err(StepError::NotEnoughData))
    }
}

/// Default attributes for testing deriver outcomes.
pub fn default_attributes() -> OpAttributesWithParent {
    OpAttributesWithParent {
        attributes: OpPayloadAttributes {
            payload_attributes: PayloadAttributes {
                timestamp: 2,
                prev_randao: Default::default(),
                suggested_fee_recipient: Default::default(),
                withdrawals: None,
                parent_beacon_block_root: None,
            },
            transactions: None,
            no_tx_pool: None,
            gas_limit: None,
            eip_1559_params: None,
        },
        parent: Default::default(),
        is_last_in_span: false,
    }
}

/// The storage for the collected traces.
#[derive(Debug, Default, Clone)]
pub struct TraceStorage(pub Arc<Mutex<Vec<(Level, String)>>>);

impl TraceStorage {
    /// Returns the items in the storage that match the specified level.
    pub fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|(l, message)| if *l == level { Some(message.clone()) } else { None })
            .collect()
    }

    /// Locks the storage and returns the items.
    pub fn lock(&self) -> spin::MutexGuard<'_, Vec<(Level, String)>> {
        self.0.lock()
    }

    /// Returns if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A subscriber layer that collects traces and their log levels.
#[derive(Debug, Default)]
pub struct CollectingLayer {
    /// The storage for the collected traces.
    pub storage: TraceStorage,
}

impl CollectingLayer {
    /// Creates a new collecting layer with the specified storage.
    pub const fn new(storage: TraceStorage) -> Self {
        Self { storage }
    }
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let message = format!("{:?}", event);

        let mut storage = self.storage.0.lock();
        storage.push((level, message));
    }
}
