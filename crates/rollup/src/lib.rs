#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(any(test, feature = "test-utils")), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{ResetError, StepError};

mod events;
pub use events::RollupEvent;

mod pipeline;
pub use pipeline::DriverPipeline;

mod deriver;
pub use deriver::{AttributesState, PipelineDeriver};

mod engine;
pub use engine::{EngineDeriver, OpExecutionPayloadEnvelope, PayloadInfo};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
