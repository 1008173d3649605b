#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

mod event;
pub use event::{Event, EventId, EventPayload};

mod queue;
pub use queue::{Emitter, EventQueue};

mod deriver;
pub use deriver::{Deriver, DeriverFunc, MultiDeriver};

mod driver;
pub use driver::{EndCondition, EventDriver};
