//! Event log engine for shardlog
//!
//! Composes the storage seams into the three operations a host needs:
//! - [`EventLogReader`]: ordered range and type-filtered reads with early exit
//! - [`EventLogWriter`]: idempotent appends keyed by message id
//! - [`CompletionTracker`]: post-hoc completion flag
//!
//! [`EventLog`] bundles them behind the [`EventStorage`] trait and is built
//! with [`EventLogBuilder`]. Every store call is bounded by the configured
//! deadline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod completion;
mod deadline;
pub mod log;
pub mod reader;
pub mod writer;


pub use builder::EventLogBuilder;
pub use completion::CompletionTracker;
pub use log::{EventLog, EventStorage};
pub use reader::EventLogReader;
pub use writer::{AppendOptions, AppendOutcome, EventLogWriter};
