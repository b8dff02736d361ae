//! Convenient imports for shardlog.
//!
//! ```ignore
//! use shardlog::prelude::*;
//! ```

// Main entry point
pub use crate::{EventLog, EventLogBuilder, EventStorage};

// Appends
pub use crate::{AppendOptions, AppendOutcome};

// Error handling
pub use crate::{Error, Result};

// Event model
pub use crate::{EventInfo, EventList, EventMeta, LogEvent, RecordId, Version};

// Configuration and codecs
pub use crate::{BucketWidth, LogConfig, PayloadFormat, TypeRegistry};
