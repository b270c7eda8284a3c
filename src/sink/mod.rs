//! Reading and diagnostic sinks
//!
//! # Adding a sink
//!
//! 1. Create `sink/my_sink.rs`
//! 2. Implement `ReadingSink` and/or `DiagnosticSink`
//! 3. Add a `SinkKind` variant and wire it in `build()`

pub mod jsonl;
pub mod log;
pub mod memory;

pub use jsonl::JsonLinesSink;
pub use log::{LogDiagnostics, LogSink};
pub use memory::MemorySink;

use crate::config::{SinkConfig, SinkKind};
use crate::dispatch::ReadingSink;
use crate::error::Result;
use std::sync::Arc;

/// Build the reading sink selected in config
pub fn build(config: &SinkConfig) -> Result<Arc<dyn ReadingSink>> {
    Ok(match config.kind {
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::Jsonl => Arc::new(JsonLinesSink::open(&config.path)?),
    })
}
