//! Host-supplied block context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The consensus coordinates of the current block, handed in by the host on
/// every engine call. Block time is consensus time, not wall-clock time —
/// the engine never consults a clock of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl BlockContext {
    #[must_use]
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }
}
