//! Ids for locally created messages

use parking_lot::Mutex;
use std::sync::Arc;

/// Prefix keeping local ids apart from server-issued ones
pub const LOCAL_ID_PREFIX: &str = "user-";

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Generates `user-<millis>` ids that strictly increase within a process,
/// even when two messages are created in the same millisecond.
#[derive(Clone)]
pub struct MessageIdGenerator {
    clock: Clock,
    last: Arc<Mutex<i64>>,
}

impl MessageIdGenerator {
    /// Generator driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Utc::now().timestamp_millis())
    }

    /// Generator driven by a custom millisecond clock
    pub fn with_clock(clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            last: Arc::new(Mutex::new(i64::MIN)),
        }
    }

    /// Next id
    pub fn next_id(&self) -> String {
        let now = (self.clock)();
        let mut last = self.last.lock();
        let stamp = if now > *last { now } else { *last + 1 };
        *last = stamp;
        format!("{}{}", LOCAL_ID_PREFIX, stamp)
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
