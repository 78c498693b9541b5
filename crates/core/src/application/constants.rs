// Generation constants (No magic values)
use std::time::Duration;

/// Total attempts per inference call, including the first (3)
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Fixed wait between attempts (1s, no exponential growth)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Progress increment per tick (percent)
pub const PROGRESS_STEP: u8 = 10;

/// Progress tick interval (500ms)
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Ceiling the ticker never passes on its own (percent)
pub const PROGRESS_CAP: u8 = 90;

/// Value forced on stop (percent)
pub const PROGRESS_DONE: u8 = 100;
