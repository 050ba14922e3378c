mod clock;
mod tick;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use tick::{CancelToken, IntervalTimer, MIN_TIMER_DELAY};
