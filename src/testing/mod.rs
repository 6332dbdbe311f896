mod manager;

use std::time::{Duration, Instant};

pub use manager::{Behavior, MockManager};

const WAIT_FOR_SECS: u64 = 5; // The default time to wait in `wait_for`
const WAIT_FOR_MIN_MILLIS: u64 = 5; // The minimum time to pause before retrying
const WAIT_FOR_MAX_MILLIS: u64 = 100; // The maximum time to pause before retrying

pub fn trace_init() {
    let levels = std::env::var("TEST_LOG").unwrap_or_else(|_| "warn".into());

    crate::trace::init(false, false, &levels)
}

/// Poll `f` until it returns true, panics after 5 seconds.
pub async fn wait_for<F>(mut f: F)
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    let mut delay = WAIT_FOR_MIN_MILLIS;

    while !f() {
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if started.elapsed() > Duration::from_secs(WAIT_FOR_SECS) {
            panic!("Timed out while waiting");
        }

        delay = (2 * delay).min(WAIT_FOR_MAX_MILLIS);
    }
}
