use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A single slot notification. Raising it while a signal is pending is a
/// no-op, so a waiter wakes up at most once for any number of raises that
/// happened since it last woke up.
#[derive(Debug, Default)]
pub struct Reload {
    pending: AtomicBool,
    notify: Notify,
}

impl Reload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a reload, never blocks.
    pub fn raise(&self) {
        if !self.pending.swap(true, Ordering::AcqRel) {
            self.notify.notify_one();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Wait until a reload is flagged and clear it.
    ///
    /// Cancel safe, the flag is only cleared when the returned future
    /// completes.
    pub async fn wait(&self) {
        loop {
            if self.pending.swap(false, Ordering::AcqRel) {
                return;
            }

            // `notify_one` stores a permit when nobody is waiting, so a
            // raise between the swap above and this await is not lost
            self.notify.notified().await;
        }
    }
}
