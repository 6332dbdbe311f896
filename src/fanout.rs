use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use scrape::{Appendable, Sample};

/// A named destination of scraped samples.
#[derive(Clone)]
pub struct Receiver {
    name: String,
    inner: Arc<dyn Appendable>,
}

impl Receiver {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Appendable>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver").field("name", &self.name).finish()
    }
}

impl PartialEq for Receiver {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

/// Forwards every appended batch to all current receivers. The receiver set
/// can be swapped at any time, a batch is delivered either to the old set or
/// to the new one, never to a mix of both.
#[derive(Default)]
pub struct Fanout {
    receivers: RwLock<Vec<Receiver>>,
}

impl Fanout {
    pub fn new(receivers: Vec<Receiver>) -> Self {
        Self {
            receivers: RwLock::new(receivers),
        }
    }

    /// Replace the active receivers.
    pub fn set_receivers(&self, receivers: Vec<Receiver>) {
        let names = receivers.iter().map(Receiver::name).collect::<Vec<_>>();
        debug!(message = "set receivers", ?names);

        *self.receivers.write() = receivers;
    }

    pub fn receivers(&self) -> Vec<Receiver> {
        self.receivers.read().clone()
    }
}

impl Appendable for Fanout {
    fn append(&self, samples: &[Sample]) {
        if samples.is_empty() {
            return;
        }

        let receivers = self.receivers.read();
        for receiver in receivers.iter() {
            receiver.inner.append(samples);
        }
    }
}
