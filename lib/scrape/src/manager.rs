use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::config::Config;
use crate::target::{Target, TargetGroup};

/// Target groups keyed by the name of the target set they belong to. Every
/// update carries the complete state of the sets it names.
pub type TargetSets = HashMap<String, Vec<TargetGroup>>;

/// Active targets keyed by job name. A slot is `None` while the engine is
/// still (re)creating the target it belongs to.
pub type ActiveTargets = BTreeMap<String, Vec<Option<Arc<Target>>>>;

/// Options an engine is created with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Report the extra per-scrape metrics, e.g. the body size and sample
    /// limit of each scrape.
    pub extra_metrics: bool,

    /// Sent as `User-Agent` with every scrape request.
    pub user_agent: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("target set updates are no longer consumed")]
pub struct HandoffClosed;

struct Pending {
    sets: TargetSets,
    taken: oneshot::Sender<()>,
}

/// Creates an unbuffered hand-off of target set updates. A send completes
/// only once the engine took the sets out of [`Updates`].
pub fn handoff() -> (Handoff, Updates) {
    let (tx, rx) = mpsc::channel(1);

    (Handoff { tx }, Updates { rx })
}

/// The sending half of [`handoff`].
#[derive(Debug)]
pub struct Handoff {
    tx: mpsc::Sender<Pending>,
}

impl Handoff {
    /// Waits until the engine takes `sets`.
    ///
    /// Dropping the returned future abandons the sets, the engine never sees
    /// them even if they were already queued.
    pub async fn send(&self, sets: TargetSets) -> Result<(), HandoffClosed> {
        let (taken, rx) = oneshot::channel();

        self.tx
            .send(Pending { sets, taken })
            .await
            .map_err(|_| HandoffClosed)?;

        rx.await.map_err(|_| HandoffClosed)
    }
}

/// The receiving half of [`handoff`], consumed by the engine.
pub struct Updates {
    rx: mpsc::Receiver<Pending>,
}

impl Updates {
    /// Receives the next update, or `None` once the sender is gone.
    ///
    /// Cancel safe. Updates abandoned by the sender are skipped.
    pub async fn recv(&mut self) -> Option<TargetSets> {
        while let Some(Pending { sets, taken }) = self.rx.recv().await {
            if taken.send(()).is_ok() {
                return Some(sets);
            }
        }

        None
    }
}

/// A collection engine. The engine is shared between the caller applying
/// configuration, the task feeding it target sets and readers inspecting its
/// targets, so every method must be safe to call concurrently.
#[async_trait::async_trait]
pub trait ScrapeManager: Send + Sync + 'static {
    /// Replaces the job configuration. A rejected configuration leaves the
    /// previous one in place.
    fn apply_config(&self, config: Config) -> crate::Result<()>;

    /// Consumes target set updates until `stop` is called or `updates` is
    /// closed. Returns an error if scraping terminated unexpectedly.
    async fn run(self: Arc<Self>, updates: Updates) -> crate::Result<()>;

    /// The targets currently scraped.
    fn targets_active(&self) -> ActiveTargets;

    /// Halts all scraping and makes `run` return.
    fn stop(&self);
}
