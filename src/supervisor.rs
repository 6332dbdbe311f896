use std::sync::Arc;

use parking_lot::RwLock;
use scrape::{Appendable, Config, ConfigError, ManagerOptions, ScrapeManager, handoff};
use thiserror::Error;

use crate::builder::build_scrape_config;
use crate::config::Arguments;
use crate::fanout::Fanout;
use crate::reload::Reload;
use crate::shutdown::ShutdownSignal;
use crate::status::{ScraperStatus, collect};
use crate::translate::translate;
use crate::user_agent;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("invalid scrape_config: {0}")]
    InvalidScrapeConfig(#[from] ConfigError),

    #[error("error applying scrape configs: {0}")]
    ApplyConfig(#[source] scrape::Error),
}

/// Calls `stop` on the engine when dropped, so scraping halts however the
/// run loop exits, including when its future is dropped.
struct StopOnDrop<'a, M: ScrapeManager>(&'a M);

impl<M: ScrapeManager> Drop for StopOnDrop<'_, M> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Owns one scrape engine and keeps it in line with the latest arguments.
///
/// `update` may be called from any thread at any time, while `run` pushes
/// the target set of the latest arguments to the engine whenever they change.
pub struct Supervisor<M> {
    id: String,

    reload: Reload,
    args: RwLock<Arguments>,

    manager: Arc<M>,
    fanout: Arc<Fanout>,
}

impl<M: ScrapeManager> Supervisor<M> {
    /// Creates the engine with `build` and applies `args` to it. The engine
    /// appends scraped samples to the receivers of the latest arguments.
    pub fn new<F>(id: impl Into<String>, args: Arguments, build: F) -> Result<Self, UpdateError>
    where
        F: FnOnce(ManagerOptions, Arc<dyn Appendable>) -> M,
    {
        let fanout = Arc::new(Fanout::new(args.forward_to.clone()));
        let options = ManagerOptions {
            extra_metrics: args.extra_metrics,
            user_agent: user_agent(),
        };
        let manager = build(options, Arc::clone(&fanout) as Arc<dyn Appendable>);

        let supervisor = Self {
            id: id.into(),
            reload: Reload::new(),
            args: RwLock::new(Arguments::default()),
            manager: Arc::new(manager),
            fanout,
        };
        supervisor.update(args)?;

        Ok(supervisor)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The arguments last accepted by `update`.
    pub fn arguments(&self) -> Arguments {
        self.args.read().clone()
    }

    #[inline]
    pub fn manager(&self) -> &Arc<M> {
        &self.manager
    }

    /// Replaces the arguments. Nothing changes if the engine refuses the
    /// resulting job configuration.
    ///
    /// The new targets reach the engine asynchronously, through `run`.
    pub fn update(&self, args: Arguments) -> Result<(), UpdateError> {
        let mut current = self.args.write();

        let config = build_scrape_config(&self.id, &args)?;
        self.manager
            .apply_config(Config::single(self.id.clone(), config))
            .map_err(UpdateError::ApplyConfig)?;

        self.fanout.set_receivers(args.forward_to.clone());
        *current = args;
        drop(current);

        debug!(
            message = "scrape arguments updated",
            id = %self.id,
        );

        self.reload.raise();

        Ok(())
    }

    /// Runs the engine and feeds it target sets until `shutdown` resolves.
    /// The engine is stopped before this returns.
    pub async fn run(&self, mut shutdown: ShutdownSignal) {
        let _stop = StopOnDrop(self.manager.as_ref());

        let (tx, updates) = handoff();

        let manager = Arc::clone(&self.manager);
        let id = self.id.clone();
        tokio::spawn(async move {
            match manager.run(updates).await {
                Ok(()) => info!(message = "scrape manager stopped", %id),
                Err(err) => error!(message = "scrape manager failed", %id, %err),
            }
        });

        info!(message = "supervisor started", id = %self.id);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                _ = self.reload.wait() => {}
            }

            let sets = {
                let args = self.args.read();
                translate(&self.id, &args.targets)
            };

            // completes once the engine took the sets, so nothing is left
            // queued when shutdown wins
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                result = tx.send(sets) => match result {
                    Ok(()) => debug!(
                        message = "target sets sent to scrape manager",
                        id = %self.id,
                    ),
                    Err(_) => warn!(
                        message = "scrape manager is gone, target sets dropped",
                        id = %self.id,
                    ),
                }
            }
        }

        info!(message = "supervisor stopped", id = %self.id);
    }

    /// Reads the targets the engine scrapes right now.
    pub fn status(&self) -> ScraperStatus {
        collect(self.manager.as_ref())
    }
}
