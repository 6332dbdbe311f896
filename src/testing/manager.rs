use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use scrape::{
    ActiveTargets, Appendable, Config, INSTANCE_LABEL, Labels, ManagerOptions, Sample,
    ScrapeManager, Target, TargetSets, Updates, populate_labels,
};
use tokio_util::sync::CancellationToken;

/// How the mock engine treats its target set input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Consume every update and sync the active targets.
    Consume,
    /// Read nothing until `open_gate` is called, then consume every update
    /// until the input is closed, even after being stopped.
    Gated,
    /// Terminate right away with an error.
    Fail,
}

/// An in-memory engine which never touches the network. Targets are created
/// from the received target sets, and `scrape` simulates a successful scrape
/// of all of them.
pub struct MockManager {
    options: ManagerOptions,
    appendable: Arc<dyn Appendable>,
    behavior: Behavior,

    reject: AtomicBool,
    config: Mutex<Config>,
    applied: AtomicUsize,
    received: Mutex<Vec<TargetSets>>,
    targets: RwLock<ActiveTargets>,

    gate: CancellationToken,
    stops: AtomicUsize,
    stopped: CancellationToken,
}

impl MockManager {
    pub fn factory(
        behavior: Behavior,
    ) -> impl FnOnce(ManagerOptions, Arc<dyn Appendable>) -> MockManager {
        move |options, appendable| MockManager {
            options,
            appendable,
            behavior,
            reject: AtomicBool::new(false),
            config: Mutex::new(Config::default()),
            applied: AtomicUsize::new(0),
            received: Mutex::new(vec![]),
            targets: RwLock::new(ActiveTargets::new()),
            gate: CancellationToken::new(),
            stops: AtomicUsize::new(0),
            stopped: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Reject every config applied from now on.
    pub fn reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn config(&self) -> Config {
        self.config.lock().clone()
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<TargetSets> {
        self.received.lock().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn open_gate(&self) {
        self.gate.cancel();
    }

    /// Add a slot for a target which is still being created.
    pub fn add_placeholder(&self, job: &str) {
        self.targets
            .write()
            .entry(job.to_string())
            .or_default()
            .push(None);
    }

    /// Report a successful scrape for every active target, and append one
    /// `up` sample per target.
    pub fn scrape(&self) {
        let now = Utc::now();
        let mut samples = vec![];

        for target in self.targets.read().values().flatten().flatten() {
            target.report(now, Duration::from_millis(5), Ok(()));

            let mut labels = Labels::from_iter([("__name__", "up")]);
            if let Some(instance) = target.labels().get(INSTANCE_LABEL) {
                labels.insert(INSTANCE_LABEL, instance);
            }
            samples.push(Sample::new(labels, now.timestamp_millis(), 1.0));
        }

        self.appendable.append(&samples);
    }

    fn sync(&self, sets: TargetSets) {
        let config = self.config.lock().clone();
        let mut active = self.targets.write();

        for (name, groups) in &sets {
            let Some(scrape_config) = config.scrape_configs.get(name) else {
                continue;
            };

            let mut targets = vec![];
            for group in groups {
                for discovered in &group.targets {
                    let Ok(labels) = populate_labels(discovered, &group.labels, scrape_config)
                    else {
                        continue;
                    };

                    if let Ok(target) =
                        Target::new(labels, &scrape_config.params)
                    {
                        targets.push(Some(Arc::new(target)));
                    }
                }
            }

            active.insert(scrape_config.job_name.clone(), targets);
        }

        self.received.lock().push(sets);
    }
}

#[async_trait::async_trait]
impl ScrapeManager for MockManager {
    fn apply_config(&self, config: Config) -> scrape::Result<()> {
        if self.reject.load(Ordering::SeqCst) {
            return Err("config rejected by mock manager".into());
        }

        config.validate()?;
        *self.config.lock() = config;
        self.applied.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn run(self: Arc<Self>, mut updates: Updates) -> scrape::Result<()> {
        match self.behavior {
            Behavior::Fail => Err("scrape loop crashed".into()),
            Behavior::Gated => {
                self.gate.cancelled().await;

                while let Some(sets) = updates.recv().await {
                    self.sync(sets);
                }

                Ok(())
            }
            Behavior::Consume => loop {
                tokio::select! {
                    biased;

                    _ = self.stopped.cancelled() => return Ok(()),
                    update = updates.recv() => match update {
                        Some(sets) => self.sync(sets),
                        None => return Ok(()),
                    }
                }
            },
        }
    }

    fn targets_active(&self) -> ActiveTargets {
        self.targets.read().clone()
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.stopped.cancel();
    }
}
