use std::time::Duration;

use chrono::{DateTime, Utc};
use scrape::{Health, Labels, ScrapeManager};
use serde::Serialize;

/// The latest scrape of one target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetStatus {
    pub job: String,
    pub url: String,
    pub health: Health,
    pub labels: Labels,
    /// Empty if the latest scrape succeeded or no scrape completed yet.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_error: String,
    pub last_scrape: Option<DateTime<Utc>>,
    #[serde(with = "humanize::duration::serde")]
    pub last_scrape_duration: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScraperStatus {
    pub targets: Vec<TargetStatus>,
}

/// Reads the active targets of `manager`, ordered by job name and then by
/// the engine's own order. Nothing is cached, every call reads the live
/// registry again.
pub fn collect<M: ScrapeManager + ?Sized>(manager: &M) -> ScraperStatus {
    let mut targets = vec![];

    for (job, active) in manager.targets_active() {
        for target in active.into_iter().flatten() {
            targets.push(TargetStatus {
                job: job.clone(),
                url: target.url().to_string(),
                health: target.health(),
                labels: target.labels(),
                last_error: target.last_error().unwrap_or_default(),
                last_scrape: target.last_scrape(),
                last_scrape_duration: target.last_scrape_duration(),
            });
        }
    }

    ScraperStatus { targets }
}
