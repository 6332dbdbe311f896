use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::ScrapeConfig;
use crate::labels::{
    ADDRESS_LABEL, INSTANCE_LABEL, JOB_LABEL, Labels, METRICS_PATH_LABEL, PARAM_LABEL_PREFIX,
    SCHEME_LABEL,
};

/// A group of targets sharing the same provenance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetGroup {
    /// Identifies the group, unique among the groups of one target set.
    pub source: String,

    /// Label sets of every target in this group, an empty list removes all
    /// targets previously announced under `source`.
    pub targets: Vec<Labels>,

    /// Labels shared by all targets, a target's own labels take precedence.
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("no address")]
    NoAddress,

    #[error("invalid target address {address:?}: {err}")]
    InvalidAddress {
        address: String,
        err: url::ParseError,
    },
}

/// The outcome of the latest scrape of a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    #[default]
    Unknown,
    Up,
    Down,
}

impl Health {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Health::Unknown => "unknown",
            Health::Up => "up",
            Health::Down => "down",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merges the group labels and the target labels, then fills in the labels
/// derived from the job configuration. The result always carries
/// `__address__`, `__scheme__`, `__metrics_path__`, `job` and `instance`.
pub fn populate_labels(
    target: &Labels,
    group: &Labels,
    config: &ScrapeConfig,
) -> Result<Labels, TargetError> {
    let mut labels = group.clone();
    for (name, value) in target {
        labels.insert(name.as_str(), value.as_str());
    }

    labels.insert_default(JOB_LABEL, config.job_name.as_str());
    labels.insert_default(SCHEME_LABEL, config.scheme.as_str());
    labels.insert_default(METRICS_PATH_LABEL, config.metrics_path.as_str());
    for (name, values) in &config.params {
        if let Some(first) = values.first() {
            labels.insert_default(format!("{PARAM_LABEL_PREFIX}{name}"), first.as_str());
        }
    }

    let address = match labels.get(ADDRESS_LABEL) {
        Some(address) if !address.is_empty() => address.to_string(),
        _ => return Err(TargetError::NoAddress),
    };

    let scheme = labels.get(SCHEME_LABEL).unwrap_or("http");
    let url = Url::parse(&format!("{scheme}://{address}")).map_err(|err| {
        TargetError::InvalidAddress {
            address: address.clone(),
            err,
        }
    })?;

    // the address always carries a port, so the instance label is stable
    // regardless of how the target was announced
    let address = match url.port_or_known_default() {
        Some(port) if url.port().is_none() && !address.ends_with(&format!(":{port}")) => {
            let address = format!("{address}:{port}");
            labels.insert(ADDRESS_LABEL, address.as_str());
            address
        }
        _ => address,
    };

    labels.insert_default(INSTANCE_LABEL, address);

    Ok(labels)
}

#[derive(Debug, Default)]
struct ScrapeState {
    health: Health,
    last_error: Option<String>,
    last_scrape: Option<DateTime<Utc>>,
    last_scrape_duration: Duration,
}

/// A scrape target known to an engine, along with the outcome of its latest
/// scrape. The engine updates the scrape state through [`Target::report`],
/// readers may inspect it at any time.
#[derive(Debug)]
pub struct Target {
    labels: Labels,
    url: Url,

    state: RwLock<ScrapeState>,
}

impl Target {
    /// `labels` must be the output of [`populate_labels`].
    pub fn new(
        labels: Labels,
        params: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, TargetError> {
        let address = labels.get(ADDRESS_LABEL).ok_or(TargetError::NoAddress)?;
        let scheme = labels.get(SCHEME_LABEL).unwrap_or("http");
        let path = labels.get(METRICS_PATH_LABEL).unwrap_or("/metrics");

        let mut url = Url::parse(&format!("{scheme}://{address}{path}")).map_err(|err| {
            TargetError::InvalidAddress {
                address: address.to_string(),
                err,
            }
        })?;

        let mut query = params.clone();
        for (name, value) in &labels {
            if let Some(param) = name.strip_prefix(PARAM_LABEL_PREFIX) {
                match query.get_mut(param) {
                    Some(values) if !values.is_empty() => values[0] = value.clone(),
                    _ => {
                        query.insert(param.to_string(), vec![value.clone()]);
                    }
                }
            }
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, values) in &query {
                for value in values {
                    pairs.append_pair(name, value);
                }
            }
        }

        Ok(Self {
            labels,
            url,
            state: RwLock::new(ScrapeState::default()),
        })
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Labels of the target without meta labels.
    pub fn labels(&self) -> Labels {
        self.labels.without_meta()
    }

    pub fn health(&self) -> Health {
        self.state.read().health
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    pub fn last_scrape(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_scrape
    }

    pub fn last_scrape_duration(&self) -> Duration {
        self.state.read().last_scrape_duration
    }

    /// Record the outcome of a completed scrape, replacing the previous one.
    pub fn report(&self, start: DateTime<Utc>, duration: Duration, result: Result<(), String>) {
        let mut state = self.state.write();

        state.last_scrape = Some(start);
        state.last_scrape_duration = duration;
        match result {
            Ok(()) => {
                state.health = Health::Up;
                state.last_error = None;
            }
            Err(err) => {
                state.health = Health::Down;
                state.last_error = Some(err);
            }
        }
    }
}
