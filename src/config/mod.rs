mod loading;

use std::collections::BTreeMap;
use std::time::Duration;

use scrape::HttpClientConfig;
use serde::{Deserialize, Serialize};

use crate::discovery::Target;
use crate::fanout::Receiver;

pub use loading::{LoadError, interpolate, load_from_path, load_from_str};

const fn default_true() -> bool {
    true
}

const fn default_scrape_interval() -> Duration {
    Duration::from_secs(60)
}

const fn default_scrape_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_scheme() -> String {
    "http".to_string()
}

/// Everything a supervisor needs to drive one scrape job.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Arguments {
    /// Targets to scrape.
    #[serde(default)]
    pub targets: Vec<Target>,

    /// Where scraped samples are forwarded to. Receivers are live handles,
    /// so they never come from a config file.
    #[serde(skip)]
    pub forward_to: Vec<Receiver>,

    /// Overrides the `job` label, the supervisor ID is used when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_name: String,

    /// Keep the labels of scraped samples when they collide with target labels.
    #[serde(default)]
    pub honor_labels: bool,

    /// Use the timestamps exposed by targets instead of the scrape time.
    #[serde(default = "default_true")]
    pub honor_timestamps: bool,

    /// Query parameters added to every scrape request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Vec<String>>,

    #[serde(default = "default_scrape_interval", with = "humanize::duration::serde")]
    pub scrape_interval: Duration,

    /// Should not exceed `scrape_interval`, this is not checked.
    #[serde(default = "default_scrape_timeout", with = "humanize::duration::serde")]
    pub scrape_timeout: Duration,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Scrapes with an uncompressed body larger than this fail. Zero means
    /// no limit.
    #[serde(default, with = "humanize::bytes::serde")]
    pub body_size_limit: usize,

    /// The limits below fail a scrape once exceeded, zero disables them.
    #[serde(default)]
    pub sample_limit: usize,
    #[serde(default)]
    pub target_limit: usize,
    #[serde(default)]
    pub label_limit: usize,
    #[serde(default)]
    pub label_name_length_limit: usize,
    #[serde(default)]
    pub label_value_length_limit: usize,

    #[serde(default)]
    pub http_client_config: HttpClientConfig,

    /// Report extra per-scrape metrics.
    #[serde(default)]
    pub extra_metrics: bool,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            targets: vec![],
            forward_to: vec![],
            job_name: String::new(),
            honor_labels: false,
            honor_timestamps: true,
            params: BTreeMap::new(),
            scrape_interval: default_scrape_interval(),
            scrape_timeout: default_scrape_timeout(),
            metrics_path: default_metrics_path(),
            scheme: default_scheme(),
            body_size_limit: 0,
            sample_limit: 0,
            target_limit: 0,
            label_limit: 0,
            label_name_length_limit: 0,
            label_value_length_limit: 0,
            http_client_config: HttpClientConfig::default(),
            extra_metrics: false,
        }
    }
}

impl Arguments {
    /// An example used by the `generate` command.
    pub fn example() -> Self {
        Self {
            targets: vec![
                Target::from_iter([("__address__", "127.0.0.1:9090")]),
                Target::from_iter([("__address__", "127.0.0.1:9100"), ("env", "dev")]),
            ],
            scrape_interval: Duration::from_secs(15),
            ..Default::default()
        }
    }
}
