//! The contract between the scrape supervisor and a collection engine.
//!
//! A collection engine accepts a declarative [`Config`], takes [`TargetSets`]
//! one at a time from a [`handoff`], scrapes the resulting [`Target`]s on its
//! own schedule and appends the samples it collects to an [`Appendable`].
//! Nothing in this crate performs network I/O, it only describes the data
//! that crosses the boundary and the rules the engine applies to it.

mod config;
mod labels;
mod manager;
mod sample;
mod target;

pub use config::{
    Authorization, BasicAuth, Config, ConfigError, HttpClientConfig, OAuth2, ScrapeConfig,
    TlsConfig,
};
pub use labels::{
    ADDRESS_LABEL, INSTANCE_LABEL, JOB_LABEL, Labels, META_LABEL_PREFIX, METRICS_PATH_LABEL,
    PARAM_LABEL_PREFIX, SCHEME_LABEL,
};
pub use manager::{
    ActiveTargets, Handoff, HandoffClosed, ManagerOptions, ScrapeManager, TargetSets, Updates,
    handoff,
};
pub use sample::{Appendable, Sample};
pub use target::{Health, Target, TargetError, TargetGroup, populate_labels};

/// Basic error type, dynamically dispatched and safe to send across threads
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Basic result type, defined in terms of [`Error`] and generic over `T`
pub type Result<T> = std::result::Result<T, Error>;
