use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Errors returned when a job configuration is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("job_name is empty")]
    EmptyJobName,

    #[error("unsupported scheme {0:?}, must be \"http\" or \"https\"")]
    InvalidScheme(String),

    #[error("metrics_path {0:?} must start with \"/\"")]
    InvalidMetricsPath(String),

    #[error("scrape_interval must be greater than zero")]
    ZeroInterval,

    #[error("scrape_timeout must be greater than zero")]
    ZeroTimeout,

    #[error(
        "at most one of basic_auth, authorization, oauth2, bearer_token & bearer_token_file must be configured"
    )]
    MultipleAuth,

    #[error("at most one of basic_auth password & password_file must be configured")]
    BasicAuthPassword,

    #[error("at most one of authorization credentials & credentials_file must be configured")]
    AuthorizationCredentials,

    #[error("authorization type cannot be set to \"basic\", use \"basic_auth\" instead")]
    AuthorizationBasic,

    #[error("at most one of oauth2 client_secret & client_secret_file must be configured")]
    OAuth2Secret,

    #[error("oauth2 token_url must be configured")]
    OAuth2TokenUrl,

    #[error("tls_config cert_file and key_file must be configured together")]
    TlsKeyPair,

    #[error("unsupported proxy_url scheme {0:?}")]
    ProxyScheme(String),
}

fn serialize_optional_secret<S: Serializer>(
    secret: &Option<String>,
    ser: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => ser.serialize_some("<secret>"),
        None => ser.serialize_none(),
    }
}

const fn default_true() -> bool {
    true
}

fn default_authorization_type() -> String {
    "Bearer".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub username: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Authorization {
    #[serde(rename = "type", default = "default_authorization_type")]
    pub kind: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub credentials: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,
}

impl Default for Authorization {
    fn default() -> Self {
        Self {
            kind: default_authorization_type(),
            credentials: None,
            credentials_file: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OAuth2 {
    pub client_id: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub token_url: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoint_params: BTreeMap<String, String>,
}

/// TLS options used when connecting to targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    /// CA certificate to validate the server certificate with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,

    /// Certificate for client authentication, requires `key_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<PathBuf>,

    /// Key for client authentication, requires `cert_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Used to verify the hostname of the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,

    /// Disable validation of the server certificate.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(ConfigError::TlsKeyPair);
        }

        Ok(())
    }
}

/// Settings of the HTTP client used to scrape targets.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub bearer_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<Url>,

    #[serde(default)]
    pub tls_config: TlsConfig,

    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    #[serde(default = "default_true")]
    pub enable_http2: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            basic_auth: None,
            authorization: None,
            oauth2: None,
            bearer_token: None,
            bearer_token_file: None,
            proxy_url: None,
            tls_config: TlsConfig::default(),
            follow_redirects: true,
            enable_http2: true,
        }
    }
}

impl HttpClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let configured = [
            self.basic_auth.is_some(),
            self.authorization.is_some(),
            self.oauth2.is_some(),
            self.bearer_token.as_ref().is_some_and(|token| !token.is_empty()),
            self.bearer_token_file.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if configured > 1 {
            return Err(ConfigError::MultipleAuth);
        }

        if let Some(basic) = &self.basic_auth
            && basic.password.is_some()
            && basic.password_file.is_some()
        {
            return Err(ConfigError::BasicAuthPassword);
        }

        if let Some(authorization) = &self.authorization {
            if authorization.kind.eq_ignore_ascii_case("basic") {
                return Err(ConfigError::AuthorizationBasic);
            }

            if authorization.credentials.is_some() && authorization.credentials_file.is_some() {
                return Err(ConfigError::AuthorizationCredentials);
            }
        }

        if let Some(oauth2) = &self.oauth2 {
            if oauth2.client_secret.is_some() && oauth2.client_secret_file.is_some() {
                return Err(ConfigError::OAuth2Secret);
            }

            if oauth2.token_url.is_empty() {
                return Err(ConfigError::OAuth2TokenUrl);
            }
        }

        if let Some(proxy) = &self.proxy_url
            && !matches!(proxy.scheme(), "http" | "https")
        {
            return Err(ConfigError::ProxyScheme(proxy.scheme().to_string()));
        }

        self.tls_config.validate()
    }
}

/// Describes how one job scrapes its targets.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeConfig {
    /// The value of the `job` label attached to every target of this job.
    pub job_name: String,

    pub honor_labels: bool,

    pub honor_timestamps: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Vec<String>>,

    #[serde(with = "humanize::duration::serde")]
    pub scrape_interval: Duration,

    #[serde(with = "humanize::duration::serde")]
    pub scrape_timeout: Duration,

    pub metrics_path: String,

    pub scheme: String,

    /// Zero means no limit.
    #[serde(with = "humanize::bytes::serde")]
    pub body_size_limit: usize,

    pub sample_limit: usize,

    pub target_limit: usize,

    pub label_limit: usize,

    pub label_name_length_limit: usize,

    pub label_value_length_limit: usize,

    pub http_client_config: HttpClientConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            honor_labels: false,
            honor_timestamps: true,
            params: BTreeMap::new(),
            scrape_interval: Duration::from_secs(60),
            scrape_timeout: Duration::from_secs(10),
            metrics_path: "/metrics".to_string(),
            scheme: "http".to_string(),
            body_size_limit: 0,
            sample_limit: 0,
            target_limit: 0,
            label_limit: 0,
            label_name_length_limit: 0,
            label_value_length_limit: 0,
            http_client_config: HttpClientConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Checks the structural rules every engine enforces before a job is
    /// accepted. `scrape_timeout` is not compared with `scrape_interval`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_name.is_empty() {
            return Err(ConfigError::EmptyJobName);
        }

        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidScheme(self.scheme.clone()));
        }

        if !self.metrics_path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(self.metrics_path.clone()));
        }

        if self.scrape_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        if self.scrape_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        self.http_client_config.validate()
    }
}

/// The full declarative configuration handed to an engine. Scrape configs
/// are keyed by the name of the target set they consume.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub scrape_configs: BTreeMap<String, ScrapeConfig>,
}

impl Config {
    pub fn single(name: impl Into<String>, config: ScrapeConfig) -> Self {
        Self {
            scrape_configs: BTreeMap::from([(name.into(), config)]),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scrape_configs.values().try_for_each(ScrapeConfig::validate)
    }
}
