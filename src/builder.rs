use scrape::{ConfigError, ScrapeConfig};

use crate::config::Arguments;

/// Builds the job configuration the engine scrapes `args` with, and runs the
/// engine's validation on it. The job is named after `id` unless the
/// arguments override it.
pub fn build_scrape_config(id: &str, args: &Arguments) -> Result<ScrapeConfig, ConfigError> {
    let job_name = if args.job_name.is_empty() {
        id.to_string()
    } else {
        args.job_name.clone()
    };

    let config = ScrapeConfig {
        job_name,
        honor_labels: args.honor_labels,
        honor_timestamps: args.honor_timestamps,
        params: args.params.clone(),
        scrape_interval: args.scrape_interval,
        scrape_timeout: args.scrape_timeout,
        metrics_path: args.metrics_path.clone(),
        scheme: args.scheme.clone(),
        body_size_limit: args.body_size_limit,
        sample_limit: args.sample_limit,
        target_limit: args.target_limit,
        label_limit: args.label_limit,
        label_name_length_limit: args.label_name_length_limit,
        label_value_length_limit: args.label_value_length_limit,
        http_client_config: args.http_client_config.clone(),
    };

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use scrape::{BasicAuth, HttpClientConfig};

    use super::*;

    #[test]
    fn defaults() {
        let config = build_scrape_config("prometheus.scrape.default", &Arguments::default()).unwrap();

        assert_eq!(
            config,
            ScrapeConfig {
                job_name: "prometheus.scrape.default".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn maps_every_field() {
        let args = Arguments {
            job_name: "node".to_string(),
            honor_labels: true,
            honor_timestamps: false,
            params: [("module".to_string(), vec!["http_2xx".to_string()])].into(),
            scrape_interval: Duration::from_secs(15),
            scrape_timeout: Duration::from_secs(5),
            metrics_path: "/federate".to_string(),
            scheme: "https".to_string(),
            body_size_limit: 1024,
            sample_limit: 1,
            target_limit: 2,
            label_limit: 3,
            label_name_length_limit: 4,
            label_value_length_limit: 5,
            ..Default::default()
        };

        let config = build_scrape_config("prometheus.scrape.default", &args).unwrap();
        assert_eq!(
            config,
            ScrapeConfig {
                job_name: "node".to_string(),
                honor_labels: true,
                honor_timestamps: false,
                params: args.params.clone(),
                scrape_interval: Duration::from_secs(15),
                scrape_timeout: Duration::from_secs(5),
                metrics_path: "/federate".to_string(),
                scheme: "https".to_string(),
                body_size_limit: 1024,
                sample_limit: 1,
                target_limit: 2,
                label_limit: 3,
                label_name_length_limit: 4,
                label_value_length_limit: 5,
                http_client_config: HttpClientConfig::default(),
            }
        );
    }

    #[test]
    fn surfaces_engine_validation() {
        let args = Arguments {
            scheme: "ftp".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_scrape_config("id", &args),
            Err(ConfigError::InvalidScheme("ftp".to_string()))
        );

        let args = Arguments {
            http_client_config: HttpClientConfig {
                basic_auth: Some(BasicAuth {
                    username: "admin".to_string(),
                    password: Some("secret".to_string()),
                    password_file: None,
                }),
                bearer_token_file: Some("/var/run/token".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            build_scrape_config("id", &args),
            Err(ConfigError::MultipleAuth)
        );
    }
}
