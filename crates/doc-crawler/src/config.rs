use std::env;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub max_depth: usize,
    pub delay: Duration,
    pub respect_robots: bool,
    pub concurrency_limit: usize,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub include_metadata: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

pub fn default_user_agent() -> String {
    let homepage = env!("CARGO_PKG_HOMEPAGE");
    if homepage.is_empty() {
        format!("doc-crawler/{}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("doc-crawler/{} (+{})", env!("CARGO_PKG_VERSION"), homepage)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            delay: Duration::from_millis(250),
            respect_robots: true,
            concurrency_limit: 10,
            user_agent: default_user_agent(),
            request_timeout: Duration::from_secs(20),
            include_metadata: true,
            log_level: "doc_crawler=info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_seconds(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

impl CrawlerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(depth_str) = env::var("DOC_CRAWLER_MAX_DEPTH") {
            if let Ok(depth) = depth_str.trim().parse::<usize>() {
                config.max_depth = depth;
            } else {
                eprintln!(
                    "Warning: Invalid DOC_CRAWLER_MAX_DEPTH value '{}', using default {}",
                    depth_str, config.max_depth
                );
            }
        }

        if let Ok(delay_str) = env::var("DOC_CRAWLER_DELAY") {
            if let Some(delay) = parse_seconds(&delay_str) {
                config.delay = delay;
            } else {
                eprintln!(
                    "Warning: Invalid DOC_CRAWLER_DELAY value '{}', using default {}s",
                    delay_str,
                    config.delay.as_secs_f64()
                );
            }
        }

        if let Ok(respect_str) = env::var("DOC_CRAWLER_RESPECT_ROBOTS") {
            if let Some(respect) = parse_bool(&respect_str) {
                config.respect_robots = respect;
            } else {
                eprintln!(
                    "Warning: Invalid DOC_CRAWLER_RESPECT_ROBOTS value '{}', using default {}",
                    respect_str, config.respect_robots
                );
            }
        }

        if let Ok(limit_str) = env::var("DOC_CRAWLER_CONCURRENCY") {
            match limit_str.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.concurrency_limit = limit,
                _ => eprintln!(
                    "Warning: Invalid DOC_CRAWLER_CONCURRENCY value '{}', using default {}",
                    limit_str, config.concurrency_limit
                ),
            }
        }

        if let Ok(user_agent) = env::var("DOC_CRAWLER_USER_AGENT")
            && !user_agent.trim().is_empty()
        {
            config.user_agent = user_agent;
        }

        if let Ok(timeout_str) = env::var("DOC_CRAWLER_TIMEOUT") {
            match parse_seconds(&timeout_str) {
                Some(timeout) if !timeout.is_zero() => config.request_timeout = timeout,
                _ => eprintln!(
                    "Warning: Invalid DOC_CRAWLER_TIMEOUT value '{}', using default {}s",
                    timeout_str,
                    config.request_timeout.as_secs_f64()
                ),
            }
        }

        if let Ok(metadata_str) = env::var("DOC_CRAWLER_INCLUDE_METADATA") {
            if let Some(include) = parse_bool(&metadata_str) {
                config.include_metadata = include;
            } else {
                eprintln!(
                    "Warning: Invalid DOC_CRAWLER_INCLUDE_METADATA value '{}', using default {}",
                    metadata_str, config.include_metadata
                );
            }
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("DOC_CRAWLER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("DOC_CRAWLER_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid DOC_CRAWLER_LOG_FORMAT value '{}', using default text",
                        log_format
                    );
                    LogFormat::Text
                }
            };
        }

        config
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free for Markdown.
pub fn init_tracing(config: &CrawlerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.delay, Duration::from_millis(250));
        assert!(config.respect_robots);
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert!(config.include_metadata);
        assert_eq!(config.log_level, "doc_crawler=info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.user_agent.starts_with("doc-crawler/"));
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("No", Some(false))]
    #[case(" 1 ", Some(true))]
    #[case("maybe", None)]
    fn test_parse_bool(#[case] input: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(input), expected);
    }

    #[rstest]
    #[case("1.5", Some(Duration::from_millis(1500)))]
    #[case("0", Some(Duration::ZERO))]
    #[case("-1", None)]
    #[case("soon", None)]
    fn test_parse_seconds(#[case] input: &str, #[case] expected: Option<Duration>) {
        assert_eq!(parse_seconds(input), expected);
    }

    #[test]
    fn test_config_from_env() {
        let keys = [
            "DOC_CRAWLER_MAX_DEPTH",
            "DOC_CRAWLER_DELAY",
            "DOC_CRAWLER_RESPECT_ROBOTS",
            "DOC_CRAWLER_CONCURRENCY",
            "DOC_CRAWLER_TIMEOUT",
            "DOC_CRAWLER_LOG_FORMAT",
        ];
        let originals: Vec<_> = keys.iter().map(|key| env::var(key).ok()).collect();

        unsafe {
            env::set_var("DOC_CRAWLER_MAX_DEPTH", "4");
            env::set_var("DOC_CRAWLER_DELAY", "0.75");
            env::set_var("DOC_CRAWLER_RESPECT_ROBOTS", "false");
            env::set_var("DOC_CRAWLER_CONCURRENCY", "0");
            env::set_var("DOC_CRAWLER_TIMEOUT", "5");
            env::set_var("DOC_CRAWLER_LOG_FORMAT", "json");
        }

        let config = CrawlerConfig::from_env();

        assert_eq!(config.max_depth, 4);
        assert_eq!(config.delay, Duration::from_millis(750));
        assert!(!config.respect_robots);
        // A zero limit is rejected.
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);

        unsafe {
            for (key, original) in keys.iter().zip(originals) {
                match original {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
