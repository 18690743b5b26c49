use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the discovery service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub reporting: ReportingConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then the `APP_*` process variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).map(String::as_str);

        let environment = var("APP_ENV")
            .map(AppEnvironment::parse)
            .unwrap_or(AppEnvironment::Development);

        let host = var("APP_HOST").unwrap_or(DEFAULT_HOST).to_string();
        let port = match var("APP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                value: raw.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let log_level = var("APP_LOG_LEVEL").unwrap_or(DEFAULT_LOG_LEVEL).to_string();
        let report_issues = var("APP_REPORT_ISSUES")
            .map(|raw| parse_flag("APP_REPORT_ISSUES", raw))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            reporting: ReportingConfig { report_issues },
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

/// HTTP binding for the discovery API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Whether transform responses carry the normalisation issue list by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportingConfig {
    pub report_issues: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
    InvalidFlag {
        name: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT must be a port number, got '{}'", value)
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "APP_HOST '{}' is not an IPv4 or IPv6 address", value)
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{} must be true or false, got '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_vars(&HashMap::new()).expect("config builds");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.reporting.report_issues);
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let config = AppConfig::from_vars(&vars(&[("APP_HOST", "localhost"), ("APP_PORT", "8080")]))
            .expect("config builds");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
    }

    #[test]
    fn hostnames_are_rejected_with_the_value() {
        let config = AppConfig::from_vars(&vars(&[("APP_HOST", "discovery.internal")]))
            .expect("config builds");
        let error = config.server.socket_addr().expect_err("hostname is not an ip");
        assert!(error.to_string().contains("discovery.internal"));
    }

    #[test]
    fn invalid_port_is_reported() {
        let error = AppConfig::from_vars(&vars(&[("APP_PORT", "seventy")]))
            .expect_err("port must be numeric");
        assert!(matches!(error, ConfigError::InvalidPort { value } if value == "seventy"));
    }

    #[test]
    fn report_issues_flag_parses_common_spellings() {
        let config = AppConfig::from_vars(&vars(&[
            ("APP_REPORT_ISSUES", "Yes"),
            ("APP_ENV", "production"),
        ]))
        .expect("config builds");
        assert!(config.reporting.report_issues);
        assert_eq!(config.environment, AppEnvironment::Production);

        let error = AppConfig::from_vars(&vars(&[("APP_REPORT_ISSUES", "sometimes")]))
            .expect_err("flag must be boolean");
        assert!(error.to_string().contains("APP_REPORT_ISSUES"));
    }

    #[test]
    fn load_reads_process_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        env::set_var("APP_LOG_LEVEL", "debug");
        let config = AppConfig::load().expect("config loads");
        env::remove_var("APP_LOG_LEVEL");
        assert_eq!(config.telemetry.log_level, "debug");
    }
}
