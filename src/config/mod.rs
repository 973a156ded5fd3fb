use serde::{Deserialize, Serialize};

use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

const DEFAULT_GRPC_ADDR: &str = "127.0.0.1:50051";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub grpc_addr: SocketAddr,
    pub http_addr: SocketAddr,
    /// How long serve-loops get to drain after shutdown is requested.
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,
}

const fn default_shutdown_timeout() -> Duration {
    DEFAULT_SHUTDOWN_TIMEOUT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grpc_addr: SocketAddr::from(([127, 0, 0, 1], 50051)),
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let grpc_addr = env_or("NOTED_GRPC_ADDR", DEFAULT_GRPC_ADDR)
        .parse::<SocketAddr>()
        .map_err(|e| format!("Failed to parse NOTED_GRPC_ADDR: {e}"))?;

    let http_addr = env_or("NOTED_HTTP_ADDR", DEFAULT_HTTP_ADDR)
        .parse::<SocketAddr>()
        .map_err(|e| format!("Failed to parse NOTED_HTTP_ADDR: {e}"))?;

    let shutdown_timeout = match env::var("NOTED_SHUTDOWN_TIMEOUT") {
        Ok(value) => humantime_serde::re::humantime::parse_duration(&value)
            .map_err(|e| format!("Failed to parse NOTED_SHUTDOWN_TIMEOUT: {e}"))?,
        Err(_) => DEFAULT_SHUTDOWN_TIMEOUT,
    };

    Ok(Config {
        grpc_addr,
        http_addr,
        shutdown_timeout,
    })
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("NOTED_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables and defaults
    tracing::info!("No config file found, loading configuration from environment variables");
    load_from_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_with_humantime_timeout() {
        let yaml = "grpc_addr: 0.0.0.0:50051\nhttp_addr: 0.0.0.0:8080\nshutdown_timeout: 2s 500ms\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.grpc_addr, "0.0.0.0:50051".parse::<SocketAddr>().unwrap());
        assert_eq!(config.http_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.shutdown_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn timeout_defaults_when_omitted() {
        let yaml = "grpc_addr: 127.0.0.1:1\nhttp_addr: 127.0.0.1:2\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.shutdown_timeout, DEFAULT_SHUTDOWN_TIMEOUT);
    }

    #[test]
    fn default_addresses_match_env_defaults() {
        let config = Config::default();

        assert_eq!(config.grpc_addr.to_string(), DEFAULT_GRPC_ADDR);
        assert_eq!(config.http_addr.to_string(), DEFAULT_HTTP_ADDR);
    }
}
