//! Server configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening address
    /// Env: FOLIO_HOST
    /// Default: "127.0.0.1"
    pub host: String,

    /// Listening port
    /// Env: FOLIO_PORT
    /// Default: 8080
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    pub fn merge(&mut self, other: Self) {
        self.host = other.host;
        self.port = other.port;
    }

    pub(crate) fn apply_env(&mut self, var: &impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("FOLIO_HOST") {
            self.host = host;
        }
        if let Some(port) = var("FOLIO_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => log::warn!("ignoring FOLIO_PORT={}: not a port number", port),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: port must be between 1 and 65535");
        }
        if self.host.trim().is_empty() {
            bail!("Invalid host: host cannot be empty");
        }
        Ok(())
    }

    /// `host:port`, as accepted by `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let cfg = ServerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_port_rejected() {
        let cfg = ServerConfig { port: 0, ..Default::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("Invalid port"));
    }

    #[test]
    fn test_empty_host_rejected() {
        let cfg = ServerConfig { host: " ".to_string(), ..Default::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("Invalid host"));
    }

    #[test]
    fn test_ipv6_bind_addr() {
        let cfg = ServerConfig { host: "::1".to_string(), port: 3000 };
        assert_eq!(cfg.bind_addr(), "[::1]:3000");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("FOLIO_HOST", "0.0.0.0"), ("FOLIO_PORT", "9000")].into();
        let mut cfg = ServerConfig::default();
        cfg.apply_env(&|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg, ServerConfig { host: "0.0.0.0".to_string(), port: 9000 });
    }

    #[test]
    fn test_bad_env_port_is_ignored() {
        let mut cfg = ServerConfig::default();
        cfg.apply_env(&|k| (k == "FOLIO_PORT").then(|| "eighty".to_string()));
        assert_eq!(cfg.port, 8080);
    }
}
