//! Environment configuration

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served for every non-API path
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `STATIC_DIR`, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = match lookup("HOST").filter(|v| !v.trim().is_empty()) {
            Some(v) => v.trim().parse().with_context(|| format!("invalid HOST: {}", v))?,
            None => defaults.host,
        };
        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(v) => v.trim().parse().with_context(|| format!("invalid PORT: {}", v))?,
            None => defaults.port,
        };
        let static_dir = lookup("STATIC_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        Ok(Self { host, port, static_dir })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "4100"),
            ("STATIC_DIR", "demos/sample-app/public"),
        ]))
        .unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:4100");
        assert_eq!(config.static_dir, PathBuf::from("demos/sample-app/public"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("invalid PORT"));
    }
}
