//! Harness configuration
//!
//! Defaults reproduce the assignment's fixed conventions (backend on
//! `localhost:3000`, started with `node server/server.js`, frontend under
//! `public/`). A `crudcheck.toml` in the project root, or one passed with
//! `--config`, overrides any of them; command-line flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::http::DEFAULT_REQUEST_TIMEOUT;
use crate::scenarios::Group;
use crate::server::ServerConfig;

pub const CONFIG_FILE_NAME: &str = "crudcheck.toml";

/// Where the project keeps the files the static scenarios inspect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub server_entry: PathBuf,
    pub index_html: PathBuf,
    pub stylesheet: PathBuf,
    pub app_script: PathBuf,
    pub package_json: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            server_entry: PathBuf::from("server/server.js"),
            index_html: PathBuf::from("public/index.html"),
            stylesheet: PathBuf::from("public/css/styles.css"),
            app_script: PathBuf::from("public/js/app.js"),
            package_json: PathBuf::from("package.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root of the project under test
    pub project_root: PathBuf,

    pub layout: ProjectLayout,

    pub server: ServerConfig,

    /// Bound on every API request
    pub request_timeout_ms: u64,

    /// Only run these groups (empty = all)
    pub groups: Vec<Group>,

    /// Only run scenarios with these names (empty = all)
    pub names: Vec<String>,

    /// Write the results summary here as JSON
    pub output: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            layout: ProjectLayout::default(),
            server: ServerConfig::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            groups: Vec::new(),
            names: Vec::new(),
            output: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative `project_root` is resolved against the file's directory.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;

        if config.project_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.project_root = base.join(&config.project_root);
        }
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `crudcheck.toml` from the project root when present, else defaults
    pub fn discover(project_root: &Path) -> HarnessResult<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self {
                project_root: project_root.to_path_buf(),
                ..Self::default()
            })
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.server.command.is_empty() {
            return Err(HarnessError::Config("server.command must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(HarnessError::Config("request_timeout_ms must be positive".to_string()));
        }
        if !self.server.health_path.starts_with('/') {
            return Err(HarnessError::Config(format!(
                "server.health_path must start with '/': {}",
                self.server.health_path
            )));
        }
        if !self.project_root.is_dir() {
            return Err(HarnessError::Config(format!(
                "project root is not a directory: {}",
                self.project_root.display()
            )));
        }
        Ok(())
    }
}
