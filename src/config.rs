// ABOUTME: Bridge configuration - reads a .mcp.json-compatible file, applies
// ABOUTME: environment overrides, and resolves the tool server to launch.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::agent::DEFAULT_SYSTEM_PROMPT;
use crate::error::ConfigError;
use crate::llm::OLLAMA_BASE_URL;
use crate::mcp::McpServerConfig;
use crate::tool::Registry;

/// File name searched for in the working directory, then the home directory.
pub const CONFIG_FILE_NAME: &str = ".toolbridge.json";

/// Name given to the built-in git tool server.
pub const DEFAULT_SERVER_NAME: &str = "git";

pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_MODEL: &str = "TOOLBRIDGE_MODEL";
pub const ENV_REPO_PATH: &str = "TOOLBRIDGE_REPO_PATH";

/// One entry under `mcpServers`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerEntry {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Everything needed to start a session.
///
/// Unset fields fall back to built-in defaults through the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    #[serde(default)]
    pub mcp_servers: BTreeMap<String, ServerEntry>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub ollama_url: Option<String>,
    #[serde(default)]
    pub repo_path: Option<PathBuf>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl BridgeConfig {
    /// Load configuration the way the CLI does.
    ///
    /// Loads `.env`, reads `explicit` or the first discovered config file,
    /// then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }

        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
                discover(&cwd, dirs::home_dir().as_deref())
            }
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = read(ENV_OLLAMA_HOST) {
            self.ollama_url = Some(url);
        }
        if let Some(model) = read(ENV_MODEL) {
            self.model = Some(model);
        }
        if let Some(path) = read(ENV_REPO_PATH) {
            self.repo_path = Some(PathBuf::from(path));
        }
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(OLLAMA_BASE_URL)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// The repository tools operate on, defaulting to the working directory.
    pub fn repo_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.repo_path {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().map_err(ConfigError::WorkingDir),
        }
    }

    /// The tool server to launch.
    ///
    /// A named `server` must exist in `mcpServers`. Otherwise the
    /// alphabetically first entry wins, and with no entries at all the
    /// built-in git server is used.
    pub fn server_config(&self) -> Result<McpServerConfig, ConfigError> {
        if let Some(name) = &self.server {
            let entry = self
                .mcp_servers
                .get(name)
                .ok_or_else(|| ConfigError::UnknownServer(name.clone()))?;
            return Ok(to_server_config(name, entry));
        }

        if let Some((name, entry)) = self.mcp_servers.iter().next() {
            return Ok(to_server_config(name, entry));
        }

        let repo = self.repo_path()?;
        Ok(McpServerConfig {
            name: DEFAULT_SERVER_NAME.to_string(),
            command: "uvx".to_string(),
            args: vec![
                "mcp-server-git".to_string(),
                "--repository".to_string(),
                repo.display().to_string(),
            ],
            env: HashMap::new(),
        })
    }

    /// An empty registry that injects this config's repo path.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let repo = self.repo_path()?;
        Ok(Registry::with_default_repo_path(repo.display().to_string()))
    }
}

fn to_server_config(name: &str, entry: &ServerEntry) -> McpServerConfig {
    McpServerConfig {
        name: name.to_string(),
        command: entry.command.clone(),
        args: entry.args.clone(),
        env: entry.env.clone(),
    }
}

/// Find a config file in `cwd`, then in `home`.
pub fn discover(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(cwd)
        .chain(home)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}
