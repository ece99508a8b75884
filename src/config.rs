//! Server configuration
//!
//! Built once at startup from environment variables and passed down
//! explicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RdfError, RdfResult};

pub const DEFAULT_MEMORY_FILE: &str = "rdf-store.ttl";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Settings for the completion endpoint used by `/chat`
#[derive(Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backing file of the graph store
    pub memory_file_path: PathBuf,
    /// Directory used by the file tools
    pub data_dir: PathBuf,
    /// Directory served under `/src`
    pub assets_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub chat: ChatConfig,
}

impl Config {
    /// Defaults rooted at `base_dir`
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            memory_file_path: base_dir.join(DEFAULT_MEMORY_FILE),
            data_dir: base_dir.to_path_buf(),
            assets_dir: base_dir.join("src"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            chat: ChatConfig::default(),
        }
    }

    /// Read the process environment; relative paths resolve against the
    /// working directory
    pub fn from_env() -> RdfResult<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> RdfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let resolve = |value: String| {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                cwd.join(path)
            }
        };

        let mut config = Self::with_base_dir(cwd);

        if let Some(path) = get("MEMORY_FILE_PATH") {
            config.memory_file_path = resolve(path);
        }
        if let Some(dir) = get("RDF_DATA_DIR") {
            config.data_dir = resolve(dir);
        }
        if let Some(dir) = get("RDF_ASSETS_DIR") {
            config.assets_dir = resolve(dir);
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .map_err(|_| RdfError::invalid(format!("PORT must be a port number, got '{}'", port)))?;
        }
        if let Some(base_url) = get("CHAT_BASE_URL") {
            config.chat.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.chat.api_key = get("CHAT_API_KEY");
        if let Some(model) = get("CHAT_MODEL") {
            config.chat.model = model;
        }

        Ok(config)
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
