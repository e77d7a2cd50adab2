use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("inklet")
}

fn default_autosave_delay_secs() -> u64 {
    15
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_secs() -> u64 {
    2
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InkletConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Base URL of the document backend. Empty means offline-only.
    #[serde(default)]
    pub api_url: String,
    /// Bearer token for the backend. Absent means unauthenticated.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_autosave_delay_secs")]
    pub autosave_delay_secs: u64,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for InkletConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: String::new(),
            api_token: None,
            autosave_delay_secs: default_autosave_delay_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_secs: default_retry_base_delay_secs(),
            debug_logging: false,
        }
    }
}

impl InkletConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("inklet")
            .join("config.json")
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    /// A present-but-unreadable file is an error; silently replacing a
    /// broken config with defaults would hide a misconfigured backend.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(std::io::Error::other),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    pub fn autosave_delay(&self) -> Duration {
        // The editor range is 5-30 seconds; clamp whatever was hand-edited in.
        Duration::from_secs(self.autosave_delay_secs.clamp(5, 30))
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs(self.retry_base_delay_secs.max(1))
    }

    /// Remote sync is attempted only when both a backend and a token are
    /// configured.
    pub fn is_authenticated(&self) -> bool {
        !self.api_url.is_empty() && self.api_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = InkletConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, InkletConfig::default());
        assert!(!config.is_authenticated());
    }

    #[test]
    fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/config.json");
        let mut config = InkletConfig::default();
        config.api_url = "https://docs.example.com/api".to_string();
        config.api_token = Some("tok".to_string());
        config.save(&path).unwrap();
        let loaded = InkletConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_authenticated());
    }

    #[test]
    fn autosave_delay_is_clamped() {
        let mut config = InkletConfig::default();
        config.autosave_delay_secs = 1;
        assert_eq!(config.autosave_delay(), Duration::from_secs(5));
        config.autosave_delay_secs = 300;
        assert_eq!(config.autosave_delay(), Duration::from_secs(30));
    }
}
