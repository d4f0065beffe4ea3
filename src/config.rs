//! Service configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub spellcheck: SpellcheckConfig,
}

/// Daemon/service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Unix socket path override; None uses the runtime-dir default
    pub socket_path: Option<PathBuf>,
    /// Per-stage deadline in milliseconds
    pub stage_timeout_ms: u64,
}

/// Spellchecker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SpellcheckConfig {
    /// Frequency dictionary path (word frequency per line). None disables
    /// dictionary-backed correction.
    pub dictionary_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            stage_timeout_ms: 30_000,
        }
    }
}

impl ServiceConfig {
    /// The per-stage deadline as a duration.
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_millis(self.stage_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file does
    /// not exist. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TTSFRONT_SOCKET → service.socket_path
    /// - TTSFRONT_STAGE_TIMEOUT_MS → service.stage_timeout_ms
    /// - TTSFRONT_SPELL_DICT → spellcheck.dictionary_path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(socket) = std::env::var("TTSFRONT_SOCKET")
            && !socket.is_empty()
        {
            self.service.socket_path = Some(PathBuf::from(socket));
        }

        if let Ok(timeout) = std::env::var("TTSFRONT_STAGE_TIMEOUT_MS")
            && let Ok(ms) = timeout.parse::<u64>()
            && ms > 0
        {
            self.service.stage_timeout_ms = ms;
        }

        if let Ok(dict) = std::env::var("TTSFRONT_SPELL_DICT")
            && !dict.is_empty()
        {
            self.spellcheck.dictionary_path = Some(PathBuf::from(dict));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/ttsfront/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ttsfront")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_ttsfront_env() {
        remove_env("TTSFRONT_SOCKET");
        remove_env("TTSFRONT_STAGE_TIMEOUT_MS");
        remove_env("TTSFRONT_SPELL_DICT");
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.service.socket_path, None);
        assert_eq!(config.service.stage_timeout_ms, 30_000);
        assert_eq!(config.service.stage_timeout(), Duration::from_secs(30));
        assert_eq!(config.spellcheck.dictionary_path, None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [service]
            socket_path = "/run/ttsfront/api.sock"
            stage_timeout_ms = 5000

            [spellcheck]
            dictionary_path = "/usr/share/ttsfront/is-freq.txt"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(
            config.service.socket_path,
            Some(PathBuf::from("/run/ttsfront/api.sock"))
        );
        assert_eq!(config.service.stage_timeout_ms, 5000);
        assert_eq!(
            config.spellcheck.dictionary_path,
            Some(PathBuf::from("/usr/share/ttsfront/is-freq.txt"))
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
            [service]
            stage_timeout_ms = 1000
        "#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.service.stage_timeout_ms, 1000);
        assert_eq!(config.service.socket_path, None);
        assert_eq!(config.spellcheck.dictionary_path, None);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not [ valid toml").unwrap();
        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"broken = [").unwrap();
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_ttsfront_env();

        set_env("TTSFRONT_SOCKET", "/tmp/override.sock");
        set_env("TTSFRONT_STAGE_TIMEOUT_MS", "1234");
        let config = Config::default().with_env_overrides();
        assert_eq!(
            config.service.socket_path,
            Some(PathBuf::from("/tmp/override.sock"))
        );
        assert_eq!(config.service.stage_timeout_ms, 1234);

        clear_ttsfront_env();
    }

    #[test]
    fn test_env_overrides_ignore_invalid_timeout() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_ttsfront_env();

        set_env("TTSFRONT_STAGE_TIMEOUT_MS", "not-a-number");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.service.stage_timeout_ms, 30_000);

        set_env("TTSFRONT_STAGE_TIMEOUT_MS", "0");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.service.stage_timeout_ms, 30_000);

        clear_ttsfront_env();
    }

    #[test]
    fn test_env_overrides_empty_socket_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_ttsfront_env();

        set_env("TTSFRONT_SOCKET", "");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.service.socket_path, None);

        clear_ttsfront_env();
    }
}
