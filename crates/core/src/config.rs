use directories::BaseDirs;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_LIMIT;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileConfig {
    pub history_limit: Option<usize>,
    pub ignore_duplicates: Option<bool>,
    pub enabled_by_default: Option<bool>,
    pub state_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub history_limit: usize, // 0 = unbounded
    pub ignore_duplicates: bool,
    pub enabled_by_default: bool,
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            ignore_duplicates: true,
            enabled_by_default: false,
            state_dir: Self::default_state_dir().unwrap_or_else(|| PathBuf::from(".exbar")),
        }
    }
}

impl Config {
    /// Defaults, then `config.toml`, then environment. A broken file is
    /// logged and skipped.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::read_file(&path) {
                    Ok(file_cfg) => cfg.apply(file_cfg),
                    Err(e) => warn!(target: "exbar", "ignoring config file: {}", e),
                }
            }
        }
        cfg.apply_env(|k| env::var(k).ok());
        cfg
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file_cfg = toml::from_str::<FileConfig>(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut cfg = Self::default();
        cfg.apply(file_cfg);
        Ok(cfg)
    }

    pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<FileConfig>(&raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    pub fn apply(&mut self, file_cfg: FileConfig) {
        if let Some(n) = file_cfg.history_limit {
            self.history_limit = n;
        }
        if let Some(b) = file_cfg.ignore_duplicates {
            self.ignore_duplicates = b;
        }
        if let Some(b) = file_cfg.enabled_by_default {
            self.enabled_by_default = b;
        }
        if let Some(dir) = file_cfg.state_dir {
            self.state_dir = dir;
        }
    }

    /// `EXBAR_STATE_DIR` and `EXBAR_HISTORY_LIMIT`; unparsable numbers are
    /// ignored.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, var: F) {
        if let Some(dir) = var("EXBAR_STATE_DIR").filter(|s| !s.trim().is_empty()) {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(raw) = var("EXBAR_HISTORY_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.history_limit = n,
                Err(_) => warn!(target: "exbar", "EXBAR_HISTORY_LIMIT not a number: {}", raw),
            }
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn config_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        let p = if cfg!(target_os = "windows") {
            base.home_dir().join(".exbar").join("config.toml")
        } else {
            base.config_dir().join("exbar").join("config.toml")
        };
        Some(p)
    }

    fn default_state_dir() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.data_dir().join("exbar"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let cfg = Config::from_toml_str(
            r#"
history_limit = 50
enabled_by_default = true
state_dir = "/tmp/exbar-test"
"#,
        )
        .unwrap();
        assert_eq!(cfg.history_limit, 50);
        assert!(cfg.enabled_by_default);
        assert!(cfg.ignore_duplicates);
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/exbar-test"));
        assert_eq!(cfg.log_dir(), PathBuf::from("/tmp/exbar-test/logs"));
    }

    #[test]
    fn empty_file_is_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let r = Config::from_toml_str("history_limit = \"many\"");
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| match k {
            "EXBAR_STATE_DIR" => Some("/var/tmp/exbar".to_string()),
            "EXBAR_HISTORY_LIMIT" => Some(" 0 ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.state_dir, PathBuf::from("/var/tmp/exbar"));
        assert_eq!(cfg.history_limit, 0);

        cfg.apply_env(|k| (k == "EXBAR_HISTORY_LIMIT").then(|| "lots".to_string()));
        assert_eq!(cfg.history_limit, 0);
    }

    #[test]
    fn read_file_reports_missing_and_reads_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(matches!(Config::read_file(&path), Err(ConfigError::Io { .. })));
        fs::write(&path, "ignore_duplicates = false\n").unwrap();
        let f = Config::read_file(&path).unwrap();
        assert_eq!(f.ignore_duplicates, Some(false));
        assert_eq!(f.history_limit, None);
    }
}
