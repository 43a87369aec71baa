// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use eyre::Result;

pub mod parser;

const FILE_NAME: &str = "chatimer.rune";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append-only start/stop log.
    pub event_log: PathBuf,
    /// Operational log of the daemon itself.
    pub diagnostic_log: PathBuf,
    pub socket: PathBuf,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        let event_log = dirs::data_dir()
            .map(|p| p.join("chatimer").join("timers.log"))
            .unwrap_or_else(|| PathBuf::from("timers.log"));

        let diagnostic_log = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("chatimer")
            .join("chatimer.log");

        Self {
            event_log,
            diagnostic_log,
            socket: crate::ipc::default_socket_path(),
            verbose: false,
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub cfg: Config,
    /// File the config came from; `None` means built-in defaults.
    pub path: Option<PathBuf>,
}

/// Candidate locations, most specific first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("chatimer").join(FILE_NAME));
    }
    paths.push(PathBuf::from("/etc/chatimer").join(FILE_NAME));
    paths
}

/// Loads `explicit` if given (it must exist), else the first existing
/// default location, else built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let cfg = parser::parse_file(path, Config::default())?;
        return Ok(LoadedConfig {
            cfg,
            path: Some(path.to_path_buf()),
        });
    }

    load_first_existing(&default_config_paths())
}

fn load_first_existing(candidates: &[PathBuf]) -> Result<LoadedConfig> {
    match candidates.iter().find(|p| p.exists()) {
        Some(path) => Ok(LoadedConfig {
            cfg: parser::parse_file(path, Config::default())?,
            path: Some(path.clone()),
        }),
        None => Ok(LoadedConfig {
            cfg: Config::default(),
            path: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_first_existing(&[dir.path().join("nope.rune")]).unwrap();

        assert!(loaded.path.is_none());
        assert_eq!(loaded.cfg, Config::default());
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.rune"))).is_err());
    }

    #[test]
    fn defaults_point_into_chatimer_dirs() {
        let cfg = Config::default();
        assert!(cfg.event_log.ends_with("timers.log"));
        assert!(cfg.diagnostic_log.ends_with("chatimer/chatimer.log"));
        assert!(cfg.socket.ends_with("chatimer/chatimer.sock"));
        assert!(!cfg.verbose);
    }
}
