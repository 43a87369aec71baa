// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use rune_cfg::RuneConfig;

use super::Config;
use crate::sdebug;

/// Reads `chatimer:` keys from a rune file on top of `defaults`.
/// Missing keys keep their default; dashed spellings are accepted too.
pub fn parse_file(path: &Path, defaults: Config) -> Result<Config> {
    let rune = RuneConfig::from_file(path)
        .map_err(|e| eyre!("failed to load config from {}: {}", path.display(), e))?;

    sdebug!("Config", "Loaded config from: {}", path.display());
    Ok(parse_rune(&rune, defaults))
}

fn parse_rune(rune: &RuneConfig, defaults: Config) -> Config {
    let event_log = get_string(rune, "event_log")
        .map(|s| expand_tilde(&s))
        .unwrap_or(defaults.event_log);

    let diagnostic_log = get_string(rune, "diagnostic_log")
        .map(|s| expand_tilde(&s))
        .unwrap_or(defaults.diagnostic_log);

    let socket = get_string(rune, "socket")
        .map(|s| expand_tilde(&s))
        .unwrap_or(defaults.socket);

    let verbose = rune
        .get::<bool>("chatimer.verbose")
        .unwrap_or(defaults.verbose);

    Config {
        event_log,
        diagnostic_log,
        socket,
        verbose,
    }
}

fn get_string(rune: &RuneConfig, key: &str) -> Option<String> {
    let underscored = format!("chatimer.{}", key);
    rune.get::<String>(&underscored)
        .or_else(|_| rune.get::<String>(&underscored.replace('_', "-")))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~/timers.log"), home.join("timers.log"));
        assert_eq!(expand_tilde("~"), home);
    }

    #[test]
    fn other_paths_are_kept() {
        assert_eq!(expand_tilde("/var/log/t.log"), PathBuf::from("/var/log/t.log"));
        assert_eq!(expand_tilde("rel/~x"), PathBuf::from("rel/~x"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = parse_file(&dir.path().join("absent.rune"), Config::default());
        assert!(res.is_err());
    }
}
