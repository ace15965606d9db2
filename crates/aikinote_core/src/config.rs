//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the AikiNote backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_body_size: usize,
    pub allow_public_access: bool,
    /// Raw `BIND` override; validated by the server.
    pub bind: Option<String>,
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn home_dir_from<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(home) = non_empty("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Some(profile) = non_empty("USERPROFILE") {
        return Some(PathBuf::from(profile));
    }
    if let (Some(drive), Some(path)) = (non_empty("HOMEDRIVE"), non_empty("HOMEPATH")) {
        return Some(PathBuf::from(format!("{}{}", drive, path)));
    }
    env::current_dir().ok()
}

fn expand_tilde_with(path: String, home: Option<PathBuf>) -> String {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path,
    }
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Recognized keys: `DB_PATH`, `PORT`, `MAX_BODY_SIZE`,
    /// `ALLOW_PUBLIC_ACCESS`, `BIND`. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = home_dir_from(&lookup);
        let db_path = match lookup("DB_PATH").filter(|value| !value.trim().is_empty()) {
            Some(path) => expand_tilde_with(path, home),
            None => home
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
                .join("aikinote")
                .join("db")
                .to_string_lossy()
                .to_string(),
        };

        let port = lookup("PORT")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_body_size = lookup("MAX_BODY_SIZE")
            .and_then(|value| value.trim().parse().ok())
            .filter(|size: &usize| *size > 0)
            .unwrap_or(DEFAULT_MAX_BODY_SIZE);
        let allow_public_access = lookup("ALLOW_PUBLIC_ACCESS")
            .and_then(|value| parse_env_flag(&value))
            .unwrap_or(false);
        let bind = lookup("BIND")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            db_path,
            port,
            max_body_size,
            allow_public_access,
            bind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_env_flag_accepts_truthy_and_falsy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
        for value in ["", "0", "false", " no ", "OFF"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
        assert_eq!(parse_env_flag("maybe"), None);
    }

    #[test]
    fn defaults_apply_when_keys_are_missing() {
        let config = Config::from_lookup(lookup_from(&[("HOME", "/home/sensei")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert!(!config.allow_public_access);
        assert_eq!(config.bind, None);
        assert_eq!(
            PathBuf::from(config.db_path),
            PathBuf::from("/home/sensei/.cache/aikinote/db")
        );
    }

    #[test]
    fn explicit_values_override_defaults_and_expand_tilde() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOME", "/home/sensei"),
            ("DB_PATH", "~/dojo/db"),
            ("PORT", "4040"),
            ("MAX_BODY_SIZE", "2048"),
            ("ALLOW_PUBLIC_ACCESS", "yes"),
            ("BIND", " 0.0.0.0:4040 "),
        ]));
        assert_eq!(
            PathBuf::from(config.db_path),
            PathBuf::from("/home/sensei/dojo/db")
        );
        assert_eq!(config.port, 4040);
        assert_eq!(config.max_body_size, 2048);
        assert!(config.allow_public_access);
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:4040"));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOME", "/home/sensei"),
            ("PORT", "not-a-port"),
            ("MAX_BODY_SIZE", "0"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }
}
