use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DB_PATH: &str = "messagely.db";
pub const DEFAULT_MAX_BODY_LEN: usize = 4096;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Upper bound on message body length, in characters.
    pub max_body_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            max_body_len: DEFAULT_MAX_BODY_LEN,
        }
    }
}

impl Config {
    /// Reads `MESSAGELY_*` variables, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("MESSAGELY_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();

        let max_body_len = match lookup("MESSAGELY_MAX_BODY_LEN") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MESSAGELY_MAX_BODY_LEN is not a number: {raw:?}"))?,
            None => DEFAULT_MAX_BODY_LEN,
        };

        Ok(Self {
            db_path,
            max_body_len,
        })
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
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.max_body_len, DEFAULT_MAX_BODY_LEN);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("MESSAGELY_DB_PATH", "/var/lib/messagely/data.db"),
            ("MESSAGELY_MAX_BODY_LEN", "280"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/messagely/data.db"));
        assert_eq!(config.max_body_len, 280);
    }

    #[test]
    fn rejects_non_numeric_body_limit() {
        let err = Config::from_lookup(lookup_from(&[("MESSAGELY_MAX_BODY_LEN", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("MESSAGELY_MAX_BODY_LEN"));
    }
}
