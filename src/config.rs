use std::num::NonZeroUsize;
use std::path::Path;

use crate::error::Error;

/// Default maximum source file size (16 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Binder configuration loaded from `.bpbind.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keep parsed documents between bind attempts, keyed by path and mtime.
    pub cache: bool,
    /// File extensions parsed with the C# grammar, without the leading dot.
    pub extensions: Vec<String>,
    /// Files larger than this fail to bind instead of being parsed.
    pub max_file_size: u64,
    /// Worker threads for batch binding.
    pub workers: NonZeroUsize,
}

/// Raw TOML structure for `.bpbind.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct BpbindTomlConfig {
    /// Parse cache toggle.
    cache: Option<bool>,
    /// C# file extensions.
    extensions: Option<Vec<String>>,
    /// Size limit in bytes.
    max_file_size: Option<u64>,
    /// Batch worker count.
    workers: Option<NonZeroUsize>,
}

impl Config {
    /// Load config from `.bpbind.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".bpbind.toml");
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML content, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: BpbindTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let extensions = raw
            .extensions
            .map(|exts| {
                return exts
                    .into_iter()
                    .map(|e| return e.trim_start_matches('.').to_string())
                    .collect();
            })
            .unwrap_or(defaults.extensions);

        return Ok(Self {
            cache: raw.cache.unwrap_or(defaults.cache),
            extensions,
            max_file_size: raw.max_file_size.unwrap_or(defaults.max_file_size),
            workers: raw.workers.unwrap_or(defaults.workers),
        });
    }
}

impl Default for Config {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        return Self {
            cache: true,
            extensions: vec!["cs".to_string(), "csx".to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.cache);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("extensions = [\".cs\", \"cake\"]\nworkers = 2\n").unwrap();
        assert_eq!(config.extensions, vec!["cs".to_string(), "cake".to_string()]);
        assert_eq!(config.workers.get(), 2);
        assert!(config.cache);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".bpbind.toml"), "cache = \"yes\"").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("cahce = false").is_err());
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Config::parse("workers = 0").is_err());
    }
}
