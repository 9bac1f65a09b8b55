//! Runtime configuration for chain acquisition and parsing.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! changes:
//!
//! ```json
//! { "cache_dir": "/scratch/chains", "timeout_secs": 60, "parse_mode": "lenient" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LiftError, Result};
use crate::io::reader::ParseMode;

/// Environment variable overriding the bundled resource directory.
pub const RESOURCES_ENV: &str = "CHAINLIFT_RESOURCES";

/// Host serving the UCSC `goldenPath` tree.
pub const UCSC_HOST: &str = "hgdownload.cse.ucsc.edu";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root holding `chains/<build>/...` resources.
    pub resource_dir: PathBuf,
    /// Where downloaded chain files are kept.
    pub cache_dir: PathBuf,
    pub remote_host: String,
    /// Network timeout for a download; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub parse_mode: ParseMode,
    pub hgvs_interpreter: String,
    pub hgvs_script: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_dir: default_resource_dir(),
            cache_dir: std::env::temp_dir(),
            remote_host: UCSC_HOST.to_string(),
            timeout_secs: Some(300),
            parse_mode: ParseMode::Strict,
            hgvs_interpreter: "python".to_string(),
            hgvs_script: None,
        }
    }
}

fn default_resource_dir() -> PathBuf {
    std::env::var_os(RESOURCES_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("resources"))
}

impl Config {
    /// Load a configuration from a JSON file; missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LiftError::NotFound(path.to_path_buf()),
            _ => LiftError::io(path, e),
        })?;
        let config: Config = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            LiftError::InvalidArgument(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.remote_host.trim().is_empty() {
            return Err(LiftError::InvalidArgument(
                "remote_host cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(LiftError::InvalidArgument(
                "timeout_secs must be positive; use null to disable it".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_secs = timeout.map(|d| d.as_secs().max(1));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.remote_host, UCSC_HOST);
        assert_eq!(config.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chainlift.json");
        std::fs::write(
            &path,
            r#"{ "cache_dir": "/scratch/chains", "timeout_secs": null, "parse_mode": "lenient" }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/scratch/chains"));
        assert_eq!(config.timeout(), None);
        assert_eq!(config.parse_mode, ParseMode::Lenient);
        assert_eq!(config.remote_host, UCSC_HOST);
    }

    #[test]
    fn rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path().join("absent.json")),
            Err(LiftError::NotFound(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "timeout_secs": 0 }"#).unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(LiftError::InvalidArgument(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(LiftError::InvalidArgument(_))
        ));
    }
}
