//! Client of an external HGVS-to-genomic interpreter.
//!
//! The interpreter is run as `<interpreter> <script> id1 id2 ...` and must
//! print a JSON array with one record per identifier:
//!
//! ```json
//! [{ "variant": "NM_000088.3:c.589G>T", "start": 48275363, "end": 48275363, "ref": "17" },
//!  { "variant": "foo", "error": "foo is an invalid HGVS variant" }]
//! ```
//!
//! HGVS syntax itself is never parsed here.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

use crate::config::Config;
use crate::error::{LiftError, Result};
use crate::interval::Interval;

/// One converted identifier as reported by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeInterval {
    pub variant: String,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
    /// Reference sequence name, e.g. "17" or "X".
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenomeInterval {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The genomic interval of a successful record.
    pub fn interval(&self) -> Result<Interval> {
        if let Some(error) = &self.error {
            return Err(LiftError::InvalidArgument(format!(
                "{} was not converted: {error}",
                self.variant
            )));
        }
        match (&self.reference, self.start, self.end) {
            (Some(reference), Some(start), Some(end)) => {
                Interval::new(reference.as_str(), start, end)
            }
            _ => Err(LiftError::InvalidArgument(format!(
                "{} has no complete genomic interval",
                self.variant
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgvsConverter {
    pub interpreter: String,
    pub script: PathBuf,
}

impl HgvsConverter {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    /// Converter described by `hgvs_interpreter` and `hgvs_script`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let script = config.hgvs_script.clone().ok_or_else(|| {
            LiftError::InvalidArgument("hgvs_script is not configured".to_string())
        })?;
        Ok(Self::new(config.hgvs_interpreter.clone(), script))
    }

    /// Convert a batch of identifiers.
    ///
    /// Records the interpreter could not convert come back with `error` set;
    /// only a failure of the whole batch is an `Err`.
    ///
    /// # Arguments
    /// * `ids` - HGVS identifiers, at least one
    ///
    /// # Returns
    /// * One `GenomeInterval` per record printed by the interpreter
    pub fn convert(&self, ids: &[&str]) -> Result<Vec<GenomeInterval>> {
        if ids.is_empty() {
            return Err(LiftError::InvalidArgument(
                "identifiers cannot be empty".to_string(),
            ));
        }

        debug!(
            "converting {} identifiers with {} {}",
            ids.len(),
            self.interpreter,
            self.script.display()
        );
        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .args(ids)
            .output()
            .map_err(|e| {
                LiftError::Conversion(format!("could not run {}: {e}", self.interpreter))
            })?;

        if !output.status.success() {
            return Err(LiftError::Conversion(format!(
                "{} exited with {}: {}",
                self.interpreter,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Self::parse_output(&output.stdout)
    }

    /// Decode the interpreter's stdout.
    pub fn parse_output(stdout: &[u8]) -> Result<Vec<GenomeInterval>> {
        serde_json::from_slice(stdout)
            .map_err(|e| LiftError::Conversion(format!("malformed interpreter output: {e}")))
    }
}
