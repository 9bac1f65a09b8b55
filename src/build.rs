//! Genome builds with chain files in the resource bundle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LiftError;

/// A supported human reference assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenomeBuild {
    Hg17,
    Hg18,
    Hg19,
    Hg38,
}

/// Directions for which a chain file has historically been bundled.
pub const BUNDLED_DIRECTIONS: [(GenomeBuild, GenomeBuild); 9] = [
    (GenomeBuild::Hg17, GenomeBuild::Hg18),
    (GenomeBuild::Hg17, GenomeBuild::Hg19),
    (GenomeBuild::Hg18, GenomeBuild::Hg17),
    (GenomeBuild::Hg18, GenomeBuild::Hg19),
    (GenomeBuild::Hg18, GenomeBuild::Hg38),
    (GenomeBuild::Hg19, GenomeBuild::Hg17),
    (GenomeBuild::Hg19, GenomeBuild::Hg18),
    (GenomeBuild::Hg19, GenomeBuild::Hg38),
    (GenomeBuild::Hg38, GenomeBuild::Hg19),
];

impl GenomeBuild {
    pub const ALL: [GenomeBuild; 4] = [
        GenomeBuild::Hg17,
        GenomeBuild::Hg18,
        GenomeBuild::Hg19,
        GenomeBuild::Hg38,
    ];

    /// Canonical name, e.g. "hg19".
    pub fn name(&self) -> &'static str {
        match self {
            GenomeBuild::Hg17 => "hg17",
            GenomeBuild::Hg18 => "hg18",
            GenomeBuild::Hg19 => "hg19",
            GenomeBuild::Hg38 => "hg38",
        }
    }

    /// Numeric version, e.g. 19.
    pub fn version(&self) -> u32 {
        match self {
            GenomeBuild::Hg17 => 17,
            GenomeBuild::Hg18 => 18,
            GenomeBuild::Hg19 => 19,
            GenomeBuild::Hg38 => 38,
        }
    }

    /// Relative resource path of the chain file lifting `self` to `to`.
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::GenomeBuild;
    ///
    /// let path = GenomeBuild::Hg19.chain_resource(GenomeBuild::Hg38);
    /// assert_eq!(path, "chains/hg19/hg19Tohg38.over.chain");
    /// ```
    pub fn chain_resource(&self, to: GenomeBuild) -> String {
        format!(
            "chains/{}/hg{}Tohg{}.over.chain",
            self.name(),
            self.version(),
            to.version()
        )
    }

    /// Whether `self -> to` is one of the historically bundled directions.
    pub fn is_bundled_direction(&self, to: GenomeBuild) -> bool {
        BUNDLED_DIRECTIONS.contains(&(*self, to))
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GenomeBuild {
    type Err = LiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenomeBuild::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LiftError::InvalidArgument(format!("unknown genome build: {s:?}")))
    }
}

/// The source or target label of a chain file.
///
/// Registered builds are kept typed; anything else (other species, patch
/// releases) is carried as a free-form label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildLabel {
    Known(GenomeBuild),
    Custom(String),
}

impl BuildLabel {
    /// Build a label from free text, recognising registered builds.
    pub fn new(label: &str) -> Result<Self, LiftError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LiftError::InvalidArgument(
                "build label cannot be empty".to_string(),
            ));
        }
        Ok(label
            .parse::<GenomeBuild>()
            .map(BuildLabel::Known)
            .unwrap_or_else(|_| BuildLabel::Custom(label.to_string())))
    }

    pub fn name(&self) -> &str {
        match self {
            BuildLabel::Known(b) => b.name(),
            BuildLabel::Custom(s) => s,
        }
    }
}

impl From<GenomeBuild> for BuildLabel {
    fn from(build: GenomeBuild) -> Self {
        BuildLabel::Known(build)
    }
}

impl fmt::Display for BuildLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
