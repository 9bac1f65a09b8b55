//! Where a chain file comes from and how its bytes are reached.
//!
//! A [`ChainFile`] is a source tag, a backing (a path on disk or an in-memory
//! buffer) and the pair of build labels it lifts between. It is read-only
//! once built; parsing happens on demand through [`ChainFile::parse`].

use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::build::{BuildLabel, GenomeBuild};
use crate::cmap::map::ChainMap;
use crate::config::Config;
use crate::error::{LiftError, Result};
use crate::io::fetch;
use crate::io::reader::{ParseMode, Reader};

/// How a chain file was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSource {
    /// Shipped in the resource directory.
    Bundled,
    /// A caller-supplied file.
    LocalPath,
    /// A caller-supplied buffer.
    Memory,
    /// Downloaded into the cache directory.
    Remote { url: String },
}

enum Backing {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl fmt::Debug for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backing::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Backing::Memory(b) => write!(f, "Memory({} bytes)", b.len()),
        }
    }
}

#[derive(Debug)]
pub struct ChainFile {
    source: ChainSource,
    backing: Backing,
    from: BuildLabel,
    to: BuildLabel,
}

impl ChainFile {
    /// The bundled chain file lifting `from` to `to`.
    ///
    /// # Arguments
    /// * `from` - Source build
    /// * `to` - Target build
    /// * `config` - Supplies the resource directory
    ///
    /// # Returns
    /// * `NotFound` when the bundle has no file for this direction
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::{ChainFile, Config, GenomeBuild, LiftError};
    ///
    /// let config = Config::default();
    /// let missing = ChainFile::bundled(GenomeBuild::Hg38, GenomeBuild::Hg17, &config);
    /// assert!(matches!(missing, Err(LiftError::NotFound(_))));
    /// ```
    pub fn bundled(from: GenomeBuild, to: GenomeBuild, config: &Config) -> Result<Self> {
        let path = config.resource_dir.join(from.chain_resource(to));
        if !path.is_file() {
            return Err(LiftError::NotFound(path));
        }
        debug!("using bundled {from} to {to} chain at {}", path.display());
        Ok(Self {
            source: ChainSource::Bundled,
            backing: Backing::Path(path),
            from: from.into(),
            to: to.into(),
        })
    }

    /// A chain file at an arbitrary local path.
    pub fn from_path<P: AsRef<Path>>(path: P, from: &str, to: &str) -> Result<Self> {
        let (from, to) = labels(from, to)?;
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LiftError::NotFound(path.to_path_buf()));
        }
        Ok(Self {
            source: ChainSource::LocalPath,
            backing: Backing::Path(path.to_path_buf()),
            from,
            to,
        })
    }

    /// Chain text (plain or gzip) already held in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, from: &str, to: &str) -> Result<Self> {
        let (from, to) = labels(from, to)?;
        Ok(Self {
            source: ChainSource::Memory,
            backing: Backing::Memory(bytes.into()),
            from,
            to,
        })
    }

    /// Download a chain file into `config.cache_dir`.
    ///
    /// The cached file outlives this value unless [`ChainFile::release`] is
    /// called.
    pub fn from_remote(url: &str, from: &str, to: &str, config: &Config) -> Result<Self> {
        let (from, to) = labels(from, to)?;
        let path = fetch::download(url, config)?;
        Ok(Self {
            source: ChainSource::Remote {
                url: url.to_string(),
            },
            backing: Backing::Path(path),
            from,
            to,
        })
    }

    /// Download `file_name` from the UCSC liftOver directory of `build_from`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chainlift::{ChainFile, Config};
    ///
    /// let config = Config::default();
    /// let chain = ChainFile::from_ucsc("hg38", "hg19", "hg38ToHg19.over.chain.gz", &config)?;
    /// let chains = chain.parse(config.parse_mode)?;
    /// println!("{} chains", chains.len());
    /// chain.release()?;
    /// # Ok::<(), chainlift::LiftError>(())
    /// ```
    pub fn from_ucsc(
        build_from: &str,
        build_to: &str,
        file_name: &str,
        config: &Config,
    ) -> Result<Self> {
        let url = fetch::ucsc_url(&config.remote_host, build_from, file_name);
        Self::from_remote(&url, build_from, build_to, config)
    }

    pub fn source(&self) -> &ChainSource {
        &self.source
    }

    /// Backing path, if the content lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Path(p) => Some(p),
            Backing::Memory(_) => None,
        }
    }

    /// Whether the backing content is still reachable.
    pub fn exists(&self) -> bool {
        match &self.backing {
            Backing::Path(p) => p.is_file(),
            Backing::Memory(_) => true,
        }
    }

    /// Raw content, gunzipped if compressed.
    pub fn read(&self) -> Result<Vec<u8>> {
        match &self.backing {
            Backing::Path(p) => Reader::open(p),
            Backing::Memory(b) => Reader::gunzip(b.clone(), Path::new("<memory>")),
        }
    }

    /// Source and target labels, in lifting order.
    pub fn builds(&self) -> (&BuildLabel, &BuildLabel) {
        (&self.from, &self.to)
    }

    pub fn from_build(&self) -> &BuildLabel {
        &self.from
    }

    pub fn to_build(&self) -> &BuildLabel {
        &self.to
    }

    /// Parse the content into a [`ChainMap`].
    pub fn parse(&self, mode: ParseMode) -> Result<ChainMap> {
        match &self.backing {
            Backing::Path(p) => Reader::from_file_with(p, mode),
            Backing::Memory(_) => Reader::parse(&self.read()?, mode),
        }
    }

    /// Dispose of the chain file.
    ///
    /// A downloaded cache file is deleted; bundled, local and in-memory
    /// sources are left untouched.
    pub fn release(self) -> Result<()> {
        match (&self.source, &self.backing) {
            (ChainSource::Remote { .. }, Backing::Path(p)) => match std::fs::remove_file(p) {
                Ok(()) => {
                    debug!("removed cached chain {}", p.display());
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(LiftError::io(p, e)),
            },
            _ => Ok(()),
        }
    }
}

fn labels(from: &str, to: &str) -> Result<(BuildLabel, BuildLabel)> {
    Ok((BuildLabel::new(from)?, BuildLabel::new(to)?))
}
