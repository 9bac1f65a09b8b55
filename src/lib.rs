//!
//! 'chainlift' maps genomic intervals between reference assemblies (e.g. hg19 to hg38)
//! through UCSC alignment chain files.
//!
//! This crate provides three main entries:
//!
//! 1. [`LiftOver`], the validated liftover façade over one chain file.
//! 2. [`ChainFile`] for obtaining chain files from the resource bundle, a local path,
//!    a memory buffer or a remote URL.
//! 3. `Reader`, `Writer` and [`ChainMap`] for parsing, indexing and re-writing chain files.
//!
//! ## Lifting intervals
//!
//! Coordinates given to and returned by [`LiftOver`] are 1-based and inclusive. An interval
//! is lifted through the chain that aligns the largest fraction of its bases (ties go to the
//! higher score), and only if that fraction reaches the requested minimum match, 1.0 by
//! default. Anything else is a [`LiftError::LiftOverFailed`].
//!
//! # Examples
//! ```rust
//! use chainlift::{Config, GenomeBuild, LiftOver};
//!
//! let lift = LiftOver::from_builds(GenomeBuild::Hg19, GenomeBuild::Hg38, &Config::default())?;
//! let lifted = lift.lift_over("chr1", 743267, 743268)?;
//! assert_eq!((lifted.start, lifted.end), (807887, 807888));
//! # Ok::<(), chainlift::LiftError>(())
//! ```
//!
//! ## Chain files from elsewhere
//!
//! Any chain file can back a [`LiftOver`]. Downloaded files are cached under
//! [`Config::cache_dir`] until [`ChainFile::release`] is called.
//!
//! # Examples
//! ```rust,no_run
//! use chainlift::{ChainFile, Config, LiftOver};
//!
//! let config = Config::default();
//! let chain = ChainFile::from_ucsc("hg38", "hg19", "hg38ToHg19.over.chain.gz", &config)?;
//! let lift = LiftOver::with_mode(chain, config.parse_mode)?;
//! let lifted = lift.lift_over_with("chr7", 117559590, 117559600, 0.95)?;
//! println!("{lifted}");
//! # Ok::<(), chainlift::LiftError>(())
//! ```
//!
//! ## Working with chain files
//!
//! The [`ChainMap`] keeps the chains of a file in their original order together with an index
//! by reference contig. [`ChainMap::filter`] and [`ChainMap::filter_by_score`] derive smaller
//! maps, and [`Writer::to_bin`] stores a parsed map so that [`Reader::from_bin`] can skip text
//! parsing next time.
//!
//! # Examples
//! ```rust,no_run
//! use chainlift::{ChainMap, Reader, Writer};
//!
//! let chains: ChainMap = Reader::from_file("path/to/hg19ToHg38.over.chain.gz")?;
//! let filt_chains = chains.filter(|c| c.score > 1000);
//! Writer::to_bin(&filt_chains, "path/to/hg19ToHg38.bin")?;
//! # Ok::<(), chainlift::LiftError>(())
//! ```

#![warn(rust_2021_compatibility)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod chainfile;
pub mod cmap;
pub mod config;
pub mod error;
pub mod hgvs;
pub mod interval;
pub mod io;
pub mod lift;

pub use crate::build::{BuildLabel, GenomeBuild, BUNDLED_DIRECTIONS};
pub use crate::chainfile::{ChainFile, ChainSource};
pub use crate::cmap::align::AlignmentRecord;
pub use crate::cmap::chain::{Chain, ChainBlock, ChainHead};
pub use crate::cmap::map::ChainMap;
pub use crate::cmap::project::{Hit, Intersection};
pub use crate::config::Config;
pub use crate::error::{DownloadFailure, LiftError, Result};
pub use crate::hgvs::{GenomeInterval, HgvsConverter};
pub use crate::interval::{Interval, Strand};
pub use crate::io::reader::{ParseMode, Reader};
pub use crate::io::writer::Writer;
pub use crate::lift::{LiftOver, DEFAULT_MIN_MATCH};
