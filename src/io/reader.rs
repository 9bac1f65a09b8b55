use flate2::read::MultiGzDecoder;
use log::debug;
use memchr::memchr;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs::File, io::Read, path::Path};

use crate::cmap::chain::Chain;
use crate::cmap::map::ChainMap;
use crate::error::{LiftError, Result};

/// How strictly chain spans are checked while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// A chain whose blocks do not add up to its header span is an error.
    #[default]
    Strict,
    /// Such a chain is kept and a warning is logged.
    Lenient,
}

/// A reader for chain files.
#[derive(Debug, Clone)]
pub struct Reader;

/// One chain's raw bytes: header line number, header, data lines.
type RawChain<'a> = (usize, &'a [u8], &'a [u8]);

impl Reader {
    /// Read and parse a chain file, plain or gzip compressed.
    ///
    /// # Arguments
    ///
    /// * `file` - A path to a chain file.
    ///
    /// # Returns
    ///
    /// A `Result` containing a [`ChainMap`].
    pub fn from_file<T>(file: T) -> Result<ChainMap>
    where
        T: AsRef<Path> + Debug,
    {
        Self::from_file_with(file, ParseMode::Strict)
    }

    /// Same as [`Reader::from_file`] with an explicit [`ParseMode`].
    pub fn from_file_with<T>(file: T, mode: ParseMode) -> Result<ChainMap>
    where
        T: AsRef<Path> + Debug,
    {
        let data = Self::open(&file)?;
        let chains = Self::parse(&data, mode)?;
        debug!("parsed {} chains from {:?}", chains.len(), file);
        Ok(chains)
    }

    /// Parse chain text held in memory, strictly.
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::Reader;
    ///
    /// let line = b"chain 4900 chrY 58368225 + 25985403 25985413 chr5 151006098 - 43257292 43257302 1\n9\t1\t1\n0\n\n";
    /// let data = Reader::from_bytes(line).unwrap();
    ///
    /// assert_eq!(data.len(), 1);
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<ChainMap> {
        Self::parse(data, ParseMode::Strict)
    }

    /// Parser for chain files.
    ///
    /// Chains are located sequentially, then parsed in parallel; the file
    /// order is preserved in the returned map.
    ///
    /// # Arguments
    /// * `data` - A reference to a byte slice.
    /// * `mode` - How span mismatches are handled.
    ///
    /// # Returns
    /// A `Result` containing a [`ChainMap`].
    pub fn parse(data: &[u8], mode: ParseMode) -> Result<ChainMap> {
        let raw = Self::split(data)?;

        let chains = raw
            .par_iter()
            .enumerate()
            .map(|(i, (line, header, block))| Chain::from(header, block, *line, i as u32 + 1, mode))
            .collect::<Result<Vec<Chain>>>()?;

        Ok(ChainMap::from_chains(chains))
    }

    /// Cut the text into (line, header, data lines) triples.
    fn split(data: &[u8]) -> Result<Vec<RawChain<'_>>> {
        let mut vacc: Vec<RawChain<'_>> = Vec::new();
        let mut current: Option<(usize, &[u8], usize)> = None;
        let mut pos: usize = 0;
        let mut line_no: usize = 0;

        while pos < data.len() {
            line_no += 1;
            let end = memchr(b'\n', &data[pos..]).map_or(data.len(), |sep| pos + sep);
            let line = data[pos..end].trim_ascii();

            if is_header(line) {
                if let Some((n, header, block_start)) = current.take() {
                    vacc.push((n, header, &data[block_start..pos]));
                }
                current = Some((line_no, line, (end + 1).min(data.len())));
            } else if current.is_none() && !line.is_empty() && line[0] != b'#' {
                return Err(LiftError::parse(
                    line_no,
                    format!(
                        "data line outside of a chain: {:?}",
                        String::from_utf8_lossy(line)
                    ),
                ));
            }
            pos = end + 1;
        }

        if let Some((n, header, block_start)) = current {
            vacc.push((n, header, &data[block_start..]));
        }
        Ok(vacc)
    }

    /// Create a new reader from a binary file written by [`crate::Writer::to_bin`].
    ///
    /// # Arguments
    /// * `bin` - A path to a binary file, optionally gzip compressed.
    ///
    /// # Returns
    /// A `Result` containing a [`ChainMap`].
    pub fn from_bin<T>(bin: T) -> Result<ChainMap>
    where
        T: AsRef<Path> + Debug,
    {
        let data = Self::open(bin)?;
        let decoded: ChainMap = bincode::deserialize(&data)?;
        Ok(decoded.reindex())
    }

    /// Opener for files; gzip content is detected by its magic bytes.
    ///
    /// # Arguments
    /// * `file` - A path to a file.
    ///
    /// # Returns
    /// A `Result` containing a `Vec` of bytes.
    pub(crate) fn open<T>(file: T) -> Result<Vec<u8>>
    where
        T: AsRef<Path> + Debug,
    {
        let path = file.as_ref();
        let stat = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LiftError::NotFound(path.to_path_buf()),
            _ => LiftError::io(path, e),
        })?;

        let mut raw = Vec::with_capacity(stat.len() as usize + 1);
        let mut f = File::open(path).map_err(|e| LiftError::io(path, e))?;
        f.read_to_end(&mut raw).map_err(|e| LiftError::io(path, e))?;

        Self::gunzip(raw, path)
    }

    /// Decompress `raw` if it starts with the gzip magic bytes.
    pub(crate) fn gunzip(raw: Vec<u8>, origin: &Path) -> Result<Vec<u8>> {
        if !raw.starts_with(&[0x1f, 0x8b]) {
            return Ok(raw);
        }
        let mut data = Vec::with_capacity(raw.len() * 4);
        MultiGzDecoder::new(&raw[..])
            .read_to_end(&mut data)
            .map_err(|e| LiftError::io(origin, e))?;
        Ok(data)
    }
}

fn is_header(line: &[u8]) -> bool {
    line.starts_with(b"chain") && line.get(5).map_or(true, |b| b.is_ascii_whitespace())
}
