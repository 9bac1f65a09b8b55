use std::{
    fmt::Debug,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::cmap::map::ChainMap;
use crate::error::{LiftError, Result};

/// Write parsed chains back to disk
pub struct Writer;

impl Writer {
    /// Encode a ChainMap with bincode and write it to a file
    ///
    /// Re-reading the cache with [`crate::Reader::from_bin`] skips text parsing.
    ///
    /// # Arguments
    /// * `data` - A parsed ChainMap
    /// * `path` - A path to the output file
    ///
    /// # Returns
    /// * Result<()>
    pub fn to_bin<T>(data: &ChainMap, path: T) -> Result<()>
    where
        T: AsRef<Path> + Debug,
    {
        let encoded: Vec<u8> = bincode::serialize(data)?;
        let mut file = File::create(path.as_ref()).map_err(|e| LiftError::io(path.as_ref(), e))?;
        file.write_all(&encoded)
            .map_err(|e| LiftError::io(path.as_ref(), e))?;
        Ok(())
    }

    /// Encode, compress and write a ChainMap to a file
    ///
    /// # Arguments
    /// * `data` - A parsed ChainMap
    /// * `path` - A path to the output file
    ///
    /// # Returns
    /// * Result<()>
    pub fn to_bin_gz<T>(data: &ChainMap, path: T) -> Result<()>
    where
        T: AsRef<Path> + Debug,
    {
        let encoded: Vec<u8> = bincode::serialize(data)?;
        let file = File::create(path.as_ref()).map_err(|e| LiftError::io(path.as_ref(), e))?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder
            .write_all(&encoded)
            .and_then(|_| encoder.try_finish())
            .map_err(|e| LiftError::io(path.as_ref(), e))?;
        Ok(())
    }

    /// Write the chains as UCSC chain text, in their original order
    pub fn to_chain<T>(data: &ChainMap, path: T) -> Result<()>
    where
        T: AsRef<Path> + Debug,
    {
        let file = File::create(path.as_ref()).map_err(|e| LiftError::io(path.as_ref(), e))?;
        let mut out = BufWriter::new(file);
        for chain in data.iter() {
            write!(out, "{chain}").map_err(|e| LiftError::io(path.as_ref(), e))?;
        }
        out.flush().map_err(|e| LiftError::io(path.as_ref(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::Reader;

    const DATA: &[u8] = b"\
chain 1000 chr1 1000 + 0 1000 chr1 1100 + 0 1010 1
100\t10\t20
200\t5\t5
685

chain 20 chr2 500 + 10 30 chr7 600 - 0 20 2
20
";

    #[test]
    fn binary_cache_reloads_the_same_chains() {
        let dir = tempfile::tempdir().unwrap();
        let chains = Reader::from_bytes(DATA).unwrap();

        let bin = dir.path().join("chains.bin");
        Writer::to_bin(&chains, &bin).unwrap();
        let reloaded = Reader::from_bin(&bin).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(2), chains.get(2));
        assert_eq!(reloaded.overlapping("chr2", 0, 15).count(), 1);

        let gz = dir.path().join("chains.bin.gz");
        Writer::to_bin_gz(&chains, &gz).unwrap();
        assert_eq!(Reader::from_bin(&gz).unwrap().get(1), chains.get(1));
    }

    #[test]
    fn chain_text_output_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let chains = Reader::from_bytes(DATA).unwrap();
        let out = dir.path().join("out.over.chain");
        Writer::to_chain(&chains, &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let first = "chain 1000 chr1 1000 + 0 1000 chr1 1100 + 0 1010 1\n100\t10\t20\n";
        assert!(text.starts_with(first));
        let reparsed = Reader::from_file(&out).unwrap();
        assert_eq!(reparsed.get(2), chains.get(2));
    }
}
