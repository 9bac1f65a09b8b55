use fxhash::FxHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cmap::chain::Chain;

/// The parsed chains of one chain file, in file order, indexed by reference contig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainMap {
    chains: Vec<Chain>,
    /// Rebuilt from `chains` after decoding, never read from a cache.
    #[serde(skip)]
    index: FxHashMap<String, Vec<usize>>,
}

impl ChainMap {
    /// Create a new, empty ChainMap
    ///
    /// # Example
    /// ```
    /// use chainlift::ChainMap;
    ///
    /// let chains = ChainMap::new();
    /// assert!(chains.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ChainMap from chains, keeping their order.
    ///
    /// Per contig, chains are indexed by increasing reference start so that
    /// overlap queries can stop early.
    pub fn from_chains(chains: Vec<Chain>) -> Self {
        let mut index: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (i, chain) in chains.iter().enumerate() {
            index.entry(chain.refs.chr.clone()).or_default().push(i);
        }
        for positions in index.values_mut() {
            positions.sort_by_key(|&i| (chains[i].refs.start, chains[i].refs.end));
        }
        Self { chains, index }
    }

    /// Rebuild the contig index from the chains.
    pub(crate) fn reindex(self) -> Self {
        Self::from_chains(self.chains)
    }

    /// Get a chain by its id
    ///
    /// # Arguments
    /// * `id` - A chain id
    ///
    /// # Returns
    /// * Option<&Chain>
    pub fn get(&self, id: u32) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Iterate over the chains in file order
    pub fn iter(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter()
    }

    /// Reference contigs with at least one chain.
    pub fn contigs(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|k| k.as_str())
    }

    /// Chains on `contig` whose reference span overlaps `[start, end)` (0-based).
    ///
    /// # Arguments
    /// * `contig` - A reference contig name
    /// * `start` - 0-based start
    /// * `end` - 0-based exclusive end
    ///
    /// # Returns
    /// * Iterator over the overlapping chains, by increasing reference start
    pub fn overlapping<'a>(
        &'a self,
        contig: &str,
        start: u64,
        end: u64,
    ) -> impl Iterator<Item = &'a Chain> + 'a {
        self.index
            .get(contig)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.chains[i])
            .take_while(move |c| c.refs.start < end)
            .filter(move |c| c.overlaps_ref(start, end))
    }

    /// Generalized filtering function
    ///
    /// # Arguments
    /// * `fc` - A closure that takes a reference to a Chain and returns a boolean
    ///
    /// # Returns
    /// * ChainMap
    ///
    /// # Example
    /// ```
    /// use chainlift::Reader;
    ///
    /// let data = b"chain 10 chr1 100 + 0 10 chr1 100 + 0 10 1\n10\n\nchain 99 chr2 100 + 0 10 chr2 100 + 0 10 2\n10\n";
    /// let chains = Reader::from_bytes(data).unwrap();
    /// let filt_chains = chains.filter(|chain| chain.refs.chr == "chr2");
    /// assert_eq!(filt_chains.len(), 1);
    /// ```
    pub fn filter<F>(&self, fc: F) -> Self
    where
        F: Fn(&Chain) -> bool + Sync,
    {
        let kept: Vec<Chain> = self
            .chains
            .par_iter()
            .filter(|chain| fc(chain))
            .cloned()
            .collect();
        Self::from_chains(kept)
    }

    /// Filter the ChainMap by score
    ///
    /// # Arguments
    /// * `score` - Minimum score to keep
    ///
    /// # Returns
    /// * ChainMap
    pub fn filter_by_score(&self, score: u64) -> Self {
        self.filter(|c| c.score >= score)
    }
}

impl FromIterator<Chain> for ChainMap {
    fn from_iter<I: IntoIterator<Item = Chain>>(iter: I) -> Self {
        Self::from_chains(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::Reader;

    const DATA: &[u8] = b"\
chain 1000 chr1 1000 + 0 500 chr1 1000 + 0 500 1
500

chain 2000 chr1 1000 + 0 800 chr1 1000 + 0 800 2
800

chain 50 chr1 1000 + 900 1000 chr9 1000 - 0 100 3
100

chain 70 chr2 1000 + 10 20 chr2 1000 + 10 20 4
10
";

    #[test]
    fn keeps_file_order_and_indexes_contigs() {
        let chains = Reader::from_bytes(DATA).unwrap();
        assert_eq!(chains.len(), 4);
        let ids: Vec<u32> = chains.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let mut contigs: Vec<&str> = chains.contigs().collect();
        contigs.sort();
        assert_eq!(contigs, vec!["chr1", "chr2"]);
        assert_eq!(chains.get(3).unwrap().query.chr, "chr9");
        assert!(chains.get(42).is_none());
    }

    #[test]
    fn overlap_queries() {
        let chains = Reader::from_bytes(DATA).unwrap();
        let hits: Vec<u32> = chains.overlapping("chr1", 100, 200).map(|c| c.id).collect();
        assert_eq!(hits, vec![1, 2]);

        let hits: Vec<u32> = chains.overlapping("chr1", 600, 950).map(|c| c.id).collect();
        assert_eq!(hits, vec![2, 3]);

        // half-open: a chain ending at 500 does not overlap [500, 501)
        let hits: Vec<u32> = chains.overlapping("chr1", 500, 501).map(|c| c.id).collect();
        assert_eq!(hits, vec![2]);

        assert_eq!(chains.overlapping("chrX", 0, 10).count(), 0);
    }

    #[test]
    fn binary_cache_never_trusts_a_stored_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut chains = Reader::from_bytes(DATA).unwrap();
        // stale positions past the end of the chain list
        chains.index.insert("chr1".to_string(), vec![17, 99]);
        chains.index.insert("chr7".to_string(), vec![3]);

        let bin = dir.path().join("stale.bin");
        std::fs::write(&bin, bincode::serialize(&chains).unwrap()).unwrap();
        let reloaded = Reader::from_bin(&bin).unwrap();

        let hits: Vec<u32> = reloaded.overlapping("chr1", 100, 200).map(|c| c.id).collect();
        assert_eq!(hits, vec![1, 2]);
        assert_eq!(reloaded.overlapping("chr7", 0, 1000).count(), 0);
        let mut contigs: Vec<&str> = reloaded.contigs().collect();
        contigs.sort();
        assert_eq!(contigs, vec!["chr1", "chr2"]);
    }

    #[test]
    fn filters() {
        let chains = Reader::from_bytes(DATA).unwrap();
        let strong = chains.filter_by_score(1000);
        let ids: Vec<u32> = strong.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(strong.overlapping("chr1", 950, 960).count(), 0);

        let minus = chains.filter(|c| c.query.strand == crate::interval::Strand::Minus);
        assert_eq!(minus.len(), 1);
    }
}
