use log::trace;
use std::cmp::{max, min, Ordering};

use crate::cmap::chain::Chain;
use crate::cmap::map::ChainMap;
use crate::interval::{Interval, Strand};

/// The part of an interval a chain can carry over.
///
/// `q_start`/`q_end` are 0-based half-open and expressed on the chain's query
/// strand; [`Intersection::to_interval`] reflects them when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection {
    pub q_start: u64,
    pub q_end: u64,
    pub aligned: u64,
}

/// One chain able to map an interval, with its match fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub chain_id: u32,
    pub score: u64,
    pub fraction: f64,
    pub interval: Interval,
}

impl Chain {
    /// Intersect a 0-based half-open reference range with the aligned blocks.
    ///
    /// The mapped range runs from the projection of the first overlapping
    /// block portion to the projection of the last one, so gaps in between
    /// are spanned; only aligned bases count towards `aligned`.
    ///
    /// # Arguments
    /// * `start` - 0-based reference start
    /// * `end` - 0-based exclusive reference end
    ///
    /// # Returns
    /// * None if no aligned base falls within the range
    pub fn intersect(&self, start: u64, end: u64) -> Option<Intersection> {
        if start >= end || !self.overlaps_ref(start, end) {
            return None;
        }

        let mut hit: Option<Intersection> = None;
        for b in self.to_blocks() {
            // blocks are sorted, nothing further can overlap
            if b.r_start >= end {
                break;
            }
            if b.r_end <= start {
                continue;
            }

            let lo = max(start, b.r_start);
            let hi = min(end, b.r_end);
            let q_lo = b.q_start + (lo - b.r_start);
            let q_hi = b.q_start + (hi - b.r_start);

            hit = Some(match hit {
                None => Intersection {
                    q_start: q_lo,
                    q_end: q_hi,
                    aligned: hi - lo,
                },
                Some(acc) => Intersection {
                    q_start: acc.q_start,
                    q_end: q_hi,
                    aligned: acc.aligned + (hi - lo),
                },
            });
        }
        hit
    }

    /// Project an interval through this chain.
    ///
    /// # Returns
    /// * None when no aligned base of the interval falls in this chain
    pub fn project(&self, interval: &Interval) -> Option<Hit> {
        if interval.contig != self.refs.chr || interval.is_empty() {
            return None;
        }
        let (start, end) = interval.zero_based();
        let inter = self.intersect(start, end)?;

        Some(Hit {
            chain_id: self.id,
            score: self.score,
            fraction: inter.aligned as f64 / interval.len() as f64,
            interval: inter.to_interval(self, interval.strand)?,
        })
    }
}

impl Intersection {
    /// Turn the intersection into a 1-based interval on the query contig.
    ///
    /// # Returns
    /// * None if the range does not fit the query contig
    pub fn to_interval(&self, chain: &Chain, strand: Strand) -> Option<Interval> {
        let query = &chain.query;
        if self.q_start > self.q_end || self.q_end > query.size {
            return None;
        }
        let (start, end, strand) = match query.strand {
            Strand::Plus => (self.q_start, self.q_end, strand),
            Strand::Minus => (
                query.size.checked_sub(self.q_end)?,
                query.size.checked_sub(self.q_start)?,
                strand.flip(),
            ),
        };
        Some(Interval::from_zero_based(&query.chr, start, end, strand))
    }
}

/// Best first: higher fraction, then higher score, then lower chain id.
fn rank(a: &Hit, b: &Hit) -> Ordering {
    b.fraction
        .partial_cmp(&a.fraction)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.chain_id.cmp(&b.chain_id))
}

impl ChainMap {
    /// Every chain able to carry part of `interval`, best first.
    ///
    /// # Arguments
    /// * `interval` - A 1-based inclusive interval on a reference contig
    ///
    /// # Returns
    /// * Vec<Hit> ranked by match fraction, then score, then id
    pub fn candidates(&self, interval: &Interval) -> Vec<Hit> {
        let (start, end) = interval.zero_based();
        let mut hits: Vec<Hit> = self
            .overlapping(&interval.contig, start, end)
            .filter_map(|chain| chain.project(interval))
            .collect();
        hits.sort_by(rank);
        hits
    }

    /// The best hit for `interval`, if it reaches `min_match`.
    ///
    /// Ranking does not depend on the threshold, so lowering `min_match`
    /// never rejects a previously accepted mapping.
    pub fn best_hit(&self, interval: &Interval, min_match: f64) -> Option<Hit> {
        let best = self.candidates(interval).into_iter().next()?;
        if best.fraction >= min_match {
            Some(best)
        } else {
            trace!(
                "{}: best chain {} covers {:.4} < {:.4}",
                interval,
                best.chain_id,
                best.fraction,
                min_match
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::{ParseMode, Reader};
    use approx::assert_relative_eq;

    // chr1 target blocks: [0,100) -> [0,100), gap [100,110) vs [100,120),
    // [110,310) -> [120,320), gap [310,315) vs [320,325), [315,1000) -> [325,1010)
    const GAPPED: &[u8] = b"\
chain 1000 chr1 1000 + 0 1000 chr1 1100 + 0 1010 1
100\t10\t20
200\t5\t5
685
";

    const MINUS: &[u8] = b"\
chain 500 chr2 1000 + 100 200 chr5 2000 - 300 400 7
100
";

    fn iv(contig: &str, start: i64, end: i64) -> Interval {
        Interval::new(contig, start, end).unwrap()
    }

    #[test]
    fn maps_inside_one_block() {
        let chains = Reader::from_bytes(GAPPED).unwrap();
        let hit = chains.best_hit(&iv("chr1", 121, 130), 1.0).unwrap();
        assert_eq!(hit.interval, iv("chr1", 131, 140));
        assert_relative_eq!(hit.fraction, 1.0);
    }

    #[test]
    fn straddling_a_gap_counts_only_aligned_bases() {
        let chains = Reader::from_bytes(GAPPED).unwrap();
        // 0-based [90, 120): 10 aligned in block 1, 10 in the gap, 10 in block 2
        let interval = iv("chr1", 91, 120);
        let hits = chains.candidates(&interval);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].fraction, 20.0 / 30.0);
        // spans from the first projected base to the last one
        assert_eq!(hits[0].interval, iv("chr1", 91, 130));

        assert!(chains.best_hit(&interval, 1.0).is_none());
        assert!(chains.best_hit(&interval, 0.6).is_some());
    }

    #[test]
    fn start_inside_gap_snaps_to_next_block() {
        let chains = Reader::from_bytes(GAPPED).unwrap();
        // 0-based [105, 115): gap then 5 bases of block 2
        let hit = chains.best_hit(&iv("chr1", 106, 115), 0.5).unwrap();
        assert_eq!(hit.interval, iv("chr1", 121, 125));
    }

    #[test]
    fn interval_entirely_in_gap_has_no_candidate() {
        let chains = Reader::from_bytes(GAPPED).unwrap();
        assert!(chains.candidates(&iv("chr1", 101, 110)).is_empty());
        assert!(chains.best_hit(&iv("chr1", 101, 110), 0.0).is_none());
    }

    #[test]
    fn minus_strand_is_reflected() {
        let chains = Reader::from_bytes(MINUS).unwrap();
        // 0-based [110, 120) -> strand coords [310, 320) -> forward [1680, 1690)
        let hit = chains.best_hit(&iv("chr2", 111, 120), 1.0).unwrap();
        assert_eq!(hit.interval.contig, "chr5");
        assert_eq!((hit.interval.start, hit.interval.end), (1681, 1690));
        assert_eq!(hit.interval.strand, Strand::Minus);
        assert!(hit.interval.start <= hit.interval.end);
    }

    #[test]
    fn gapped_minus_strand_spans_both_blocks() {
        // blocks: [0,40) -> [50,90) and [50,100) -> [110,160) on the query strand
        let data = b"chain 500 chr3 1000 + 0 100 chr6 500 - 50 160 8\n40\t10\t20\n50\n";
        let chains = Reader::from_bytes(data).unwrap();
        // 0-based [30, 60): 10 bases in each block, 10 in the gap
        let interval = iv("chr3", 31, 60);
        assert!(chains.best_hit(&interval, 1.0).is_none());

        let hit = chains.best_hit(&interval, 0.6).unwrap();
        assert_relative_eq!(hit.fraction, 20.0 / 30.0);
        // strand coords [80, 120) -> forward [380, 420)
        assert_eq!(hit.interval.contig, "chr6");
        assert_eq!((hit.interval.start, hit.interval.end), (381, 420));
        assert_eq!(hit.interval.strand, Strand::Minus);
    }

    #[test]
    fn lenient_chain_past_query_end_is_mapped_within_bounds() {
        // blocks overshoot the declared query span [0, 100) of a size-150 contig
        let data = b"chain 5 chr2 1000 + 100 200 chr5 150 - 0 100 1\n50\t0\t100\n50\n";
        assert!(Reader::from_bytes(data).is_err());
        let chains = Reader::parse(data, ParseMode::Lenient).unwrap();

        // 0-based [100, 150) -> strand coords [0, 50) -> forward [100, 150)
        let hit = chains.best_hit(&iv("chr2", 101, 150), 1.0).unwrap();
        assert_eq!((hit.interval.start, hit.interval.end), (101, 150));
        assert_eq!(hit.interval.strand, Strand::Minus);

        assert!(chains.candidates(&iv("chr2", 151, 200)).is_empty());
        assert!(chains.best_hit(&iv("chr2", 151, 200), 0.0).is_none());

        // half in the clipped region
        let hit = chains.best_hit(&iv("chr2", 126, 175), 0.5).unwrap();
        assert_relative_eq!(hit.fraction, 0.5);
        assert_eq!((hit.interval.start, hit.interval.end), (101, 125));
    }

    #[test]
    fn out_of_range_intersection_has_no_interval() {
        let chains = Reader::from_bytes(MINUS).unwrap();
        let chain = chains.get(7).unwrap();
        let inter = Intersection {
            q_start: 1990,
            q_end: 2010,
            aligned: 20,
        };
        assert!(inter.to_interval(chain, Strand::Plus).is_none());
    }

    #[test]
    fn ranking_prefers_fraction_then_score() {
        let data = b"\
chain 9000 chr1 1000 + 0 50 chr1 1000 + 0 50 1
50

chain 100 chr1 1000 + 0 200 chr3 1000 + 0 200 2
200

chain 300 chr1 1000 + 0 200 chr4 1000 + 0 200 3
200
";
        let chains = Reader::from_bytes(data).unwrap();
        let hits = chains.candidates(&iv("chr1", 41, 60));
        let ids: Vec<u32> = hits.iter().map(|h| h.chain_id).collect();
        // chains 2 and 3 cover everything; 3 has the higher score
        assert_eq!(ids, vec![3, 2, 1]);
        assert_relative_eq!(hits[2].fraction, 0.5);

        let best = chains.best_hit(&iv("chr1", 41, 60), 1.0).unwrap();
        assert_eq!(best.interval.contig, "chr4");
    }

    #[test]
    fn lower_threshold_never_rejects() {
        let chains = Reader::from_bytes(GAPPED).unwrap();
        let interval = iv("chr1", 91, 120);
        let thresholds = [0.0, 0.25, 0.5, 0.6, 2.0 / 3.0, 0.7, 1.0];
        let mut accepted_above = false;
        for t in thresholds.iter().rev() {
            let ok = chains.best_hit(&interval, *t).is_some();
            assert!(!accepted_above || ok, "threshold {t} rejected");
            accepted_above |= ok;
        }
        assert!(accepted_above);
    }
}
