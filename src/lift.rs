//! Liftover of 1-based intervals through a parsed chain file.
//!
//! | Context | Basis |
//! |---------|-------|
//! | Public API (`start`, `end`) | 1-based, inclusive |
//! | Chain arithmetic | 0-based, half-open |
//! | Lifted result | 1-based, inclusive |

use log::debug;
use rayon::prelude::*;

use crate::build::GenomeBuild;
use crate::chainfile::ChainFile;
use crate::cmap::map::ChainMap;
use crate::cmap::project::Hit;
use crate::config::Config;
use crate::error::{LiftError, Result};
use crate::interval::Interval;
use crate::io::reader::ParseMode;

/// Fraction of bases that must be aligned when no threshold is given.
pub const DEFAULT_MIN_MATCH: f64 = 1.0;

/// Liftover engine over one chain file.
///
/// The chain file is parsed once on construction; mapping only reads the
/// index, so a `LiftOver` can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct LiftOver {
    chain_file: ChainFile,
    chains: ChainMap,
}

impl LiftOver {
    /// Parse `chain_file` strictly and build an engine over it.
    pub fn new(chain_file: ChainFile) -> Result<Self> {
        Self::with_mode(chain_file, ParseMode::Strict)
    }

    pub fn with_mode(chain_file: ChainFile, mode: ParseMode) -> Result<Self> {
        let chains = chain_file.parse(mode)?;
        debug!(
            "{} to {} liftover ready with {} chains",
            chain_file.from_build(),
            chain_file.to_build(),
            chains.len()
        );
        Ok(Self { chain_file, chains })
    }

    /// Engine over the bundled chain file for `from -> to`.
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::{Config, GenomeBuild, LiftOver};
    ///
    /// let lift = LiftOver::from_builds(GenomeBuild::Hg19, GenomeBuild::Hg38, &Config::default())?;
    /// let lifted = lift.lift_over("chr1", 743267, 743268)?;
    /// assert_eq!(lifted.to_string(), "chr1:807887-807888");
    /// # Ok::<(), chainlift::LiftError>(())
    /// ```
    pub fn from_builds(from: GenomeBuild, to: GenomeBuild, config: &Config) -> Result<Self> {
        Self::with_mode(ChainFile::bundled(from, to, config)?, config.parse_mode)
    }

    pub fn chain_file(&self) -> &ChainFile {
        &self.chain_file
    }

    pub fn chains(&self) -> &ChainMap {
        &self.chains
    }

    /// Lift `contig:start-end` requiring every base to be aligned.
    ///
    /// # Arguments
    /// * `contig` - Reference contig, e.g. "chr1"
    /// * `start` - 1-based start
    /// * `end` - 1-based inclusive end
    ///
    /// # Returns
    /// * The interval on the target build, or `LiftOverFailed`
    pub fn lift_over(&self, contig: &str, start: i64, end: i64) -> Result<Interval> {
        self.lift_over_with(contig, start, end, DEFAULT_MIN_MATCH)
    }

    /// Lift `contig:start-end` accepting a chain covering at least
    /// `min_match` of the bases.
    pub fn lift_over_with(
        &self,
        contig: &str,
        start: i64,
        end: i64,
        min_match: f64,
    ) -> Result<Interval> {
        check_min_match(min_match)?;
        let interval = Interval::new(contig, start, end)?;
        self.map(&interval, min_match)
    }

    pub fn lift_interval(&self, interval: &Interval) -> Result<Interval> {
        self.lift_interval_with(interval, DEFAULT_MIN_MATCH)
    }

    pub fn lift_interval_with(&self, interval: &Interval, min_match: f64) -> Result<Interval> {
        check_min_match(min_match)?;
        interval.validate()?;
        self.map(interval, min_match)
    }

    /// Ranked candidate hits for `interval`, whatever their match fraction.
    pub fn candidates(&self, interval: &Interval) -> Result<Vec<Hit>> {
        interval.validate()?;
        Ok(self.chains.candidates(interval))
    }

    /// Lift many intervals in parallel; results keep the input order.
    pub fn lift_batch(&self, intervals: &[Interval], min_match: f64) -> Vec<Result<Interval>> {
        intervals
            .par_iter()
            .map(|interval| self.lift_interval_with(interval, min_match))
            .collect()
    }

    fn map(&self, interval: &Interval, min_match: f64) -> Result<Interval> {
        self.chains
            .best_hit(interval, min_match)
            .map(|hit| hit.interval)
            .ok_or_else(|| LiftError::LiftOverFailed {
                from: self.chain_file.from_build().to_string(),
                to: self.chain_file.to_build().to_string(),
                contig: interval.contig.clone(),
                start: interval.start,
                end: interval.end,
            })
    }
}

fn check_min_match(min_match: f64) -> Result<()> {
    if (0.0..=1.0).contains(&min_match) {
        Ok(())
    } else {
        Err(LiftError::InvalidArgument(format!(
            "min_match must be within [0, 1], got {min_match}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Strand;
    use std::sync::Arc;

    const DATA: &[u8] = b"\
chain 1000 chr1 1000 + 0 1000 chr1 1100 + 0 1010 1
100\t10\t20
200\t5\t5
685

chain 500 chr2 1000 + 100 200 chr5 2000 - 300 400 2
100
";

    fn engine() -> LiftOver {
        LiftOver::new(ChainFile::from_bytes(DATA, "hg19", "hg38").unwrap()).unwrap()
    }

    #[test]
    fn validates_arguments_before_mapping() {
        let lift = engine();
        for (contig, start, end) in [("", 1, 2), ("chr1", -1, 2), ("chr1", 1, -1), ("chr1", 5, 4)] {
            assert!(matches!(
                lift.lift_over(contig, start, end),
                Err(LiftError::InvalidArgument(_))
            ));
        }
        for min_match in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                lift.lift_over_with("chr1", 1, 10, min_match),
                Err(LiftError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn failure_names_builds_and_interval() {
        let err = engine().lift_over("chr20", 10, 20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not perform hg19 to hg38 liftover for chr20:10-20"
        );

        // zero-length interval
        assert!(matches!(
            engine().lift_over("chr1", 0, 0),
            Err(LiftError::LiftOverFailed { .. })
        ));
    }

    #[test]
    fn threshold_controls_gap_straddling() {
        let lift = engine();
        assert!(lift.lift_over("chr1", 91, 120).is_err());
        let lifted = lift.lift_over_with("chr1", 91, 120, 0.5).unwrap();
        assert_eq!(lifted, Interval::new("chr1", 91, 130).unwrap());
    }

    #[test]
    fn facade_forms_agree() {
        let lift = engine();
        let interval = Interval::new("chr2", 111, 120).unwrap();
        let a = lift.lift_over("chr2", 111, 120).unwrap();
        let b = lift.lift_interval_with(&interval, 1.0).unwrap();
        let c = lift.lift_interval(&interval).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.strand, Strand::Minus);
    }

    #[test]
    fn lenient_chain_lifts_without_overflow() {
        let data = b"chain 5 chr2 1000 + 100 200 chr5 150 - 0 100 1\n50\t0\t100\n50\n";
        let chain = ChainFile::from_bytes(&data[..], "hg19", "hg38").unwrap();
        let lift = LiftOver::with_mode(chain, ParseMode::Lenient).unwrap();

        assert!(matches!(
            lift.lift_over("chr2", 151, 200),
            Err(LiftError::LiftOverFailed { .. })
        ));
        let lifted = lift.lift_over("chr2", 101, 150).unwrap();
        assert_eq!(lifted.to_string(), "chr5:101-150");
        assert_eq!(lifted.strand, Strand::Minus);
    }

    #[test]
    fn position_zero_is_read_as_position_one() {
        let lift = engine();
        assert_eq!(
            lift.lift_over("chr1", 0, 5).unwrap(),
            lift.lift_over("chr1", 1, 5).unwrap()
        );
    }

    #[test]
    fn candidates_expose_fractions() {
        let lift = engine();
        let hits = lift
            .candidates(&Interval::new("chr1", 91, 120).unwrap())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chain_id, 1);
    }

    #[test]
    fn batch_keeps_input_order() {
        let lift = engine();
        let intervals = vec![
            Interval::new("chr1", 1, 10).unwrap(),
            Interval::new("chr9", 1, 10).unwrap(),
            Interval::new("chr1", 121, 130).unwrap(),
        ];
        let lifted = lift.lift_batch(&intervals, 1.0);
        assert_eq!(lifted.len(), 3);
        assert_eq!(lifted[0].as_ref().unwrap().to_string(), "chr1:1-10");
        assert!(lifted[1].is_err());
        assert_eq!(lifted[2].as_ref().unwrap().to_string(), "chr1:131-140");
    }

    #[test]
    fn shared_across_threads() {
        let lift = Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let lift = Arc::clone(&lift);
                std::thread::spawn(move || lift.lift_over("chr1", 121 + i, 130 + i).unwrap())
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            let lifted = h.join().unwrap();
            assert_eq!(lifted.start, 131 + i as u64);
        }
    }
}
