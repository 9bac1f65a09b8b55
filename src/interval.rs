//! Genomic intervals as seen by callers: 1-based, inclusive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LiftError, Result};

/// Strand of a chain side or an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    #[default]
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    pub fn from_byte(b: &[u8]) -> Option<Self> {
        match b {
            b"+" => Some(Strand::Plus),
            b"-" => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A contig interval in 1-based inclusive coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub strand: Strand,
}

impl Interval {
    /// Create a validated, positive-strand interval.
    ///
    /// Position 0 is accepted and read as position 1, so `0-5` and `1-5`
    /// cover the same five bases. `0-0` covers none.
    ///
    /// # Arguments
    /// * `contig` - A non-empty contig name, e.g. "chr1"
    /// * `start` - 1-based start, must be >= 0
    /// * `end` - 1-based inclusive end, must be >= start
    ///
    /// # Returns
    /// * Result<Interval>
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::Interval;
    ///
    /// let iv = Interval::new("chr1", 743267, 743268).unwrap();
    /// assert_eq!(iv.to_string(), "chr1:743267-743268");
    /// assert!(Interval::new("chr1", 10, 5).is_err());
    /// ```
    pub fn new(contig: impl Into<String>, start: i64, end: i64) -> Result<Self> {
        let contig = contig.into();
        if contig.trim().is_empty() {
            return Err(LiftError::InvalidArgument(
                "contig cannot be empty".to_string(),
            ));
        }
        if start < 0 || end < 0 {
            return Err(LiftError::InvalidArgument(format!(
                "coordinates must be non-negative, got {start}-{end}"
            )));
        }
        if start > end {
            return Err(LiftError::InvalidArgument(format!(
                "start {start} is greater than end {end}"
            )));
        }
        Ok(Self {
            contig,
            start: start as u64,
            end: end as u64,
            strand: Strand::Plus,
        })
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Re-check the invariants of an interval that may have been built by hand.
    pub fn validate(&self) -> Result<()> {
        if self.contig.trim().is_empty() {
            return Err(LiftError::InvalidArgument(
                "contig cannot be empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(LiftError::InvalidArgument(format!(
                "start {} is greater than end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// 0-based half-open bounds used for chain arithmetic; a start of 0 maps to 0.
    pub fn zero_based(&self) -> (u64, u64) {
        (self.start.saturating_sub(1), self.end)
    }

    /// Number of bases covered.
    pub fn len(&self) -> u64 {
        let (start, end) = self.zero_based();
        end.saturating_sub(start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build an interval from 0-based half-open bounds.
    pub(crate) fn from_zero_based(contig: &str, start: u64, end: u64, strand: Strand) -> Self {
        Self {
            contig: contig.to_string(),
            start: start + 1,
            end,
            strand,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            Interval::new("", 1, 2),
            Err(LiftError::InvalidArgument(_))
        ));
        assert!(matches!(
            Interval::new("chr1", -1, 2),
            Err(LiftError::InvalidArgument(_))
        ));
        assert!(matches!(
            Interval::new("chr1", 1, -2),
            Err(LiftError::InvalidArgument(_))
        ));
        assert!(matches!(
            Interval::new("chr1", 3, 2),
            Err(LiftError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_based_conversion() {
        let iv = Interval::new("chr1", 11, 20).unwrap();
        assert_eq!(iv.zero_based(), (10, 20));
        assert_eq!(iv.len(), 10);

        let single = Interval::new("chr1", 5, 5).unwrap();
        assert_eq!(single.len(), 1);

        let empty = Interval::new("chr1", 0, 0).unwrap();
        assert!(empty.is_empty());

        // position 0 is clamped to position 1
        let from_zero = Interval::new("chr1", 0, 5).unwrap();
        assert_eq!(from_zero.zero_based(), (0, 5));
        assert_eq!(from_zero.len(), 5);
        assert_eq!(from_zero.zero_based(), Interval::new("chr1", 1, 5).unwrap().zero_based());
    }

    #[test]
    fn strand_helpers() {
        assert_eq!(Strand::from_byte(b"-"), Some(Strand::Minus));
        assert_eq!(Strand::from_byte(b"*"), None);
        assert_eq!(Strand::Plus.flip(), Strand::Minus);
        let iv = Interval::new("chr2", 1, 1).unwrap().with_strand(Strand::Minus);
        assert_eq!(iv.strand.to_string(), "-");
    }
}
