use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::from_utf8;

use crate::cmap::align::AlignmentRecord;
use crate::error::{LiftError, Result};
use crate::interval::Strand;
use crate::io::reader::ParseMode;

/// A discrete representation of a genomic chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub score: u64,
    pub refs: ChainHead,
    pub query: ChainHead,
    pub alignment: Vec<AlignmentRecord>,
    pub id: u32,
}

/// An aligned (gap-free) block with its reference and query coordinates.
///
/// Coordinates are 0-based half-open. Query coordinates are expressed on the
/// query strand, i.e. on the reverse complement when the query strand is `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainBlock {
    pub r_start: u64,
    pub r_end: u64,
    pub q_start: u64,
    pub q_end: u64,
}

impl Chain {
    /// Create a new chain object from a chain block (header, alignment).
    ///
    /// # Arguments
    /// * `head` - A byte array containing the header of the chain block
    /// * `block` - A byte array containing the alignment of the chain block
    /// * `line` - The 1-based line number of the header
    /// * `ordinal` - The 1-based position of this chain in its file, used as id when the header has none
    /// * `mode` - Whether span mismatches are errors or warnings
    ///
    /// # Returns
    /// * Result<Chain>
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::{Chain, ParseMode};
    ///
    /// let head = b"chain 4900 chrY 58368225 + 25985403 25985413 chr5 151006098 - 43257292 43257302 1";
    /// let block = b"9\t1\t1\n0\n";
    /// let chain = Chain::from(head, block, 1, 1, ParseMode::Strict).unwrap();
    /// assert_eq!(chain.id, 1);
    /// assert_eq!(chain.alignment.len(), 2);
    /// ```
    pub fn from(
        head: &[u8],
        block: &[u8],
        line: usize,
        ordinal: u32,
        mode: ParseMode,
    ) -> Result<Self> {
        let (score, refs, query, id) = Self::head(head, line)?;
        let alignment = AlignmentRecord::parse(block, line + 1)?;

        let chain = Self {
            score,
            refs,
            query,
            alignment,
            id: id.unwrap_or(ordinal),
        };

        if let Err(msg) = chain.check_spans() {
            match mode {
                ParseMode::Strict => return Err(LiftError::parse(line, msg)),
                ParseMode::Lenient => warn!("chain {} (line {}): {}", chain.id, line, msg),
            }
        }

        Ok(chain)
    }

    /// Process a chain header into its score, reference and query heads and id.
    ///
    /// # Arguments
    /// * `header` - A byte array containing the header of the chain block
    /// * `line` - The 1-based line number, for error reporting
    ///
    /// # Returns
    /// * Result<(u64, ChainHead, ChainHead, Option<u32>)>
    pub fn head(header: &[u8], line: usize) -> Result<(u64, ChainHead, ChainHead, Option<u32>)> {
        let acc: Vec<&[u8]> = header
            .split(|b| b.is_ascii_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        if acc.first() != Some(&&b"chain"[..]) {
            return Err(LiftError::parse(line, "header must start with `chain`"));
        }
        if acc.len() < 12 {
            return Err(LiftError::parse(
                line,
                format!("expected at least 12 header fields, got {}", acc.len()),
            ));
        }

        let score = parse_field::<u64>(acc[1], "score", line)?;
        let refs = ChainHead::from(&acc[2..7], line)?;
        let query = ChainHead::from(&acc[7..12], line)?;

        if refs.strand != Strand::Plus {
            return Err(LiftError::parse(line, "reference strand must be `+`"));
        }

        let id = match acc.get(12) {
            Some(raw) => Some(parse_field::<u32>(raw, "id", line)?),
            None => None,
        };

        Ok((score, refs, query, id))
    }

    /// Check that the alignment reconstructs the header spans exactly.
    pub fn check_spans(&self) -> std::result::Result<(), String> {
        let r_span: u64 = self.alignment.iter().map(|a| a.ref_span()).sum();
        let q_span: u64 = self.alignment.iter().map(|a| a.query_span()).sum();

        if self.refs.start + r_span != self.refs.end {
            return Err(format!(
                "blocks end at reference position {} but the header declares {}",
                self.refs.start + r_span,
                self.refs.end
            ));
        }
        if self.query.start + q_span != self.query.end {
            return Err(format!(
                "blocks end at query position {} but the header declares {}",
                self.query.start + q_span,
                self.query.end
            ));
        }
        Ok(())
    }

    /// Get the header of a chain object as a string.
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::{Chain, ParseMode};
    ///
    /// let head = b"chain 10 chr1 100 + 0 10 chr1 100 + 0 10 12";
    /// let chain = Chain::from(head, b"10\n", 1, 1, ParseMode::Strict).unwrap();
    /// assert_eq!(chain.header(), "chain 10 chr1 100 + 0 10 chr1 100 + 0 10 12");
    /// ```
    pub fn header(&self) -> String {
        format!("chain {} {} {} {}", self.score, self.refs, self.query, self.id)
    }

    /// Aligned blocks of this chain, in increasing reference order.
    ///
    /// Blocks are clipped to the header spans, so a chain kept despite a
    /// span mismatch never yields coordinates past its declared ends.
    pub fn to_blocks(&self) -> Vec<ChainBlock> {
        let mut r_start: u64 = self.refs.start;
        let mut q_start: u64 = self.query.start;
        let mut blocks: Vec<ChainBlock> = Vec::with_capacity(self.alignment.len());

        for b in &self.alignment {
            let size = (b.size as u64)
                .min(self.refs.end.saturating_sub(r_start))
                .min(self.query.end.saturating_sub(q_start));
            if size > 0 {
                blocks.push(ChainBlock {
                    r_start,
                    r_end: r_start + size,
                    q_start,
                    q_end: q_start + size,
                });
            }
            r_start += b.ref_span();
            q_start += b.query_span();
        }
        blocks
    }

    /// Whether the reference span overlaps `[start, end)` (0-based).
    pub fn overlaps_ref(&self, start: u64, end: u64) -> bool {
        self.refs.start < end && start < self.refs.end
    }

    /// Number of aligned bases.
    pub fn aligned_bases(&self) -> u64 {
        self.alignment.iter().map(|a| a.size as u64).sum()
    }
}

impl fmt::Display for Chain {
    /// The chain in its text form, header plus data lines and a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for record in &self.alignment {
            writeln!(f, "{record}")?;
        }
        writeln!(f)
    }
}

/// A ref/query chain head object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub chr: String,
    pub size: u64,
    pub strand: Strand,
    pub start: u64,
    pub end: u64,
}

impl ChainHead {
    /// Create a new chain head object from the five fields of a ref or query header.
    ///
    /// # Arguments
    /// * `header` - `[name, size, strand, start, end]`
    /// * `line` - The 1-based line number, for error reporting
    ///
    /// # Returns
    /// * Result<ChainHead>
    /// * An error if the header is not well formatted
    pub fn from(header: &[&[u8]], line: usize) -> Result<Self> {
        let chr = from_utf8(header[0])
            .map_err(|_| LiftError::parse(line, "contig name is not valid UTF-8"))?
            .to_string();

        let strand = Strand::from_byte(header[2]).ok_or_else(|| {
            LiftError::parse(
                line,
                format!("invalid strand {:?}", String::from_utf8_lossy(header[2])),
            )
        })?;

        let head = Self {
            chr,
            size: parse_field::<u64>(header[1], "size", line)?,
            strand,
            start: parse_field::<u64>(header[3], "start", line)?,
            end: parse_field::<u64>(header[4], "end", line)?,
        };

        if head.start > head.end || head.end > head.size {
            return Err(LiftError::parse(
                line,
                format!(
                    "span {}-{} does not fit {} of size {}",
                    head.start, head.end, head.chr, head.size
                ),
            ));
        }
        Ok(head)
    }
}

impl fmt::Display for ChainHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.chr, self.size, self.strand, self.start, self.end
        )
    }
}

fn parse_field<T: std::str::FromStr>(raw: &[u8], name: &str, line: usize) -> Result<T> {
    from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .ok_or_else(|| {
            LiftError::parse(
                line,
                format!(
                    "failed to parse {name} in {:?}. Bad formatted line!",
                    String::from_utf8_lossy(raw)
                ),
            )
        })
}
