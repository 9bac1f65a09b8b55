use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::from_utf8;

use crate::error::{LiftError, Result};

/// A structure to represent an alignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub size: u32,
    pub dt: u32,
    pub dq: u32,
    pub is_last: bool,
}

impl AlignmentRecord {
    /// Create a new alignment record.
    ///
    /// # Arguments
    /// * `size` - The size of the ungapped alignment
    /// * `dt` -  The difference between the end of this block and the beginning of the next block (reference sequence)
    /// * `dq` - The difference between the end of this block and the beginning of the next block (query sequence)
    /// * `is_last` - Whether this is the closing, size-only record of a chain
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::AlignmentRecord;
    ///
    /// let data = AlignmentRecord::new(9, 1, 0, false);
    /// assert_eq!(data.to_string(), "9\t1\t0");
    /// ```
    pub fn new(size: u32, dt: u32, dq: u32, is_last: bool) -> Self {
        Self {
            size,
            dt,
            dq,
            is_last,
        }
    }

    /// Parse the data lines of one chain into alignment records.
    ///
    /// Blank and `#` lines are skipped. Every line but the last must carry
    /// `size dt dq`; the last one carries `size` alone.
    ///
    /// # Arguments
    /// * `align` - The bytes following a chain header, up to the next header
    /// * `first_line` - The 1-based line number of the first byte, for error reporting
    ///
    /// # Returns
    /// * Result<Vec<AlignmentRecord>>
    ///
    /// # Example
    ///
    /// ```
    /// use chainlift::AlignmentRecord;
    ///
    /// let records = AlignmentRecord::parse(b"9\t1\t0\n10\n", 2).unwrap();
    /// assert_eq!(records.len(), 2);
    /// assert!(records[1].is_last);
    /// ```
    pub fn parse(align: &[u8], first_line: usize) -> Result<Vec<AlignmentRecord>> {
        let mut acc: Vec<AlignmentRecord> = Vec::new();
        let mut align = align;
        let mut line_no = first_line;
        let mut last_line = first_line;

        while !align.is_empty() {
            let (line, rest) = match memchr(b'\n', align) {
                Some(sep) => (&align[..sep], &align[sep + 1..]),
                None => (align, &align[align.len()..]),
            };
            align = rest;
            let current = line_no;
            line_no += 1;

            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let line = line.trim_ascii();
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            if acc.last().is_some_and(|r| r.is_last) {
                return Err(LiftError::parse(
                    current,
                    "a size-only line must be the last line of a chain",
                ));
            }

            acc.push(Self::from_line(line, current)?);
            last_line = current;
        }

        match acc.last() {
            None => Err(LiftError::parse(first_line, "chain has no alignment lines")),
            Some(r) if !r.is_last => Err(LiftError::parse(
                last_line,
                "chain must end with a size-only line",
            )),
            Some(_) => Ok(acc),
        }
    }

    /// Parse a single trimmed data line.
    fn from_line(line: &[u8], line_no: usize) -> Result<Self> {
        let fields: Vec<&[u8]> = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        match fields.as_slice() {
            [size] => Ok(Self::new(parse_u32(size, "size", line_no)?, 0, 0, true)),
            [size, dt, dq] => Ok(Self::new(
                parse_u32(size, "size", line_no)?,
                parse_u32(dt, "dt", line_no)?,
                parse_u32(dq, "dq", line_no)?,
                false,
            )),
            _ => Err(LiftError::parse(
                line_no,
                format!(
                    "expected `size dt dq` or `size`, got {:?}",
                    String::from_utf8_lossy(line)
                ),
            )),
        }
    }

    /// Reference bases consumed by this record, block plus trailing gap.
    pub fn ref_span(&self) -> u64 {
        self.size as u64 + self.dt as u64
    }

    /// Query bases consumed by this record, block plus trailing gap.
    pub fn query_span(&self) -> u64 {
        self.size as u64 + self.dq as u64
    }
}

impl fmt::Display for AlignmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_last {
            write!(f, "{}", self.size)
        } else {
            write!(f, "{}\t{}\t{}", self.size, self.dt, self.dq)
        }
    }
}

fn parse_u32(field: &[u8], name: &str, line_no: usize) -> Result<u32> {
    if field.first() == Some(&b'-') {
        return Err(LiftError::parse(
            line_no,
            format!("negative {name}: {:?}", String::from_utf8_lossy(field)),
        ));
    }
    from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| {
            LiftError::parse(
                line_no,
                format!("failed to parse {name}: {:?}", String::from_utf8_lossy(field)),
            )
        })
}
