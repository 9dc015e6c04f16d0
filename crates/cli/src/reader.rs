//! Line-oriented reader for x y z [w] tables
//!
//! Whitespace- or comma-separated columns; `#` comment lines and `>`
//! segment headers are skipped. End of input and malformed records are
//! distinct outcomes: the first is a clean `Ok(None)`, the second an
//! error naming the offending line. Non-finite values parse fine here
//! and are left to the engine's per-record rejection policy.

use std::io::BufRead;

use anyhow::{Context, Result, bail};

/// One parsed input record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Present only when the line carries a fourth column.
    pub w: Option<f64>,
}

/// Streaming record reader over any buffered source.
pub struct RecordReader<R: BufRead> {
    source: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line: String::new(),
            line_no: 0,
        }
    }

    /// Lines consumed so far, including skipped ones.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Next data record, or `None` on clean end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.line.clear();
            let n = self
                .source
                .read_line(&mut self.line)
                .with_context(|| format!("reading line {}", self.line_no + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('>') {
                continue;
            }

            return parse_line(trimmed)
                .with_context(|| format!("line {}: {trimmed:?}", self.line_no))
                .map(Some);
        }
    }
}

fn parse_line(line: &str) -> Result<Record> {
    let mut fields = [0.0f64; 4];
    let mut count = 0;
    for token in line.split([' ', '\t', ',']).filter(|t| !t.is_empty()) {
        if count == 4 {
            bail!("expected 3 or 4 columns, found more");
        }
        fields[count] = token
            .parse()
            .with_context(|| format!("bad number {token:?}"))?;
        count += 1;
    }
    if count < 3 {
        bail!("expected 3 or 4 columns, found {count}");
    }
    Ok(Record {
        x: fields[0],
        y: fields[1],
        z: fields[2],
        w: (count == 4).then_some(fields[3]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> Result<Vec<Record>> {
        let mut reader = RecordReader::new(Cursor::new(input));
        let mut out = Vec::new();
        while let Some(rec) = reader.next_record()? {
            out.push(rec);
        }
        Ok(out)
    }

    #[test]
    fn parses_three_and_four_columns() {
        let records = read_all("1 2 3\n4.5\t5.5\t6.5\t0.25\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record { x: 1.0, y: 2.0, z: 3.0, w: None });
        assert_eq!(records[1].w, Some(0.25));
    }

    #[test]
    fn skips_comments_blanks_and_segment_headers() {
        let records = read_all("# header\n\n> segment\n7 8 9\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].z, 9.0);
    }

    #[test]
    fn commas_are_separators_too() {
        let records = read_all("1,2,3\n").unwrap();
        assert_eq!(records[0], Record { x: 1.0, y: 2.0, z: 3.0, w: None });
    }

    #[test]
    fn non_finite_values_pass_through() {
        let records = read_all("1 2 NaN\n").unwrap();
        assert!(records[0].z.is_nan());
    }

    #[test]
    fn malformed_lines_are_errors_not_eof() {
        assert!(read_all("1 2\n").is_err());
        assert!(read_all("1 2 3 4 5\n").is_err());
        assert!(read_all("1 two 3\n").is_err());
        let err = read_all("1 1 1\nbogus line\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
