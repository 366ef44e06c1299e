//! Extraction of (x, y) coordinate series from loosely structured numeric text.
//!
//! Only the first non-blank line of a source is read. Every integer or
//! decimal literal on it (optional sign, digits, optional fraction; no
//! exponents) is a token, and tokens alternate between x and y starting with
//! x. A trailing unmatched x token is dropped.

use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Regex matching one numeric literal.
static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]?\d+(?:\.\d*)?").unwrap());

/// Two equal-length sequences of coordinates, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateSeries {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl CoordinateSeries {
    /// Build a series from (x, y) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (x, y) = pairs.into_iter().unzip();
        Self { x, y }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of (x, y) pairs.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate over the points in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Parser for numeric text sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericSeriesParser;

impl NumericSeriesParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse the source at `path`.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<CoordinateSeries> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::data_format(path, "source is not valid UTF-8 text"))?;

        self.parse_str(&text)
            .map_err(|message| Error::data_format(path, message))
    }

    /// Parse in-memory text. The error is a human-readable reason.
    pub fn parse_str(&self, text: &str) -> std::result::Result<CoordinateSeries, String> {
        let mut lines = text.lines();
        let record = lines
            .by_ref()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| "no data line found".to_string())?;

        let ignored = lines.filter(|line| !line.trim().is_empty()).count();
        if ignored > 0 {
            log::warn!("Ignoring {} line(s) after the first data record", ignored);
        }

        let tokens = tokenize(record)?;
        if tokens.is_empty() {
            return Err("the data line contains no numbers".to_string());
        }
        if tokens.len() % 2 == 1 {
            log::warn!(
                "Odd number of values ({}), dropping trailing value {}",
                tokens.len(),
                tokens[tokens.len() - 1]
            );
        }

        let series =
            CoordinateSeries::from_pairs(tokens.chunks_exact(2).map(|pair| (pair[0], pair[1])));
        if series.is_empty() {
            return Err("the data line holds no complete (x, y) pair".to_string());
        }

        log::debug!("Parsed {} points from {} values", series.len(), tokens.len());
        Ok(series)
    }
}

/// Scan a line for numeric literals, left to right.
fn tokenize(line: &str) -> std::result::Result<Vec<f64>, String> {
    NUMBER_REGEX
        .find_iter(line)
        .map(|m| {
            m.as_str()
                .parse::<f64>()
                .map_err(|e| format!("bad number '{}': {}", m.as_str(), e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> CoordinateSeries {
        NumericSeriesParser::new().parse_str(text).unwrap()
    }

    #[test]
    fn test_even_token_count() {
        let series = parse("1 2 3 4 5 6");
        assert_eq!(series.x(), &[1.0, 3.0, 5.0]);
        assert_eq!(series.y(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_odd_token_count_drops_last() {
        let series = parse("1 2 3");
        assert_eq!(series.x(), &[1.0]);
        assert_eq!(series.y(), &[2.0]);

        let series = parse("0 0 1 1 2");
        assert_eq!(series.len(), 2);
        assert_eq!(series.x(), &[0.0, 1.0]);
    }

    #[test]
    fn test_arbitrary_separators_and_signs() {
        let series = parse("x=-1.5, y=+2; (3., -4.25)");
        assert_eq!(series.x(), &[-1.5, 3.0]);
        assert_eq!(series.y(), &[2.0, -4.25]);
    }

    #[test]
    fn test_exponent_is_not_recognized() {
        // "1e3" reads as two tokens: 1 and 3.
        let series = parse("1e3");
        assert_eq!(series.x(), &[1.0]);
        assert_eq!(series.y(), &[3.0]);
    }

    #[test]
    fn test_only_first_non_blank_line_is_used() {
        let series = parse("\n   \n1 2 3 4\n5 6 7 8\n");
        assert_eq!(series.x(), &[1.0, 3.0]);
        assert_eq!(series.y(), &[2.0, 4.0]);
    }

    #[test]
    fn test_no_numbers() {
        let parser = NumericSeriesParser::new();
        assert!(parser.parse_str("no numbers here").is_err());
        assert!(parser.parse_str("").is_err());
        assert!(parser.parse_str("\n\n").is_err());
        // A single value is not a point.
        assert!(parser.parse_str("42").is_err());
    }

    #[test]
    fn test_points_preserve_order() {
        let series = parse("0 0 1 1 2 4");
        let points: Vec<_> = series.points().collect();
        assert_eq!(points, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10 20 30 40").unwrap();
        let series = NumericSeriesParser::new().parse(file.path()).unwrap();
        assert_eq!(series.x(), &[10.0, 30.0]);
        assert_eq!(series.y(), &[20.0, 40.0]);
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = NumericSeriesParser::new()
            .parse(dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_parse_file_without_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header only").unwrap();
        let err = NumericSeriesParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err, Error::DataFormat { .. }));
    }
}
