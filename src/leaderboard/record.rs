//! Score Records
//!
//! One leaderboard entry per line, `pseudo,seconds`, where seconds is the
//! centisecond chrono divided by 100 (`523` is written `5.23`, `500` is
//! written `5`).

use serde::{Deserialize, Serialize};

use crate::game::timer::centiseconds_to_seconds;

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player pseudo (validated, never contains a comma or line break)
    pub pseudo: String,
    /// Completion time in centiseconds
    pub centiseconds: u32,
}

impl ScoreRecord {
    /// Create a record.
    pub fn new(pseudo: impl Into<String>, centiseconds: u32) -> Self {
        Self {
            pseudo: pseudo.into(),
            centiseconds,
        }
    }

    /// Completion time in seconds.
    #[inline]
    pub fn seconds(&self) -> f64 {
        centiseconds_to_seconds(self.centiseconds)
    }

    /// Encode as a store line (without the line break).
    pub fn to_line(&self) -> String {
        format!("{},{}", self.pseudo, self.seconds())
    }

    /// Decode a store line. Returns `None` for anything malformed.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.trim().split(',');
        let pseudo = fields.next()?;
        let seconds: f64 = fields.next()?.trim().parse().ok()?;
        if pseudo.is_empty() || !seconds.is_finite() || seconds <= 0.0 {
            return None;
        }
        let centis = (seconds * 100.0).round();
        if centis < 1.0 || centis > u32::MAX as f64 {
            return None;
        }
        Some(Self::new(pseudo, centis as u32))
    }
}

/// Decode a whole store file, skipping malformed lines.
pub fn parse_records(text: &str) -> Vec<ScoreRecord> {
    text.lines().filter_map(ScoreRecord::parse_line).collect()
}

/// Encode records as store lines, each terminated by `\n`.
pub fn format_records(records: &[ScoreRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        assert_eq!(ScoreRecord::new("Alice", 523).to_line(), "Alice,5.23");
        assert_eq!(ScoreRecord::new("Alice", 500).to_line(), "Alice,5");
        assert_eq!(ScoreRecord::new("Alice", 510).to_line(), "Alice,5.1");
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(ScoreRecord::parse_line("Alice,5.23"), Some(ScoreRecord::new("Alice", 523)));
        assert_eq!(ScoreRecord::parse_line("Bobby,12\r"), Some(ScoreRecord::new("Bobby", 1200)));
        // Extra fields are ignored
        assert_eq!(ScoreRecord::parse_line("Carl,7.5,x"), Some(ScoreRecord::new("Carl", 750)));
        // Zero is not a completion time
        assert_eq!(ScoreRecord::parse_line("Zed,0"), None);
        assert_eq!(ScoreRecord::parse_line("Zed,0.0"), None);
        assert_eq!(ScoreRecord::parse_line("Zed,0.001"), None);
        // Legacy placeholder entry still parses
        assert_eq!(ScoreRecord::parse_line("RAZ,3600"), Some(ScoreRecord::new("RAZ", 360_000)));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let text = "Alice,5.23\n\njunk\nBob,abc\n,4\nEve,-1\nZed,0\nDave,6\n";
        let records = parse_records(text);
        assert_eq!(
            records,
            vec![ScoreRecord::new("Alice", 523), ScoreRecord::new("Dave", 600)]
        );
    }

    #[test]
    fn test_file_format() {
        let records = vec![ScoreRecord::new("Alice", 300), ScoreRecord::new("Bobby", 425)];
        let text = format_records(&records);
        assert_eq!(text, "Alice,3\nBobby,4.25\n");
        assert_eq!(parse_records(&text), records);
    }
}
