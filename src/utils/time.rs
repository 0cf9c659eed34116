//! Timecode parsing and formatting utilities
//!
//! Two directions are covered: human-typed durations such as `1m 3s` are
//! normalised into `HH:MM:SS` for the transcoder, and the text printed by a
//! media-inspection tool is scanned for its `Duration` line.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::model::DurationSeconds;

/// A duration split into hour, minute and second fields.
///
/// Fields are kept verbatim: `90` seconds stays `00:00:90`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Timecode {
    /// Parse a human duration (`1m3s`, `2m 30`, `45`, `1:02:03`).
    ///
    /// Never fails: numeric tokens are read right to left as seconds,
    /// minutes, hours; missing fields are zero and anything left of the
    /// hours field is dropped. A trailing `m` field gets an explicit zero
    /// seconds field so that `2m` reads as two minutes.
    pub fn from_human(input: &str) -> Self {
        let marked = trailing_minutes().replace(input.trim(), "${1}m0s");

        let tokens: Vec<u64> = marked
            .split(|c: char| !c.is_ascii_digit())
            .filter(|token| !token.is_empty())
            .map(|token| token.parse().unwrap_or(0))
            .collect();

        let mut fields = tokens.iter().rev().copied().chain(std::iter::repeat(0));
        let seconds = fields.next().unwrap_or(0);
        let minutes = fields.next().unwrap_or(0);
        let hours = fields.next().unwrap_or(0);

        debug!(input, marked = %marked, ?tokens, hours, minutes, seconds, "parsed human duration");

        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Split a total number of seconds into carried fields
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Total length in seconds, `None` if it does not fit in a `u64`
    pub fn total_seconds(&self) -> Option<u64> {
        self.hours
            .checked_mul(3600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Normalise a human duration string into `HH:MM:SS`
pub fn normalize_human_duration(input: &str) -> String {
    Timecode::from_human(input).to_string()
}

/// Extract the duration from media-inspection output.
///
/// `Duration: H:MM:SS` yields whole seconds; failing that, `Duration: 12.50 s`
/// yields fractional seconds. `None` means the duration is unknown.
pub fn parse_tool_duration(tool_output: &str) -> Option<DurationSeconds> {
    for caps in colon_duration().captures_iter(tool_output) {
        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        let (Some(hours), Some(minutes), Some(seconds)) = (field(1), field(2), field(3)) else {
            debug!(line = &caps[0], "colon-form duration out of range");
            continue;
        };
        let timecode = Timecode {
            hours,
            minutes,
            seconds,
        };
        match timecode.total_seconds() {
            Some(total) => {
                debug!(%timecode, "matched colon-form duration");
                return Some(DurationSeconds::Whole(total));
            }
            None => debug!(%timecode, "colon-form duration out of range"),
        }
    }

    let caps = float_duration().captures(tool_output)?;
    let seconds = caps.get(1)?.as_str().parse::<f64>().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    debug!(seconds, "matched float-form duration");
    Some(DurationSeconds::Fractional(seconds))
}

fn trailing_minutes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*m\s*$").expect("valid regex"))
}

fn colon_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Duration[^\n]*?(\d+):(\d{2}):(\d{2})").expect("valid regex"))
}

fn float_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Duration[^\n]*?:\s*(\d+(?:\.\d+)?) s\b").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_minutes_and_seconds() {
        assert_eq!(normalize_human_duration("1m3s"), "00:01:03");
        assert_eq!(normalize_human_duration("1m 3s"), "00:01:03");
        assert_eq!(normalize_human_duration("2m30"), "00:02:30");
        assert_eq!(normalize_human_duration("2m 30"), "00:02:30");
    }

    #[test]
    fn test_normalize_bare_values() {
        assert_eq!(normalize_human_duration("45"), "00:00:45");
        assert_eq!(normalize_human_duration("45s"), "00:00:45");
        assert_eq!(normalize_human_duration("2m"), "00:02:00");
        assert_eq!(normalize_human_duration(""), "00:00:00");
    }

    #[test]
    fn test_normalize_does_not_carry() {
        // Fields are taken verbatim; 90 seconds is not folded into minutes.
        assert_eq!(normalize_human_duration("90"), "00:00:90");
        assert_eq!(normalize_human_duration("90s"), "00:00:90");
    }

    #[test]
    fn test_normalize_keeps_rightmost_three_fields() {
        assert_eq!(normalize_human_duration("1:02:03"), "01:02:03");
        assert_eq!(normalize_human_duration("9:1:02:03"), "01:02:03");
    }

    #[test]
    fn test_normalize_ignores_stray_characters() {
        assert_eq!(normalize_human_duration("abc"), "00:00:00");
        assert_eq!(normalize_human_duration("1x2"), "00:01:02");
    }

    #[test]
    fn test_parse_colon_duration() {
        let output = "File Name : clip.mp4\nDuration                        : 0:01:30\n";
        assert_eq!(parse_tool_duration(output), Some(DurationSeconds::Whole(90)));
        assert_eq!(
            parse_tool_duration("  Duration: 00:01:30.04, start: 0.000000"),
            Some(DurationSeconds::Whole(90))
        );
        assert_eq!(
            parse_tool_duration("Duration: 12:01:30"),
            Some(DurationSeconds::Whole(43290))
        );
    }

    #[test]
    fn test_parse_float_duration() {
        assert_eq!(
            parse_tool_duration("Duration                        : 12.50 s"),
            Some(DurationSeconds::Fractional(12.5))
        );
        assert_eq!(
            parse_tool_duration("Duration: 12.50 s"),
            Some(DurationSeconds::Fractional(12.5))
        );
    }

    #[test]
    fn test_parse_missing_duration() {
        assert_eq!(parse_tool_duration("Image Size : 640x480"), None);
        assert_eq!(parse_tool_duration(""), None);
    }

    #[test]
    fn test_total_seconds_overflow() {
        let huge = Timecode {
            hours: u64::MAX / 1000,
            minutes: 0,
            seconds: 0,
        };
        assert_eq!(huge.total_seconds(), None);
        assert_eq!(Timecode::from_human("1:02:03").total_seconds(), Some(3723));
    }

    #[test]
    fn test_parse_oversized_duration() {
        assert_eq!(parse_tool_duration("Duration: 9999999999999999:00:00"), None);
        assert_eq!(
            parse_tool_duration("Duration: 99999999999999999999:00:00\nDuration: 12.5 s"),
            Some(DurationSeconds::Fractional(12.5))
        );
        assert_eq!(
            parse_tool_duration("Duration: 9999999999999999:00:00\nDuration: 0:00:42"),
            Some(DurationSeconds::Whole(42))
        );
    }

    #[test]
    fn test_duration_round_trip() {
        for total in [0u64, 59, 60, 90, 3599, 3600, 43290, 86399] {
            let text = format!("Duration: {}", Timecode::from_total_seconds(total));
            assert_eq!(parse_tool_duration(&text), Some(DurationSeconds::Whole(total)));
        }
    }
}
