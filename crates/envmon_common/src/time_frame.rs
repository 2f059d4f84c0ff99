//! Symbolic time frames and the windows they resolve to.
//!
//! Durations are fixed approximations (a month is 30 days, a year 365 days),
//! not calendar arithmetic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lookback period requested by a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 5] = [
        TimeFrame::Hour,
        TimeFrame::Day,
        TimeFrame::Week,
        TimeFrame::Month,
        TimeFrame::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Hour => "hour",
            TimeFrame::Day => "day",
            TimeFrame::Week => "week",
            TimeFrame::Month => "month",
            TimeFrame::Year => "year",
        }
    }

    /// Parse a token, falling back to `Day` for anything unrecognized.
    pub fn parse_lenient(token: Option<&str>) -> TimeFrame {
        match token {
            Some("hour") => TimeFrame::Hour,
            Some("day") => TimeFrame::Day,
            Some("week") => TimeFrame::Week,
            Some("month") => TimeFrame::Month,
            Some("year") => TimeFrame::Year,
            Some(other) => {
                debug!("Unknown time frame '{}', defaulting to day", other);
                TimeFrame::Day
            }
            None => TimeFrame::Day,
        }
    }

    /// Lookback duration of the query window
    pub fn lookback(&self) -> Duration {
        match self {
            TimeFrame::Hour => Duration::hours(1),
            TimeFrame::Day => Duration::hours(24),
            TimeFrame::Week => Duration::days(7),
            TimeFrame::Month => Duration::days(30),
            TimeFrame::Year => Duration::days(365),
        }
    }

    /// Point count and spacing of a synthesized series
    pub fn synthetic_shape(&self) -> (usize, Duration) {
        match self {
            TimeFrame::Hour => (60, Duration::minutes(1)),
            TimeFrame::Day => (24, Duration::hours(1)),
            TimeFrame::Week => (7, Duration::days(1)),
            TimeFrame::Month => (30, Duration::days(1)),
            TimeFrame::Year => (12, Duration::days(30)),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete `[start, end]` instant pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Resolve a time frame into the window ending at `now`.
pub fn resolve(time_frame: TimeFrame, now: DateTime<Utc>) -> Window {
    Window {
        start: now - time_frame.lookback(),
        end: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_durations() {
        let expected = [
            (TimeFrame::Hour, Duration::hours(1)),
            (TimeFrame::Day, Duration::hours(24)),
            (TimeFrame::Week, Duration::days(7)),
            (TimeFrame::Month, Duration::days(30)),
            (TimeFrame::Year, Duration::days(365)),
        ];

        for (frame, duration) in expected {
            let window = resolve(frame, now());
            assert_eq!(window.end, now());
            assert!(window.start < window.end, "{frame}: start must precede end");
            assert_eq!(window.duration(), duration, "{frame}");
        }
    }

    #[test]
    fn test_parse_lenient_defaults_to_day() {
        assert_eq!(TimeFrame::parse_lenient(Some("week")), TimeFrame::Week);
        assert_eq!(TimeFrame::parse_lenient(Some("decade")), TimeFrame::Day);
        assert_eq!(TimeFrame::parse_lenient(Some("HOUR")), TimeFrame::Day);
        assert_eq!(TimeFrame::parse_lenient(None), TimeFrame::Day);
    }

    #[test]
    fn test_synthetic_shapes() {
        assert_eq!(TimeFrame::Hour.synthetic_shape(), (60, Duration::minutes(1)));
        assert_eq!(TimeFrame::Year.synthetic_shape(), (12, Duration::days(30)));
        assert_eq!(TimeFrame::default(), TimeFrame::Day);
    }
}
