//! Compact duration tokens (`1h`, `2w`, `999ms`) used in `GROUP BY time(...)`.

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Whole-second units, coarsest first.
const UNITS: [(u64, &str); 5] = [(WEEK, "w"), (DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (1, "s")];

/// Format a duration using the coarsest unit it is a whole multiple of.
///
/// Durations that are not whole seconds fall back to milliseconds when
/// exact, otherwise to truncated microseconds. Anything under a
/// millisecond, zero included, is written in microseconds.
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        let secs = duration.as_secs();
        for (unit_secs, unit) in UNITS {
            if secs >= unit_secs && secs % unit_secs == 0 {
                return format!("{}{}", secs / unit_secs, unit);
            }
        }
    }

    let nanos = duration.as_nanos();
    if nanos >= 1_000_000 && nanos % 1_000_000 == 0 {
        return format!("{}ms", nanos / 1_000_000);
    }
    format!("{}us", duration.as_micros())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mins(n: u64) -> Duration {
        Duration::from_secs(n * MINUTE)
    }

    fn hours(n: u64) -> Duration {
        Duration::from_secs(n * HOUR)
    }

    #[test]
    fn test_whole_units() {
        assert_eq!(format_duration(Duration::from_secs(2 * WEEK)), "2w");
        assert_eq!(format_duration(Duration::from_secs(2 * WEEK) + mins(2)), "20162m");
        assert_eq!(format_duration(Duration::from_secs(30 * DAY)), "30d");
        assert_eq!(format_duration(Duration::from_secs(2 * DAY)), "2d");
        assert_eq!(format_duration(Duration::from_secs(2 * DAY) + hours(2)), "50h");
        assert_eq!(
            format_duration(Duration::from_secs(2 * DAY) + hours(2) + mins(1)),
            "3001m"
        );
        assert_eq!(format_duration(hours(36)), "36h");
        assert_eq!(format_duration(hours(24)), "1d");
        assert_eq!(format_duration(hours(16)), "16h");
        assert_eq!(format_duration(hours(1)), "1h");
        assert_eq!(format_duration(mins(120)), "2h");
        assert_eq!(format_duration(mins(90)), "90m");
        assert_eq!(format_duration(mins(59)), "59m");
        assert_eq!(format_duration(mins(1)), "1m");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::from_secs(1)), "1s");
    }

    #[test]
    fn test_sub_second_units() {
        assert_eq!(format_duration(Duration::from_millis(2000)), "2s");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1)), "1ms");
        assert_eq!(format_duration(Duration::from_micros(2000)), "2ms");
        assert_eq!(format_duration(Duration::from_micros(2500)), "2500us");
        assert_eq!(format_duration(Duration::from_micros(999)), "999us");
        assert_eq!(format_duration(Duration::from_micros(1)), "1us");
    }

    #[test]
    fn test_mixed_seconds_fall_back() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::new(1, 1_000)), "1000001us");
        // Sub-microsecond remainders are dropped, not rounded.
        assert_eq!(format_duration(Duration::from_nanos(1_999)), "1us");
        assert_eq!(format_duration(Duration::ZERO), "0us");
    }
}
