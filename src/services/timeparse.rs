use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

// Checked in this order; the first pattern that matches wins.
static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*(am|pm)?\b").unwrap());

static HOUR_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*(am|pm)\b").unwrap());

static HOUR_OCLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*o'?clock\b").unwrap());

static DURATION_HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*(?:hours?|hrs?)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

pub fn to_24_hour(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem.map(|m| m.to_ascii_lowercase()).as_deref() {
        Some("pm") if hour != 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    }
}

pub fn extract_time(text: &str) -> Option<TimeOfDay> {
    if let Some(caps) = CLOCK_TIME.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let meridiem = caps.get(3).map(|m| m.as_str());
        return valid(to_24_hour(hour, meridiem), minute);
    }

    if let Some(caps) = HOUR_MERIDIEM.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        return valid(to_24_hour(hour, Some(&caps[2])), 0);
    }

    if let Some(caps) = HOUR_OCLOCK.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        return valid(hour, 0);
    }

    None
}

fn valid(hour: u32, minute: u32) -> Option<TimeOfDay> {
    if hour < 24 && minute < 60 {
        Some(TimeOfDay { hour, minute })
    } else {
        tracing::debug!(hour, minute, "ignoring out-of-range time");
        None
    }
}

// `N hour(s)` / `N hr(s)`. Zero hours counts as no duration.
pub fn extract_duration(text: &str) -> Option<Duration> {
    let caps = DURATION_HOURS.captures(text)?;
    let hours: i64 = caps[1].parse().ok()?;
    (hours > 0).then(|| Duration::hours(hours))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour_of(text: &str) -> Option<u32> {
        extract_time(text).map(|t| t.hour)
    }

    #[test]
    fn test_meridiem_conversion() {
        assert_eq!(hour_of("call at 9pm"), Some(21));
        assert_eq!(hour_of("call at 12am"), Some(0));
        assert_eq!(hour_of("call at 12pm"), Some(12));
        assert_eq!(hour_of("call at 9 AM"), Some(9));
    }

    #[test]
    fn test_clock_time_with_minutes() {
        assert_eq!(
            extract_time("Team sync tomorrow at 14:30 for 2 hours"),
            Some(TimeOfDay { hour: 14, minute: 30 })
        );
        assert_eq!(
            extract_time("lunch 1:15pm"),
            Some(TimeOfDay { hour: 13, minute: 15 })
        );
    }

    #[test]
    fn test_oclock() {
        assert_eq!(
            extract_time("standup at 8 o'clock"),
            Some(TimeOfDay { hour: 8, minute: 0 })
        );
        assert_eq!(hour_of("standup at 7 oclock"), Some(7));
    }

    #[test]
    fn test_clock_pattern_takes_priority() {
        // Both "10:45" and "3pm" appear; the HH:MM pattern is checked first.
        assert_eq!(
            extract_time("move 3pm slot to 10:45"),
            Some(TimeOfDay { hour: 10, minute: 45 })
        );
    }

    #[test]
    fn test_out_of_range_time_is_ignored() {
        assert_eq!(extract_time("at 25:00"), None);
        assert_eq!(extract_time("at 14:30pm"), None);
    }

    #[test]
    fn test_no_time() {
        assert_eq!(extract_time("quick chat"), None);
    }

    #[test]
    fn test_duration() {
        assert_eq!(extract_duration("for 2 hours"), Some(Duration::hours(2)));
        assert_eq!(extract_duration("for 1 hour"), Some(Duration::hours(1)));
        assert_eq!(extract_duration("3hrs workshop"), Some(Duration::hours(3)));
        assert_eq!(extract_duration("a 4 hr block"), Some(Duration::hours(4)));
        assert_eq!(extract_duration("0 hours"), None);
        assert_eq!(extract_duration("quick chat"), None);
    }
}
