use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::EventDraft;
use crate::services::timeparse::{extract_duration, extract_time};

const DEFAULT_HOUR: u32 = 10;
const DEFAULT_TITLE: &str = "New event";
const TITLE_TOKENS: usize = 3;

static TITLE_BEFORE_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?)\s+(?:at|on|tomorrow|today|next|this)\b").unwrap()
});

pub fn build_fallback_event(message: &str, now: DateTime<Tz>) -> EventDraft {
    let tz = now.timezone();
    let text = message.trim();
    let lower = text.to_lowercase();

    let title = fallback_title(text);

    let mut date = now.date_naive() + Duration::days(1);
    let mut time = NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);

    if let Some(t) = extract_time(text) {
        time = NaiveTime::from_hms_opt(t.hour, t.minute, 0).unwrap_or(time);
    }

    let duration = extract_duration(text).unwrap_or_else(|| Duration::hours(1));

    if lower.contains("today") {
        date = now.date_naive();
    }
    // Compounds with whatever date is already set, so the default yields tomorrow + 7.
    if lower.contains("next week") {
        date += Duration::days(7);
    }

    let start = localize(tz, date, time);
    let end = start + duration;

    tracing::debug!(
        title = %title,
        start = %start.to_rfc3339(),
        end = %end.to_rfc3339(),
        "built fallback event"
    );

    let description = Some(format!("Created from message: \"{text}\""));
    EventDraft::new(title.clone(), start, end, description.clone()).unwrap_or_else(|_| {
        // Unreachable in practice: the duration is at least one hour and the title non-empty.
        EventDraft {
            title,
            start_time: start,
            end_time: start + Duration::hours(1),
            description,
        }
    })
}

pub fn fallback_title(text: &str) -> String {
    let candidate = TITLE_BEFORE_CUE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());

    let title = candidate.unwrap_or_else(|| {
        text.split_whitespace()
            .take(TITLE_TOKENS)
            .collect::<Vec<_>>()
            .join(" ")
    });

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

// Resolves a wall-clock time in `tz`. Times skipped by a DST transition are
// read as UTC so the builder never fails.
pub fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
