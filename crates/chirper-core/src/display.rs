//! Presentation helpers shared by front-ends.

use crate::models::Chirp;
use chrono::{DateTime, Utc};

/// Humanised distance between `then` and `now`, e.g. "3 hours ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let secs = delta.num_seconds();
    let phrase = distance_phrase(secs.unsigned_abs());
    if secs < 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// Each span is rounded to its unit before it is compared with that unit's
/// limit, so 44.5 minutes already reads "an hour".
fn distance_phrase(secs: u64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;
    const MONTH: f64 = 30.4375 * DAY;
    const YEAR: f64 = 365.25 * DAY;

    let s = secs as f64;
    let rounded = |unit: f64| (s / unit).round() as u64;

    if secs <= 44 {
        return "a few seconds".to_string();
    }
    if secs <= 89 {
        return "a minute".to_string();
    }
    let minutes = rounded(MINUTE);
    if minutes <= 44 {
        return count(minutes, "a minute", "minute");
    }
    if minutes <= 89 {
        return "an hour".to_string();
    }
    let hours = rounded(HOUR);
    if hours <= 21 {
        return count(hours, "an hour", "hour");
    }
    if hours <= 35 {
        return "a day".to_string();
    }
    let days = rounded(DAY);
    if days <= 25 {
        return count(days, "a day", "day");
    }
    if days <= 45 {
        return "a month".to_string();
    }
    let months = rounded(MONTH);
    if months <= 10 {
        return count(months, "a month", "month");
    }
    if months <= 17 {
        return "a year".to_string();
    }
    count(rounded(YEAR), "a year", "year")
}

fn count(n: u64, one: &str, unit: &str) -> String {
    if n <= 1 {
        one.to_string()
    } else {
        format!("{} {}s", n, unit)
    }
}

/// `" · edited"` for chirps whose message changed after posting.
pub fn edited_marker(chirp: &Chirp) -> &'static str {
    if chirp.is_edited() {
        " · edited"
    } else {
        ""
    }
}
