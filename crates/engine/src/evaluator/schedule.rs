//! Recurring time-window check

use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;
use lead_router_config::TimeWindow;
use lead_router_core::{ConditionCheck, ConditionKey};

fn day_allowed(window: &TimeWindow, day: Weekday) -> bool {
    window.days.as_ref().map_or(true, |days| days.contains(&day))
}

/// Whether `now` falls inside `window`, in the window's timezone
pub(crate) fn window_contains(window: &TimeWindow, now: DateTime<Utc>, default_tz: Tz) -> bool {
    let tz = window.timezone.unwrap_or(default_tz);
    let local = now.with_timezone(&tz);
    let time = local.time();
    let day = local.weekday();
    let (start, end) = (window.start.time(), window.end.time());

    if start < end {
        time >= start && time < end && day_allowed(window, day)
    } else if end < start {
        // Overnight: the early-morning part belongs to the previous day
        (time >= start && day_allowed(window, day)) || (time < end && day_allowed(window, day.pred()))
    } else {
        false
    }
}

pub(crate) fn check_time_windows(
    windows: &[TimeWindow],
    now: DateTime<Utc>,
    default_tz: Tz,
) -> ConditionCheck {
    let key = ConditionKey::TimeWindows;

    if windows.iter().any(|w| window_contains(w, now, default_tz)) {
        ConditionCheck::pass(key)
    } else {
        ConditionCheck::fail(
            key,
            format!("{} is outside all {} window(s)", now.to_rfc3339(), windows.len()),
        )
    }
}
