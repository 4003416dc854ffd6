//! Date parsing and rendering for article and post timestamps.
//!
//! Every function takes `today` explicitly so callers (and merge in
//! particular) stay deterministic.

use std::sync::LazyLock;

use chrono::{DateTime, Days, NaiveDate};
use regex::Regex;

const DMY_FORMAT: &str = "%d/%m/%Y";

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(mo|h|d|w|m|y)\b").expect("valid regex")
});

/// Parse a `DD/MM/YYYY` date.
#[must_use]
pub fn parse_dmy(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DMY_FORMAT).ok()
}

#[must_use]
pub fn format_dmy(date: NaiveDate) -> String {
    date.format(DMY_FORMAT).to_string()
}

/// Resolve a LinkedIn-style relative stamp (`"3h"`, `"2d"`, `"1w"`, `"3mo"`,
/// `"1y"`) against `today`. Minutes and hours resolve to `today`; a month is
/// 30 days and a year 365.
#[must_use]
pub fn parse_relative(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = raw.trim().to_lowercase();
    let caps = RELATIVE_RE.captures(&lowered)?;
    let amount: u32 = caps.get(1)?.as_str().parse().ok()?;

    let days_per_unit: u64 = match caps.get(2)?.as_str() {
        "m" | "h" => return Some(today),
        "d" => 1,
        "w" => 7,
        "mo" => 30,
        "y" => 365,
        _ => return None,
    };
    today.checked_sub_days(Days::new(u64::from(amount) * days_per_unit))
}

/// Parse a calendar date in any of the shapes upstream services emit:
/// `DD/MM/YYYY`, `DD Month YYYY`, `YYYY-MM-DD`, or an RFC 3339 timestamp.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_dmy(trimmed) {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d %B %Y") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Parse a post timestamp, accepting relative stamps as well as calendar dates.
#[must_use]
pub fn parse_post_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    parse_relative(raw, today).or_else(|| parse_calendar_date(raw))
}

/// Render the age of `date` as `today`, `Nd`, `Nw`, `Nmo` or `Ny`.
///
/// Future dates render as `today`.
#[must_use]
pub fn relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let days = (today - date).num_days();
    match days {
        i64::MIN..=0 => "today".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

/// `DD/MM/YYYY - <relative>` as shown for posts in the report.
#[must_use]
pub fn post_date_label(date: NaiveDate, today: NaiveDate) -> String {
    format!("{} - {}", format_dmy(date), relative_label(date, today))
}

/// Normalise an article date to `DD/MM/YYYY`; unparseable input is returned
/// trimmed and unchanged.
#[must_use]
pub fn normalize_article_date(raw: &str) -> String {
    parse_calendar_date(raw).map_or_else(|| raw.trim().to_string(), format_dmy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_dmy() {
        assert_eq!(parse_dmy("05/03/2025"), Some(day(2025, 3, 5)));
        assert_eq!(parse_dmy("2025-03-05"), None);
        assert_eq!(format_dmy(day(2025, 3, 5)), "05/03/2025");
    }

    #[test]
    fn relative_stamps_resolve_against_today() {
        let today = day(2026, 1, 23);
        assert_eq!(parse_relative("3h", today), Some(today));
        assert_eq!(parse_relative("15m", today), Some(today));
        assert_eq!(parse_relative("3d", today), Some(day(2026, 1, 20)));
        assert_eq!(parse_relative("2w", today), Some(day(2026, 1, 9)));
        assert_eq!(parse_relative("3mo", today), Some(day(2025, 10, 25)));
        assert_eq!(parse_relative("1y", today), Some(day(2025, 1, 23)));
        assert_eq!(
            parse_relative("2w • Edited", today),
            Some(day(2026, 1, 9))
        );
        assert_eq!(parse_relative("yesterday", today), None);
    }

    #[test]
    fn calendar_dates_accept_iso_and_rfc3339() {
        assert_eq!(parse_calendar_date("2025-11-02"), Some(day(2025, 11, 2)));
        assert_eq!(
            parse_calendar_date("2025-11-02T08:15:00.000Z"),
            Some(day(2025, 11, 2))
        );
        assert_eq!(
            parse_calendar_date("2025-11-02T08:15:00+11:00"),
            Some(day(2025, 11, 2))
        );
        assert_eq!(parse_calendar_date("14 March 2025"), Some(day(2025, 3, 14)));
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("last week"), None);
    }

    #[test]
    fn relative_label_buckets() {
        let today = day(2026, 1, 23);
        assert_eq!(relative_label(today, today), "today");
        assert_eq!(relative_label(day(2026, 2, 1), today), "today");
        assert_eq!(relative_label(day(2026, 1, 20), today), "3d");
        assert_eq!(relative_label(day(2026, 1, 9), today), "2w");
        assert_eq!(relative_label(day(2025, 10, 20), today), "3mo");
        assert_eq!(relative_label(day(2024, 1, 1), today), "2y");
    }

    #[test]
    fn post_label_combines_both_forms() {
        let today = day(2026, 1, 23);
        assert_eq!(
            post_date_label(day(2026, 1, 20), today),
            "20/01/2026 - 3d"
        );
    }

    #[test]
    fn article_dates_normalise_or_pass_through() {
        assert_eq!(normalize_article_date("2025-06-30"), "30/06/2025");
        assert_eq!(normalize_article_date(" 30/06/2025 "), "30/06/2025");
        assert_eq!(normalize_article_date(" June 2025 "), "June 2025");
    }
}
