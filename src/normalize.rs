//! Normalization of loosely formatted date strings into canonical `YYYY-MM-DD` form.

use chrono::{DateTime, Datelike as _, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Regex pattern for a canonical calendar date.
pub const CANONICAL_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$";

/// Regex pattern for the start of an ISO 8601 date-time.
pub const ISO_DATETIME_PREFIX_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T";

/// Regex pattern for a US-style slash date at the start of a string.
pub const SLASH_DATE_PATTERN: &str =
    r"^(?<month>[0-9]{1,2})/(?<day>[0-9]{1,2})/(?<year>[0-9]{4})";

/// ISO date-time layouts carrying an explicit offset.
const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// ISO date-time layouts without an offset, read as local wall-clock time.
const ISO_LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Space-separated date-time layouts carrying an explicit offset.
const SPACED_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M %:z",
];

/// Month-name date layouts tried before free-text parsing.
const MONTH_NAME_FORMATS: &[&str] = &["%b %d %Y", "%b %d, %Y", "%a %b %d %Y", "%d %b %Y"];

/// Largest year that still encodes as four digits.
const MAX_CANONICAL_YEAR: i32 = 9999;

/// Normalize a date in the local timezone.
///
/// Returns the canonical `YYYY-MM-DD` date, or an empty string when the input is
/// blank or cannot be understood as a date.
///
/// # Examples
///
/// ```
/// use date_only::normalize::normalize;
///
/// assert_eq!(normalize(Some("2024-03-07")), "2024-03-07");
/// assert_eq!(normalize(Some("03/07/2024")), "2024-03-07");
/// assert_eq!(normalize(Some("   ")), "");
/// assert_eq!(normalize(None), "");
/// ```
#[must_use]
pub fn normalize(input: Option<&str>) -> String {
    normalize_in(input, &Local)
}

/// Normalize a date, truncating instants to calendar dates in `tz`.
///
/// Rules are tried in order and the first one that applies wins:
///
/// 1. blank input yields an empty string;
/// 2. an already canonical date is returned unchanged;
/// 3. an ISO date-time is parsed in full and truncated to its date in `tz`;
/// 4. a `M/D/YYYY` prefix is read month first;
/// 5. anything else goes through the general-purpose parsers.
#[must_use]
pub fn normalize_in<Tz: TimeZone>(input: Option<&str>, tz: &Tz) -> String {
    let s = input.map_or("", str::trim);
    if s.is_empty() {
        return String::new();
    }

    if is_canonical(s) {
        return s.to_string();
    }

    if matches(ISO_DATETIME_PREFIX_PATTERN, s) {
        log::debug!("Normalizing {s:?} as an ISO date-time...");
        return parse_iso_datetime(s, tz)
            .and_then(encode)
            .unwrap_or_default();
    }

    if let Some(canonical) = slash_date(s) {
        log::debug!("Normalized {s:?} as a month-first slash date");
        return canonical;
    }

    log::debug!("Falling back to general date parsing for {s:?}...");
    parse_general(s, tz).and_then(encode).unwrap_or_default()
}

/// Check whether a string has the exact `YYYY-MM-DD` shape.
///
/// Only the shape is checked: `2024-13-45` is considered canonical.
#[must_use]
pub fn is_canonical(s: &str) -> bool {
    matches(CANONICAL_PATTERN, s)
}

/// Today's local calendar date in canonical form.
#[must_use]
pub fn today() -> String {
    today_in(&Local)
}

/// Today's calendar date in `tz`, in canonical form.
#[must_use]
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> String {
    encode(Utc::now().with_timezone(tz).date_naive()).unwrap_or_default()
}

/// Encode a calendar date as `YYYY-MM-DD`.
///
/// Returns `None` for years outside `0..=9999`, which have no four-digit form.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use date_only::normalize::encode;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(encode(date).as_deref(), Some("2024-03-07"));
/// let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
/// assert_eq!(encode(far), None);
/// ```
#[must_use]
pub fn encode(date: NaiveDate) -> Option<String> {
    if !(0..=MAX_CANONICAL_YEAR).contains(&date.year()) {
        log::debug!("Year of {date} has no four-digit form, not encoding it");
        return None;
    }
    Some(date.format("%Y-%m-%d").to_string())
}

/// Parse a date-time that carries an explicit offset.
///
/// Accepts RFC 3339 and RFC 2822, ISO or space-separated date-times with
/// optional seconds, and `Z`, `±HH:MM` or `±HHMM` offsets.
pub(crate) fn parse_offset_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }

    let zoned = s
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| s.to_string(), |rest| format!("{rest}+00:00"));
    ISO_OFFSET_FORMATS
        .iter()
        .chain(SPACED_OFFSET_FORMATS)
        .find_map(|format| DateTime::parse_from_str(&zoned, format).ok())
}

fn matches(pattern: &str, s: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(s),
        Err(err) => {
            log::warn!("Invalid date pattern {pattern:?}: {err}");
            false
        }
    }
}

fn slash_date(s: &str) -> Option<String> {
    let re = Regex::new(SLASH_DATE_PATTERN).ok()?;
    let captures = re.captures(s)?;
    let month: u32 = captures["month"].parse().ok()?;
    let day: u32 = captures["day"].parse().ok()?;
    let year: u32 = captures["year"].parse().ok()?;
    if year == 0 || month == 0 || day == 0 {
        log::debug!("Slash date {s:?} has a zero component, not treating it as a date");
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn parse_iso_datetime<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<NaiveDate> {
    if let Some(dt) = parse_offset_datetime(s) {
        return Some(dt.with_timezone(tz).date_naive());
    }

    ISO_LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|dt| dt.date())
}

fn parse_general<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<NaiveDate> {
    if let Some(dt) = parse_offset_datetime(s) {
        return Some(dt.with_timezone(tz).date_naive());
    }

    if let Some(date) = MONTH_NAME_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
    {
        return Some(date);
    }

    // two_timer::parse returns (NaiveDateTime, NaiveDateTime, bool)
    match two_timer::parse(s, None) {
        Ok((start, _end, _)) => Some(start.date()),
        Err(err) => {
            log::debug!("Could not parse {s:?} as a date: {err:?}");
            None
        }
    }
}
