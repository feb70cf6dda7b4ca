//! Rendering of canonical dates into display templates.
//!
//! Templates use a small token language:
//!
//! | Token  | Output                          |
//! |--------|---------------------------------|
//! | `D`    | day, unpadded                   |
//! | `DD`   | day, zero-padded to two digits  |
//! | `M`    | month number, unpadded          |
//! | `MM`   | full month name                 |
//! | `MMM`  | three-letter month abbreviation |
//! | `MMMM` | full month name                 |
//! | `YY`   | last two digits of the year     |
//! | `YYYY` | the year                        |
//!
//! Everything else in a template is copied through as-is.

use regex::Regex;

use crate::normalize::CANONICAL_PATTERN;

/// The display template used when the host configures none.
pub const DEFAULT_FORMAT: &str = "DD of MM, YYYY";

/// Text shown in place of a date that cannot be displayed.
pub const PLACEHOLDER: &str = "—";

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Template tokens, longest first so that shorter tokens never split a longer one.
const TOKENS: [Token; 8] = [
    Token::Year4,
    Token::Year2,
    Token::MonthName,
    Token::MonthShort,
    Token::MonthNameQuirk,
    Token::Month,
    Token::Day2,
    Token::Day,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    MonthName,
    MonthShort,
    /// `MM` renders the full month name, not a padded month number.
    MonthNameQuirk,
    Month,
    Day2,
    Day,
}

impl Token {
    fn text(self) -> &'static str {
        match self {
            Self::Year4 => "YYYY",
            Self::Year2 => "YY",
            Self::MonthName => "MMMM",
            Self::MonthShort => "MMM",
            Self::MonthNameQuirk => "MM",
            Self::Month => "M",
            Self::Day2 => "DD",
            Self::Day => "D",
        }
    }

    fn render(self, parts: &DateParts) -> String {
        match self {
            Self::Year4 => parts.year.to_string(),
            Self::Year2 => {
                let year = parts.year.to_string();
                let start = year.len().saturating_sub(2);
                year[start..].to_string()
            }
            Self::MonthName | Self::MonthNameQuirk => parts
                .month_name()
                .map_or_else(|| parts.month.to_string(), str::to_string),
            Self::MonthShort => parts
                .month_name()
                .map_or_else(|| parts.month.to_string(), |name| name[..3].to_string()),
            Self::Month => parts.month.to_string(),
            Self::Day2 => format!("{:02}", parts.day),
            Self::Day => parts.day.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct DateParts {
    year: u32,
    month: u32,
    day: u32,
}

impl DateParts {
    fn parse(iso: &str) -> Option<Self> {
        if !Regex::new(CANONICAL_PATTERN).ok()?.is_match(iso) {
            return None;
        }
        let mut parts = iso.split('-').map(str::parse::<u32>);
        let year = parts.next()?.ok()?;
        let month = parts.next()?.ok()?;
        let day = parts.next()?.ok()?;
        if year == 0 || month == 0 || day == 0 {
            return None;
        }
        Some(Self { year, month, day })
    }

    fn month_name(&self) -> Option<&'static str> {
        let index = usize::try_from(self.month).ok()?.checked_sub(1)?;
        MONTH_NAMES.get(index).copied()
    }
}

/// Render a canonical date into a display template.
///
/// Returns an empty string when `iso` is not a canonical `YYYY-MM-DD` date or
/// when its year, month or day is zero.
///
/// # Examples
///
/// ```
/// use date_only::format::format_date;
///
/// assert_eq!(format_date("2024-03-07", "DD of MM, YYYY"), "07 of March, 2024");
/// assert_eq!(format_date("2024-03-07", "D/M/YY"), "7/3/24");
/// assert_eq!(format_date("", "DD of MM, YYYY"), "");
/// ```
#[must_use]
pub fn format_date(iso: &str, template: &str) -> String {
    let Some(parts) = DateParts::parse(iso) else {
        return String::new();
    };

    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(t.text())) {
            out.push_str(&token.render(&parts));
            rest = &rest[token.text().len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    log::trace!("Formatted {iso:?} with {template:?} as {out:?}");
    out
}

/// Display text for a stored value, falling back to [`PLACEHOLDER`].
#[must_use]
pub fn display_text(value: &str, template: &str) -> String {
    let text = format_date(value, template);
    if value.is_empty() || text.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_default_template() {
        assert_eq!(
            format_date("2024-03-07", DEFAULT_FORMAT),
            "07 of March, 2024"
        );
    }

    #[test]
    fn mm_is_the_full_month_name() {
        assert_eq!(format_date("2024-03-07", "YYYY-MM-DD"), "2024-March-07");
    }

    #[test]
    fn formats_every_token() {
        assert_eq!(format_date("2024-03-07", "D"), "7");
        assert_eq!(format_date("2024-03-07", "DD"), "07");
        assert_eq!(format_date("2024-03-07", "M"), "3");
        assert_eq!(format_date("2024-03-07", "MM"), "March");
        assert_eq!(format_date("2024-03-07", "MMM"), "Mar");
        assert_eq!(format_date("2024-03-07", "MMMM"), "March");
        assert_eq!(format_date("2024-03-07", "YY"), "24");
        assert_eq!(format_date("2024-03-07", "YYYY"), "2024");
    }

    #[test]
    fn substituted_names_are_not_rescanned() {
        assert_eq!(format_date("2024-12-25", "D MMM YY"), "25 Dec 24");
        assert_eq!(format_date("2024-12-25", "MMMM D"), "December 25");
        assert_eq!(format_date("2024-05-01", "MM"), "May");
    }

    #[test]
    fn longer_tokens_win() {
        assert_eq!(format_date("2024-03-07", "YYY"), "24Y");
        assert_eq!(format_date("2024-03-07", "MMMMM"), "March3");
        assert_eq!(format_date("2024-03-07", "DDD"), "077");
    }

    #[test]
    fn literal_text_passes_through() {
        assert_eq!(
            format_date("2024-03-07", "Week of D — (x) ü"),
            "Week of 7 — (x) ü"
        );
        assert_eq!(format_date("2024-03-07", ""), "");
    }

    #[test]
    fn year_is_not_padded() {
        assert_eq!(format_date("0024-03-07", "YYYY"), "24");
        assert_eq!(format_date("0005-03-07", "YY/YYYY"), "5/5");
    }

    #[test]
    fn rejects_non_canonical_input() {
        assert_eq!(format_date("", "YYYY"), "");
        assert_eq!(format_date("2024-3-7", "YYYY"), "");
        assert_eq!(format_date("03/07/2024", "YYYY"), "");
        assert_eq!(format_date("2024-03-07T00:00:00Z", "YYYY"), "");
    }

    #[test]
    fn rejects_zero_components() {
        assert_eq!(format_date("0000-03-07", "YYYY"), "");
        assert_eq!(format_date("2024-00-07", "YYYY"), "");
        assert_eq!(format_date("2024-13-00", "YYYY"), "");
    }

    #[test]
    fn renders_each_token_text() {
        let parts = DateParts::parse("1999-11-09").unwrap();
        let rendered: Vec<_> = TOKENS.iter().map(|t| t.render(&parts)).collect();
        assert_eq!(
            rendered,
            ["1999", "99", "November", "Nov", "November", "11", "09", "9"]
        );
    }

    #[test]
    fn out_of_range_month_renders_number() {
        assert_eq!(format_date("2024-13-05", "DD MMM YYYY"), "05 13 2024");
        assert_eq!(format_date("2024-02-31", "MMMM D"), "February 31");
    }

    #[test]
    fn display_text_uses_placeholder() {
        assert_eq!(display_text("", DEFAULT_FORMAT), PLACEHOLDER);
        assert_eq!(display_text("2024-00-07", DEFAULT_FORMAT), PLACEHOLDER);
        assert_eq!(display_text("2024-03-07", ""), PLACEHOLDER);
        assert_eq!(display_text("2024-03-07", "D MMM"), "7 Mar");
    }
}
