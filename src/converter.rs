//! Server-side conversion of stored values into typed calendar dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::normalize::parse_offset_datetime;

/// Alias of the property editor whose values this converter handles.
pub const EDITOR_ALIAS: &str = "UmbDateOnly";

/// Date-time layouts without an offset.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date layouts without a time of day.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Error returned when a conversion cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The intermediate value is missing.
    #[error("intermediate value is missing")]
    MissingIntermediate,
}

/// Value produced from the stored source before the final conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum Intermediate {
    /// A calendar date.
    Date(NaiveDate),
    /// Any other value.
    Other(Value),
}

/// How long converted values may be cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLevel {
    /// Cached with the element that owns the property.
    Element,
}

/// Converts stored date-only values into [`NaiveDate`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateOnlyValueConverter;

#[allow(clippy::unused_self)]
impl DateOnlyValueConverter {
    /// Whether this converter handles properties edited with `editor_alias`.
    #[must_use]
    pub fn is_converter(&self, editor_alias: &str) -> bool {
        editor_alias == EDITOR_ALIAS
    }

    /// Parse the stored source into an intermediate date.
    ///
    /// Tried in order: strict `yyyy-MM-dd`, a date-time with offset truncated
    /// to its date, then a generic date-time truncated to its date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use date_only::converter::{DateOnlyValueConverter, Intermediate};
    /// use serde_json::json;
    ///
    /// let converter = DateOnlyValueConverter;
    /// assert_eq!(
    ///     converter.source_to_intermediate(Some(&json!("2024-03-07"))),
    ///     Some(Intermediate::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()))
    /// );
    /// assert_eq!(converter.source_to_intermediate(Some(&json!("soon"))), None);
    /// ```
    #[must_use]
    pub fn source_to_intermediate(&self, source: Option<&Value>) -> Option<Intermediate> {
        let s = match source? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_offset_datetime(s).map(|dt| dt.date_naive()))
            .or_else(|| parse_datetime(s));
        if date.is_none() {
            log::debug!("Could not convert {s:?} to a date");
        }
        date.map(Intermediate::Date)
    }

    /// Turn the intermediate value into the final date.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingIntermediate`] if there is no intermediate value.
    pub fn intermediate_to_object(
        &self,
        intermediate: Option<&Intermediate>,
    ) -> Result<Option<NaiveDate>, ConvertError> {
        match intermediate.ok_or(ConvertError::MissingIntermediate)? {
            Intermediate::Date(date) => Ok(Some(*date)),
            Intermediate::Other(_) => Ok(None),
        }
    }

    /// Cache level for converted values.
    #[must_use]
    pub fn cache_level(&self) -> CacheLevel {
        CacheLevel::Element
    }

    /// Name of the type converted values have.
    #[must_use]
    pub fn property_value_type(&self) -> &'static str {
        std::any::type_name::<NaiveDate>()
    }

    /// Whether a value counts as set.
    #[must_use]
    pub fn is_value(&self, value: Option<&Intermediate>) -> bool {
        matches!(value, Some(Intermediate::Date(_)))
    }

    /// Convert a stored source straight to a date.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingIntermediate`] if the source does not
    /// hold a date.
    pub fn convert(&self, source: Option<&Value>) -> Result<Option<NaiveDate>, ConvertError> {
        let intermediate = self.source_to_intermediate(source);
        self.intermediate_to_object(intermediate.as_ref())
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDate> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        })
}
