use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::MapperError;

/// The fixed pattern used to write and read dates.
///
/// Patterns use `strftime` syntax. A pattern without time fields reads dates
/// as midnight.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use veil_mapper::DateFormat;
///
/// let format = DateFormat::new("%d/%m/%Y").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// assert_eq!(format.format(&date), "09/03/2024");
/// assert_eq!(format.parse("09/03/2024"), Some(date));
/// assert!(DateFormat::new("%Q").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: Box<str>,
}

impl DateFormat {
    /// The default pattern, day/month/year.
    pub const DEFAULT_PATTERN: &'static str = "%d/%m/%Y";

    /// Validates `pattern`.
    ///
    /// # Errors
    ///
    /// [`MapperError::InvalidDateFormat`] if the pattern has unknown
    /// specifiers or needs data a naive date does not have, such as a
    /// time zone.
    pub fn new(pattern: &str) -> Result<Self, MapperError> {
        let invalid = |reason: &str| MapperError::InvalidDateFormat {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unknown or malformed specifier"));
        }
        let mut probe = String::new();
        write!(probe, "{}", NaiveDateTime::default().format(pattern))
            .map_err(|_| invalid("pattern cannot format a date without time zone"))?;

        Ok(Self {
            pattern: pattern.into(),
        })
    }

    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Writes `date` with the pattern.
    pub fn format(&self, date: &NaiveDateTime) -> String {
        let mut out = String::new();
        // `new` has checked that the pattern formats naive dates.
        let _ = write!(out, "{}", date.format(&self.pattern));
        out
    }

    /// Reads `text` with the pattern; date-only patterns yield midnight.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, &self.pattern)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.pattern)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    /// Reads a timestamp in milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(millis).map(|at| at.naive_utc())
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: Self::DEFAULT_PATTERN.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DateFormat;
    use crate::MapperError;

    #[test]
    fn time_patterns_round_trip() {
        let format = DateFormat::new("%Y-%m-%d %H:%M:%S").unwrap();
        let at = NaiveDate::from_ymd_opt(2001, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        let text = format.format(&at);
        assert_eq!(text, "2001-12-31 23:59:01");
        assert_eq!(format.parse(&text), Some(at));
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(matches!(DateFormat::new(""), Err(MapperError::InvalidDateFormat { .. })));
        assert!(matches!(DateFormat::new("%d/%m/%Y %z"), Err(MapperError::InvalidDateFormat { .. })));
    }

    #[test]
    fn default_is_day_month_year() {
        let format = DateFormat::default();
        assert_eq!(format.pattern(), "%d/%m/%Y");
        assert!(format.parse("31/02/2020").is_none());
        assert!(format.parse("2020-01-01").is_none());
        assert_eq!(
            DateFormat::from_epoch_millis(86_400_000).map(|d| d.date()),
            NaiveDate::from_ymd_opt(1970, 1, 2)
        );
    }
}
