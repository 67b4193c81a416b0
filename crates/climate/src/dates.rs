//! Calendar dates as they appear in the dataset and in request paths.
//!
//! Dates are always `YYYY-MM-DD`: fixed width and zero padded, so comparing the
//! text lexicographically gives the same answer as comparing the dates. The
//! SQLite store relies on this when it binds dates as text parameters.

use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Duration,
};

/// Length of the trailing window used by the "most recent year" queries.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid YYYY-MM-DD date")]
pub struct InvalidDateFormat(pub String);

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Unpadded fields, signs, other separators and trailing characters are all
/// rejected, as are impossible days such as `2017-02-30`.
pub fn parse_date(text: &str) -> Result<Date, InvalidDateFormat> {
    let invalid = || InvalidDateFormat(text.to_owned());

    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid());
    }

    Date::parse(text, DATE_FORMAT).map_err(|_| invalid())
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// First day of the 365-calendar-day window ending at `date`, inclusive.
pub fn trailing_year_start(date: Date) -> Date {
    date.checked_sub(Duration::days(TRAILING_WINDOW_DAYS))
        .unwrap_or(Date::MIN)
}

/// Serde adapter writing dates as `YYYY-MM-DD` and reading them back strictly.
pub mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(de::Error::custom)
    }
}
