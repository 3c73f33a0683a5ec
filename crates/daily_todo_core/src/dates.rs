//! Calendar dates are stored as `YYYY-MM-DD`, timestamps as
//! `YYYY-MM-DD HH:MM:SS` in local time. Timestamps written by older clients
//! may omit the seconds.

use crate::error::AppError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset()).date()
}

pub fn format_date(date: Date) -> Result<String, AppError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Parses caller-supplied date text.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input(format!("date must be YYYY-MM-DD: '{trimmed}'")))
}

/// Lenient variant for stored values: empty or corrupted text yields `None`.
pub fn parse_stored_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]")).ok()
}

pub fn now_timestamp() -> Result<String, AppError> {
    let now = OffsetDateTime::now_utc().to_offset(local_offset());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{format_date, now_timestamp, parse_date, parse_stored_date};
    use time::macros::format_description;
    use time::{Date, Month, PrimitiveDateTime};

    #[test]
    fn date_round_trips_through_iso_text() {
        let date = Date::from_calendar_date(2024, Month::January, 5).unwrap();
        let text = format_date(date).unwrap();

        assert_eq!(text, "2024-01-05");
        assert_eq!(parse_date(&text).unwrap(), date);
    }

    #[test]
    fn parse_date_rejects_other_layouts() {
        let err = parse_date("05/01/2024").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn stored_dates_tolerate_garbage() {
        assert_eq!(parse_stored_date(""), None);
        assert_eq!(parse_stored_date("soon"), None);
        assert!(parse_stored_date("2024-02-29").is_some());
    }

    #[test]
    fn now_timestamp_is_parseable() {
        let stamp = now_timestamp().unwrap();
        let parsed = PrimitiveDateTime::parse(
            &stamp,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        );

        assert!(parsed.is_ok());
    }
}
