//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::json;

use crate::domain::{Error, Money};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidAmount,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidAmount => "invalid_amount",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a path or body identifier into one of the domain id newtypes.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    T::from_str(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

/// Parse a whole-unit amount, rejecting negatives.
pub(crate) fn parse_amount(value: i64, field: FieldName) -> Result<Money, Error> {
    Money::new(value).map_err(|err| {
        field_error(
            field,
            err.to_string(),
            ErrorCode::InvalidAmount,
            &value.to_string(),
        )
    })
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` time into a UTC instant.
pub(crate) fn parse_booking_start(
    date: &str,
    time: &str,
    date_field: FieldName,
    time_field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        field_error(
            date_field,
            format!("{} must use the YYYY-MM-DD format", date_field.as_str()),
            ErrorCode::InvalidDate,
            date,
        )
    })?;
    let at = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
        field_error(
            time_field,
            format!("{} must use the HH:MM format", time_field.as_str()),
            ErrorCode::InvalidTime,
            time,
        )
    })?;
    Ok(NaiveDateTime::new(day, at).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, ErrorCode as DomainErrorCode};
    use chrono::TimeZone;
    use rstest::rstest;

    const DATE: FieldName = FieldName::new("bookingDate");
    const TIME: FieldName = FieldName::new("bookingTime");

    #[rstest]
    fn booking_start_is_read_as_utc() {
        let start = parse_booking_start("2026-11-02", "14:30", DATE, TIME).expect("valid start");
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2026, 11, 2, 14, 30, 0).single().expect("valid instant")
        );
    }

    #[rstest]
    #[case("02/11/2026", "14:30", "bookingDate", "invalid_date")]
    #[case("2026-02-30", "14:30", "bookingDate", "invalid_date")]
    #[case("2026-11-02", "2pm", "bookingTime", "invalid_time")]
    #[case("2026-11-02", "24:00", "bookingTime", "invalid_time")]
    fn malformed_starts_name_the_field(
        #[case] date: &str,
        #[case] time: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = parse_booking_start(date, time, DATE, TIME).expect_err("malformed start");

        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], code);
    }

    #[rstest]
    fn ids_must_be_uuids() {
        let err = parse_id::<BookingId>("nope", FieldName::new("bookingId"))
            .expect_err("not a uuid");
        assert_eq!(err.details().expect("details")["code"], "invalid_uuid");

        let id: BookingId = parse_id("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("bookingId"))
            .expect("uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn negative_amounts_are_rejected() {
        let err = parse_amount(-5, FieldName::new("amount")).expect_err("negative");
        assert_eq!(err.reason(), Some("invalid_amount"));
        assert_eq!(parse_amount(500, FieldName::new("amount")).map(Money::amount), Ok(500));
    }
}
