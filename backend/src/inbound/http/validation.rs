//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies and query strings carry raw strings and numbers. These
//! helpers turn them into domain values and report failures as
//! `invalid_request` errors whose details name the offending field.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use pagination::PageLimit;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, Gnf, ListRequest, PhoneNumber, Quantity};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidTimestamp,
    InvalidCode,
    InvalidAmount,
    InvalidQuantity,
    InvalidPhone,
    InvalidPage,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidCode => "invalid_code",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidQuantity => "invalid_quantity",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidPage => "invalid_page",
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

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Display) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.to_string(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    ValidationError::new(field, format!("missing required field: {}", field.as_str()))
        .with_code(ErrorCode::MissingField)
}

/// Unwrap a required payload field.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_id<T: From<Uuid>>(value: &str, field: FieldName) -> Result<T, Error> {
    Uuid::parse_str(value.trim()).map(T::from).map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_optional_id<T: From<Uuid>>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_id(raw, field))
        .transpose()
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{} must be a date (YYYY-MM-DD)", field.as_str()))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_date(raw, field))
        .transpose()
}

pub(crate) fn parse_optional_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| {
                    ValidationError::new(
                        field,
                        format!("{} must be an RFC 3339 timestamp", field.as_str()),
                    )
                    .with_value(ErrorCode::InvalidTimestamp, raw)
                })
        })
        .transpose()
}

/// Parse one of the snake_case codes of a domain enum.
pub(crate) fn parse_code<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidCode, value)
    })
}

pub(crate) fn parse_optional_code<T>(value: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_code(raw, field))
        .transpose()
}

/// Validate a whole, non-negative GNF amount.
pub(crate) fn parse_amount(value: i64, field: FieldName) -> Result<Gnf, Error> {
    Gnf::new(value).map_err(|_| {
        ValidationError::new(field, format!("{} must not be negative", field.as_str()))
            .with_value(ErrorCode::InvalidAmount, value)
    })
}

pub(crate) fn parse_quantity(value: Decimal, field: FieldName) -> Result<Quantity, Error> {
    Quantity::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidQuantity, value)
    })
}

/// Parse a phone number; blank input means none.
pub(crate) fn parse_optional_phone(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<PhoneNumber>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            PhoneNumber::parse(raw).map_err(|err| {
                ValidationError::new(field, err.to_string())
                    .with_value(ErrorCode::InvalidPhone, raw)
            })
        })
        .transpose()
}

/// Build a page request from the `limit` and `cursor` query parameters.
pub(crate) fn parse_page(limit: Option<u32>, cursor: Option<&str>) -> Result<ListRequest, Error> {
    let limit = PageLimit::new(limit).map_err(|err| {
        ValidationError::new(FieldName::new("limit"), err.to_string())
            .with_code(ErrorCode::InvalidPage)
    })?;
    ListRequest::from_token(limit, cursor).map_err(|err| {
        ValidationError::new(FieldName::new("cursor"), err.to_string())
            .with_code(ErrorCode::InvalidPage)
    })
}
