//! Request-field validation helpers shared by handlers.
//!
//! Every failure is an `invalid_request` error whose `details` name the
//! offending field and a machine-readable code.

use std::fmt::Display;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Name of a request field as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

fn field_error(field: FieldName, code: FieldErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.0,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        FieldErrorCode::MissingField,
        format!("missing required field: {}", field.0),
    )
}

/// Unwrap an optional body field or report it missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Wrap a domain validation failure for `field`.
pub(crate) fn invalid_field(field: FieldName, error: impl Display) -> Error {
    field_error(field, FieldErrorCode::InvalidValue, error.to_string())
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        field_error(
            field,
            FieldErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.0),
        )
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value.trim()).map_err(|_| {
                Error::invalid_request(format!("{} must contain valid UUIDs", field.0))
                    .with_details(json!({
                        "field": field.0,
                        "index": index,
                        "value": value,
                        "code": FieldErrorCode::InvalidUuid.as_str(),
                    }))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const STAMPS: FieldName = FieldName::new("stamps");

    #[rstest]
    fn missing_field_names_the_field() {
        let error = require::<String>(None, FieldName::new("message")).expect_err("missing");
        let details = error.details().expect("details");
        assert_eq!(details["field"], "message");
        assert_eq!(details["code"], "missing_field");
    }

    #[rstest]
    fn uuid_list_reports_first_bad_index() {
        let values = vec![
            Uuid::nil().to_string(),
            "nope".to_owned(),
            "also-bad".to_owned(),
        ];
        let error = parse_uuid_list(&values, STAMPS).expect_err("bad uuid");
        let details = error.details().expect("details");
        assert_eq!(details["index"], 1);
        assert_eq!(details["value"], "nope");
    }

    #[rstest]
    fn uuid_is_trimmed_before_parsing() {
        let raw = format!(" {} ", Uuid::nil());
        assert_eq!(
            parse_uuid(&raw, FieldName::new("recipientId")).expect("valid"),
            Uuid::nil()
        );
    }
}
