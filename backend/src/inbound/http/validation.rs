//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns a domain [`Error`] with `invalid_request` code and a
//! `details` object naming the field, so clients see one error shape whether
//! a payload fails deserialisation or domain validation.

use actix_web::{HttpRequest, error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};
use serde_json::json;

use crate::domain::{
    AuthValidationError, ContactId, ContactValidationError, Error, Pagination, SearchTerm,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::MalformedBody => "malformed_body",
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

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Reject a field value with a human-readable reason.
pub(crate) fn invalid_value(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::InvalidValue)
}

/// Map signup or login validation failures onto the offending field.
pub(crate) fn invalid_auth(error: AuthValidationError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(ErrorCode::InvalidValue)
}

/// Map contact parameter failures onto the offending parameter.
pub(crate) fn invalid_parameter(error: ContactValidationError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn parse_contact_id(raw: i64) -> Result<ContactId, Error> {
    ContactId::new(raw).map_err(|error| {
        ValidationError::new(error.field(), error.to_string())
            .with_value(ErrorCode::InvalidValue, raw.to_string())
    })
}

pub(crate) fn parse_pagination(limit: Option<u32>, offset: Option<u32>) -> Result<Pagination, Error> {
    Pagination::new(limit, offset).map_err(invalid_parameter)
}

pub(crate) fn parse_search_term(raw: Option<&str>) -> Result<SearchTerm, Error> {
    let raw = raw.ok_or_else(|| missing_field_error(FieldName::new("q")))?;
    SearchTerm::new(raw).map_err(invalid_parameter)
}

fn malformed(source: &'static str, detail: impl ToString) -> Error {
    ValidationError::new(source, format!("malformed {source}"))
        .with_value(ErrorCode::MalformedBody, detail.to_string())
}

/// JSON extractor configuration reporting failures as domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error: JsonPayloadError, _req: &HttpRequest| {
        malformed("body", error).into()
    })
}

/// Query extractor configuration reporting failures as domain errors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|error: QueryPayloadError, _req: &HttpRequest| {
        malformed("query", error).into()
    })
}

/// Path extractor configuration reporting failures as domain errors.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|error: PathError, _req: &HttpRequest| {
        malformed("path", error).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainErrorCode, PAGE_LIMIT_MAX, UserValidationError};
    use rstest::rstest;

    fn details_field(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("field"))
            .and_then(|field| field.as_str())
    }

    #[rstest]
    fn missing_search_term_names_q() {
        let error = parse_search_term(None).expect_err("missing q");
        assert_eq!(error.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(details_field(&error), Some("q"));
    }

    #[rstest]
    #[case("ab")]
    #[case("   ab   ")]
    fn short_search_term_is_rejected(#[case] raw: &str) {
        let error = parse_search_term(Some(raw)).expect_err("too short");
        assert_eq!(details_field(&error), Some("q"));
    }

    #[rstest]
    fn limit_above_maximum_names_limit() {
        let error = parse_pagination(Some(PAGE_LIMIT_MAX + 1), None).expect_err("too large");
        assert_eq!(details_field(&error), Some("limit"));
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn non_positive_contact_id_is_rejected(#[case] raw: i64) {
        let error = parse_contact_id(raw).expect_err("invalid id");
        assert_eq!(details_field(&error), Some("contact_id"));
        assert_eq!(
            error.details().and_then(|d| d.get("value")).and_then(|v| v.as_str()),
            Some(raw.to_string().as_str())
        );
    }

    #[rstest]
    fn auth_errors_keep_field_name() {
        let error = invalid_auth(AuthValidationError::Username(UserValidationError::EmptyUsername));
        assert_eq!(details_field(&error), Some("username"));
    }
}
