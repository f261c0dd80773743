//! Contact Form Validation
//!
//! Checks an arbitrary JSON payload against the contact form schema and
//! normalizes it into a [`NewSubmission`]. Strings are trimmed and empty
//! optional fields become `None`. Every violation is reported, not just the
//! first one.

use email_address::{EmailAddress, Options};
use serde_json::{Map, Value};

use crate::error::{ContactError, Result};
use crate::model::NewSubmission;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 50;
pub const MAX_SERVICE_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Bare addresses only: no display name, no IP literal, dotted domain
fn email_options() -> Options {
    Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld()
}

/// Validate a submitted payload
pub fn validate(payload: &Value) -> Result<NewSubmission> {
    let Some(fields) = payload.as_object() else {
        return Err(ContactError::Validation("Expected a JSON object".into()));
    };

    let mut violations = Vec::new();

    let name = required(fields, "name", MAX_NAME_LEN, &mut violations);
    let email = required(fields, "email", MAX_EMAIL_LEN, &mut violations);
    let phone = optional(fields, "phone", MAX_PHONE_LEN, &mut violations);
    let service = optional(fields, "service", MAX_SERVICE_LEN, &mut violations);
    let message = optional(fields, "message", MAX_MESSAGE_LEN, &mut violations);

    if let Some(ref email) = email {
        if EmailAddress::parse_with_options(email, email_options()).is_err() {
            violations.push("email: must be a valid email address".to_string());
        }
    }

    match (name, email) {
        (Some(name), Some(email)) if violations.is_empty() => Ok(NewSubmission {
            name,
            email,
            phone,
            service,
            message,
        }),
        _ => Err(ContactError::Validation(violations.join("; "))),
    }
}

fn required(
    fields: &Map<String, Value>,
    key: &str,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    match text_field(fields, key, max_len) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            violations.push(format!("{key}: is required"));
            None
        }
        Err(violation) => {
            violations.push(violation);
            None
        }
    }
}

fn optional(
    fields: &Map<String, Value>,
    key: &str,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    text_field(fields, key, max_len).unwrap_or_else(|violation| {
        violations.push(violation);
        None
    })
}

/// Missing, null and blank all read as `None`
fn text_field(
    fields: &Map<String, Value>,
    key: &str,
    max_len: usize,
) -> std::result::Result<Option<String>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else if trimmed.chars().count() > max_len {
                Err(format!("{key}: must be at most {max_len} characters"))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(format!("{key}: expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(payload: &Value) -> String {
        match validate(payload) {
            Err(ContactError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_full_payload() {
        let new = validate(&json!({
            "name": "  Ann ",
            "email": "ann@x.com",
            "phone": "+1 555 0100",
            "service": "website",
            "message": "hi",
        }))
        .unwrap();

        assert_eq!(new.name, "Ann");
        assert_eq!(new.email, "ann@x.com");
        assert_eq!(new.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(new.service.as_deref(), Some("website"));
        assert_eq!(new.message.as_deref(), Some("hi"));
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let new = validate(&json!({
            "name": "Ann",
            "email": "ann@x.com",
            "phone": "",
            "service": "   ",
            "message": null,
        }))
        .unwrap();

        assert_eq!(new.phone, None);
        assert_eq!(new.service, None);
        assert_eq!(new.message, None);
    }

    #[test]
    fn test_missing_required_fields() {
        let msg = violation(&json!({ "message": "hello" }));
        assert!(msg.contains("name: is required"));
        assert!(msg.contains("email: is required"));

        let msg = violation(&json!({ "name": "   ", "email": "ann@x.com" }));
        assert_eq!(msg, "name: is required");
    }

    #[test]
    fn test_malformed_email() {
        for email in [
            "not-an-email",
            "ann@",
            "@x.com",
            "ann x@x.com",
            "Ann <ann@x.com>",
            "ann@x",
            "ann@localhost",
            "ann@[127.0.0.1]",
        ] {
            let msg = violation(&json!({ "name": "Ann", "email": email }));
            assert_eq!(msg, "email: must be a valid email address", "{email}");
        }
    }

    #[test]
    fn test_accepts_plain_addresses() {
        for email in ["ann@x.com", "ann.lee+site@mail.example.co.uk"] {
            let new = validate(&json!({ "name": "Ann", "email": email })).unwrap();
            assert_eq!(new.email, email);
        }
    }

    #[test]
    fn test_wrong_types() {
        let msg = violation(&json!({ "name": 42, "email": "ann@x.com", "phone": ["1"] }));
        assert!(msg.contains("name: expected a string"));
        assert!(msg.contains("phone: expected a string"));
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(violation(&json!(["Ann"])), "Expected a JSON object");
        assert_eq!(violation(&Value::Null), "Expected a JSON object");
    }

    #[test]
    fn test_length_limits() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        let msg = violation(&json!({ "name": "Ann", "email": "ann@x.com", "message": long }));
        assert_eq!(msg, format!("message: must be at most {MAX_MESSAGE_LEN} characters"));
    }
}
