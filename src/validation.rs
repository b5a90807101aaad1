//! Payload validation against a declarative field rule table
//!
//! Write payloads arrive as arbitrary JSON. They are checked against a
//! [`Schema`] before anything is deserialized into typed models, so every
//! failing field is reported at once with a human-readable reason.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key used for errors that concern the whole payload rather than one field
pub const DOCUMENT_KEY: &str = "document";

pub const REQUIRED: &str = "required field";
pub const NULL_NOT_ALLOWED: &str = "null value not allowed";
pub const EMPTY_NOT_ALLOWED: &str = "empty values not allowed";
pub const UNKNOWN_FIELD: &str = "unknown field";
pub const NOT_AN_OBJECT: &str = "must be a JSON object";

/// Field name to list of failure reasons, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, reasons)| format!("{}: {}", field, reasons.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let reason = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(field.to_string(), reason);
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    String,
}

impl FieldKind {
    fn type_error(self) -> &'static str {
        match self {
            FieldKind::Integer => "must be of integer type",
            FieldKind::String => "must be of string type",
        }
    }
}

/// Constraints applied to one field of a payload
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Inclusive lower bound, integer fields only
    pub min: Option<i64>,
    /// Whether blank strings are accepted
    pub allow_empty: bool,
}

impl FieldRule {
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            required: false,
            min: None,
            allow_empty: true,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            required: false,
            min: None,
            allow_empty: true,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn non_empty(mut self) -> Self {
        self.allow_empty = false;
        self
    }

    fn check(&self, value: &Value, errors: &mut FieldErrors) {
        if value.is_null() {
            errors.add(self.name, NULL_NOT_ALLOWED);
            return;
        }

        match self.kind {
            FieldKind::Integer => {
                let Some(n) = value.as_i64() else {
                    errors.add(self.name, self.kind.type_error());
                    return;
                };
                if let Some(min) = self.min {
                    if n < min {
                        errors.add(self.name, format!("min value is {}", min));
                    }
                }
            }
            FieldKind::String => {
                let Some(s) = value.as_str() else {
                    errors.add(self.name, self.kind.type_error());
                    return;
                };
                if !self.allow_empty && s.trim().is_empty() {
                    errors.add(self.name, EMPTY_NOT_ALLOWED);
                }
            }
        }
    }
}

/// A closed set of field rules; keys outside the set are rejected
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Validate a decoded JSON value, collecting every failure
    pub fn validate(&self, value: &Value) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        let Some(object) = value.as_object() else {
            errors.add(DOCUMENT_KEY, NOT_AN_OBJECT);
            return Err(errors);
        };

        self.check_object(object, &mut errors);
        errors.into_result()
    }

    fn check_object(&self, object: &Map<String, Value>, errors: &mut FieldErrors) {
        for rule in &self.rules {
            match object.get(rule.name) {
                Some(value) => rule.check(value, errors),
                None if rule.required => errors.add(rule.name, REQUIRED),
                None => {}
            }
        }

        for key in object.keys() {
            if !self.rules.iter().any(|rule| rule.name == key) {
                errors.add(key.as_str(), UNKNOWN_FIELD);
            }
        }
    }
}

/// Schema for book create and update payloads
pub static BOOK_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::integer("id").required().min(1),
        FieldRule::string("title").required().non_empty(),
        FieldRule::string("author").required().non_empty(),
    ])
});
