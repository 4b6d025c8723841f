use std::collections::HashMap;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ApiError;

const REQUIRED: &str = "This field is required";

/// Collects per-field problems so one response reports all of them.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.reject(field, REQUIRED);
        }
        value
    }

    /// Like `require`, but blank strings count as missing.
    pub fn require_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = value
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self.require(field, value)
    }

    /// Required text that must parse as `T` (roles, statuses).
    pub fn require_parsed<T: FromStr>(&mut self, field: &str, value: Option<String>) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let text = self.require_text(field, value)?;
        match text.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.reject(field, e.to_string());
                None
            }
        }
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::validation_error("Missing or invalid fields", Some(self.errors))
    }

    /// `Err` when anything was rejected.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// Record ids arrive as path segments.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{raw}'")))
}
