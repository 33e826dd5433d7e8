//! Form Validation
//!
//! Client-side checks run before a request is sent. Failures carry one
//! message per field so forms can render them inline.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Credentials, Registration};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;
const MIN_NOTE_CHARS: usize = 3;

/// A single field-level message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field-level messages collected from one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for a field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.push(field, message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn validate_login(credentials: &Credentials) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !is_valid_email(&credentials.email) {
        errors.push("email", "Invalid email format");
    }
    if credentials.password.is_empty() {
        errors.push("password", "Password must not be empty");
    }
    errors.into_result()
}

pub fn validate_registration(registration: &Registration) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if registration.name.trim().chars().count() < MIN_NAME_CHARS {
        errors.push("name", format!("Name must be at least {} characters", MIN_NAME_CHARS));
    }
    if !is_valid_email(&registration.email) {
        errors.push("email", "Invalid email format");
    }
    if registration.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
        );
    }
    errors.into_result()
}

/// Returns the trimmed note content
pub fn validate_note(content: &str) -> Result<String, FieldErrors> {
    let trimmed = content.trim();
    if trimmed.chars().count() < MIN_NOTE_CHARS {
        return Err(FieldErrors::single(
            "content",
            format!("Note must be at least {} characters", MIN_NOTE_CHARS),
        ));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed board name
pub fn validate_board_name(name: &str) -> Result<String, FieldErrors> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldErrors::single("name", "Board name is required"));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed task title
pub fn validate_task_title(title: &str) -> Result<String, FieldErrors> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FieldErrors::single("title", "Task title is required"));
    }
    Ok(trimmed.to_string())
}
