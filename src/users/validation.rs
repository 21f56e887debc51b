use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::FieldError;

pub const NAME_MAX: usize = 50;
pub const LOCATION_MAX: usize = 100;
pub const BIO_MAX: usize = 500;
pub const PASSWORD_MIN: usize = 6;

// Word and digit classes are ASCII only: `jösé@x.com` or Arabic-Indic digits
// are not accepted.
lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^(?-u:\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+)$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9\s\-()]+$").unwrap();
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collects per-field failures so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self.0)
        }
    }

    /// Trimmed name that must be non-empty and at most [`NAME_MAX`] characters.
    pub fn name(&mut self, field: &str, label: &str, raw: &str) -> String {
        let value = raw.trim();
        if value.is_empty() {
            self.push(field, format!("{label} is required"));
        } else if char_len(value) > NAME_MAX {
            self.push(field, format!("{label} cannot exceed {NAME_MAX} characters"));
        }
        value.to_string()
    }

    /// Trimmed optional phone; blank input means "no phone".
    pub fn phone(&mut self, field: &str, raw: &str) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if !is_valid_phone(value) {
            self.push(field, "Please enter a valid phone number");
        }
        Some(value.to_string())
    }

    /// Trimmed optional free text bounded by `max` characters; blank means unset.
    pub fn bounded(&mut self, field: &str, label: &str, raw: &str, max: usize) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        if char_len(value) > max {
            self.push(field, format!("{label} cannot exceed {max} characters"));
        }
        Some(value.to_string())
    }

    pub fn email(&mut self, field: &str, raw: Option<&str>) -> String {
        let email = normalize_email(raw.unwrap_or_default());
        if email.is_empty() {
            self.push(field, "Email is required");
        } else if !is_valid_email(&email) {
            self.push(field, "Please enter a valid email");
        }
        email
    }

    pub fn password(&mut self, field: &str, raw: Option<&str>) {
        match raw {
            None | Some("") => self.push(field, "Password is required"),
            Some(p) if char_len(p) < PASSWORD_MIN => self.push(
                field,
                format!("Password must be at least {PASSWORD_MIN} characters long"),
            ),
            Some(_) => {}
        }
    }
}

pub fn trim_skills(skills: Vec<String>) -> Vec<String> {
    skills.into_iter().map(|s| s.trim().to_string()).collect()
}
