//! Submitted-form validation.
//!
//! A [`Form`] wraps the posted key/value pairs and accumulates field-level
//! messages as checks run. Checks never short-circuit, so a re-rendered form
//! shows every problem at once.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // local@domain.tld with no whitespace and a single @.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s.]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_owned()).or_default().push(message);
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|messages| messages.first()).map(String::as_str)
    }

    /// True when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Posted form values plus the errors found so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: HashMap<String, String>,
    errors: FormErrors,
}

impl Form {
    /// Wrap submitted values.
    #[must_use]
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// Submitted value for `field`, or the empty string.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// True when `field` was submitted with a non-blank value.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).trim().is_empty()
    }

    /// Every field must be present and non-blank.
    pub fn required(&mut self, fields: &[&str]) -> &mut Self {
        for field in fields {
            if !self.has(field) {
                self.errors.add(field, "This field cannot be blank".to_owned());
            }
        }
        self
    }

    /// `field` must hold at least `min` characters.
    pub fn min_length(&mut self, field: &str, min: usize) -> &mut Self {
        if self.get(field).chars().count() < min {
            self.errors.add(
                field,
                format!("This field must be at least {min} characters long"),
            );
        }
        self
    }

    /// `field` must look like an email address.
    pub fn is_email(&mut self, field: &str) -> &mut Self {
        if !email_regex().is_match(self.get(field).trim()) {
            self.errors.add(field, "Invalid email address".to_owned());
        }
        self
    }

    /// True when no check has failed.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded so far.
    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }
}
