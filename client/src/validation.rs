//! Form validation for login and registration input.
//!
//! The session store sends whatever it is given; callers check input here
//! first. Rules are applied in order (required, length, pattern) and the
//! first failure is reported.

use crate::types::{Credentials, NewUser};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const PHONE_MAX_LEN: usize = 17;
const PASSWORD_MAX_LEN: usize = 15;
const PASSWORD_MIN_LEN: usize = 8;
const NAME_MAX_LEN: usize = 50;

#[allow(clippy::expect_used)] // literal pattern
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+7\([0-9]{3}\) [0-9]{3}-[0-9]{2}-[0-9]{2}").expect("valid phone pattern"));

#[allow(clippy::expect_used)] // literal pattern
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]*$").expect("valid name pattern"));

/// Form field being validated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Display name
    Name,
    /// Phone number
    PhoneNumber,
    /// Password
    Password,
}

/// Rule a field failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Field is empty
    Required,
    /// Field exceeds its maximum length
    TooLong,
    /// Field does not match its pattern
    Pattern,
}

/// A field failed validation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct ValidationError {
    /// Offending field
    pub field: Field,
    /// Failed rule
    pub rule: Rule,
}

impl ValidationError {
    const fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// Message shown next to the field
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match (self.field, self.rule) {
            (Field::Name, Rule::Required) => "Name is required",
            (Field::Name, Rule::TooLong) => "Name is too long",
            (Field::Name, Rule::Pattern) => "Name can only contain letters",
            (Field::PhoneNumber, Rule::Required) => "Phone number is required",
            (Field::PhoneNumber, Rule::TooLong) => "Phone number is too long",
            (Field::PhoneNumber, Rule::Pattern) => "The phone number can only be digits",
            (Field::Password, Rule::Required) => "Password is required",
            (Field::Password, Rule::TooLong) => "Password is too long",
            (Field::Password, Rule::Pattern) => {
                "Password must contain at least 8 characters, including letters and numbers"
            },
        }
    }
}

fn check(
    field: Field,
    value: &str,
    max_len: usize,
    matches: impl FnOnce(&str) -> bool,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, Rule::Required));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::new(field, Rule::TooLong));
    }
    if !matches(value) {
        return Err(ValidationError::new(field, Rule::Pattern));
    }
    Ok(())
}

/// Format raw input as a `+7(XXX) XXX-XX-XX` phone number
///
/// Non-digits are dropped. The first digit is taken as the country code and
/// replaced by `+7`; the rest fill the mask progressively, so partial input
/// yields a partial mask and anything past eleven digits is ignored. A
/// single digit is kept as the first area-code digit.
///
/// ```
/// use auth_store::validation::format_phone_number;
///
/// assert_eq!(format_phone_number("79991234567"), "+7(999) 123-45-67");
/// assert_eq!(format_phone_number("+7(999) 12"), "+7(999) 12");
/// ```
#[must_use]
pub fn format_phone_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    let part = |from: usize, to: usize| -> String {
        digits[from.min(digits.len())..to.min(digits.len())].iter().collect()
    };

    let len = digits.len();
    if len <= 1 {
        return format!("+7({}", part(0, 1));
    }

    let mut formatted = format!("+7({}", part(1, 4));
    if len > 4 {
        formatted.push_str(") ");
        formatted.push_str(&part(4, 7));
    }
    if len > 7 {
        formatted.push('-');
        formatted.push_str(&part(7, 9));
    }
    if len > 9 {
        formatted.push('-');
        formatted.push_str(&part(9, 11));
    }
    formatted
}

/// Validate a formatted phone number
///
/// # Errors
///
/// Returns the first failed rule: empty, longer than 17 characters, or not
/// in `+7(XXX) XXX-XX-XX` form.
pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    check(Field::PhoneNumber, phone_number, PHONE_MAX_LEN, |v| PHONE_RE.is_match(v))
}

/// Validate a password
///
/// # Errors
///
/// Returns the first failed rule: empty, longer than 15 characters, or not
/// at least 8 ASCII letters and digits with one of each.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check(Field::Password, password, PASSWORD_MAX_LEN, |v| {
        v.len() >= PASSWORD_MIN_LEN
            && v.chars().all(|c| c.is_ascii_alphanumeric())
            && v.chars().any(|c| c.is_ascii_alphabetic())
            && v.chars().any(|c| c.is_ascii_digit())
    })
}

/// Validate a display name
///
/// # Errors
///
/// Returns the first failed rule: empty, longer than 50 characters, or
/// containing anything other than ASCII letters and whitespace.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check(Field::Name, name, NAME_MAX_LEN, |v| NAME_RE.is_match(v))
}

impl Credentials {
    /// Validate phone number then password
    ///
    /// # Errors
    ///
    /// Returns the first field that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_phone_number(&self.phone_number)?;
        validate_password(&self.password)
    }
}

impl NewUser {
    /// Validate name, phone number, then password
    ///
    /// # Errors
    ///
    /// Returns the first field that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_phone_number(&self.phone_number)?;
        validate_password(&self.password)
    }
}
