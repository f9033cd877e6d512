use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::renewal::dates;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Fields of a candidate record, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Payer,
    Company,
    Years,
    Date,
    Email,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Payer => write!(f, "payer"),
            Field::Company => write!(f, "company"),
            Field::Years => write!(f, "years"),
            Field::Date => write!(f, "date"),
            Field::Email => write!(f, "email"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(Field),

    #[error("term years must be a whole number of at least 1, got '{0}'")]
    InvalidTermYears(String),

    #[error("invalid email format: '{0}'")]
    InvalidEmailFormat(String),

    #[error("invalid date: '{0}'")]
    InvalidDateFormat(String),
}

/// Raw field values of a candidate record, as typed into a form or read
/// from a spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    pub payer: String,
    pub company: String,
    pub years: String,
    /// Purchase date or current expiry, depending on the expiry mode.
    pub date: String,
    pub email: String,
}

/// A candidate that passed validation, ready for expiry computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecord {
    pub payer: String,
    pub company: String,
    pub years: u32,
    pub date: NaiveDate,
    pub email: String,
}

/// Validate a candidate record.
///
/// Every required-field check runs before any format check, so a row with a
/// blank payer and a bad email reports the blank payer.
pub fn validate(input: &RecordInput) -> Result<ValidRecord, ValidationError> {
    let payer = input.payer.trim();
    let company = input.company.trim();
    let years = input.years.trim();
    let date = input.date.trim();
    let email = input.email.trim();

    for (field, value) in [
        (Field::Payer, payer),
        (Field::Company, company),
        (Field::Years, years),
        (Field::Date, date),
        (Field::Email, email),
    ] {
        if value.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    let years = parse_years(years)?;

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmailFormat(email.to_string()));
    }

    let date = dates::parse_date(date)
        .ok_or_else(|| ValidationError::InvalidDateFormat(date.to_string()))?;

    Ok(ValidRecord {
        payer: payer.to_string(),
        company: company.to_string(),
        years,
        date,
        email: email.to_string(),
    })
}

fn parse_years(raw: &str) -> Result<u32, ValidationError> {
    match raw.parse::<u32>() {
        Ok(years) if years >= 1 => Ok(years),
        _ => Err(ValidationError::InvalidTermYears(raw.to_string())),
    }
}

/// `local@domain.tld`: no whitespace or extra `@`, and a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
