//! crates/savings_core/src/validation.rs
//!
//! Input validation for the sign-up, sign-in, group and contribution forms.
//!
//! The field predicates are independent of one another. The form checks
//! (`validate_registration`, `validate_login`, `validate_new_group`,
//! `validate_new_contribution`) combine them and map each failure to the
//! message shown next to the offending field.

use crate::domain::{normalize_description, NewGroup};
use crate::progress::deadline_instant;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_GROUP_NAME_LEN: usize = 3;
pub const MIN_DISPLAY_NAME_LEN: usize = 2;

/// Largest amount a single contribution or group target may hold.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

const AMOUNT_NOT_POSITIVE: &str = "Amount must be a positive number";
const AMOUNT_TOO_LARGE: &str = "Amount must not exceed 1000000000";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

//=========================================================================================
// Field Predicates
//=========================================================================================

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// True when the text is a decimal number greater than zero and at most
/// [`MAX_AMOUNT`].
pub fn validate_amount(amount: &str) -> bool {
    parse_amount(amount).is_some()
}

pub fn validate_group_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_GROUP_NAME_LEN
}

/// True when the date (read as midnight UTC) lies strictly after `now`.
pub fn validate_target_date(date: NaiveDate, now: DateTime<Utc>) -> bool {
    deadline_instant(date) > now
}

/// Parses an amount in `(0, MAX_AMOUNT]`, `None` for anything else.
pub fn parse_amount(amount: &str) -> Option<Decimal> {
    check_amount(amount).ok()
}

fn check_amount(amount: &str) -> Result<Decimal, &'static str> {
    let amount = Decimal::from_str(amount.trim())
        .ok()
        .filter(|a| *a > Decimal::ZERO)
        .ok_or(AMOUNT_NOT_POSITIVE)?;
    if amount > MAX_AMOUNT {
        return Err(AMOUNT_TOO_LARGE);
    }
    Ok(amount)
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

//=========================================================================================
// Form Validation
//=========================================================================================

/// Per-field messages for a rejected form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed for {} field(s)", .0.len())]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub struct RegistrationForm<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

pub fn validate_registration(form: &RegistrationForm<'_>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if form.display_name.trim().chars().count() < MIN_DISPLAY_NAME_LEN {
        errors.add("display_name", "Name must be at least 2 characters");
    }
    if !validate_email(form.email) {
        errors.add("email", "Invalid email");
    }
    if !validate_password(form.password) {
        errors.add("password", "Password must be at least 6 characters");
    }
    if form.password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }
    errors.into_result()
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !validate_email(email) {
        errors.add("email", "Invalid email");
    }
    if password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub struct GroupForm<'a> {
    pub name: &'a str,
    pub target_amount: &'a str,
    pub target_date: &'a str,
    pub description: Option<&'a str>,
}

pub fn validate_new_group(form: &GroupForm<'_>, now: DateTime<Utc>) -> Result<NewGroup, FieldErrors> {
    let mut errors = FieldErrors::default();
    if !validate_group_name(form.name) {
        errors.add("name", "Group name must be at least 3 characters");
    }
    let target_amount = check_amount(form.target_amount)
        .map_err(|message| errors.add("target_amount", message))
        .ok();
    let target_date = parse_date(form.target_date).filter(|d| validate_target_date(*d, now));
    if target_date.is_none() {
        errors.add("target_date", "Target date must be in the future");
    }

    match (target_amount, target_date) {
        (Some(target_amount), Some(target_date)) if errors.is_empty() => Ok(NewGroup {
            name: form.name.trim().to_string(),
            description: normalize_description(form.description),
            target_amount,
            target_date,
        }),
        _ => Err(errors),
    }
}

/// Validates the amount field of the add-contribution form.
pub fn validate_new_contribution(amount: &str) -> Result<Decimal, FieldErrors> {
    check_amount(amount).map_err(|message| {
        let mut errors = FieldErrors::default();
        errors.add("amount", message);
        errors
    })
}
