use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::domain::{CertificateRequest, FormField};

use crate::dates::{parse_issued_on_date, today};

pub const PURPOSE_MIN_CHARS: usize = 50;

pub const ADDRESS_TO_REQUIRED: &str = "Address to is required.";
pub const ADDRESS_TO_CHARSET: &str =
    "Address to must contain only alphanumeric characters and basic punctuation.";
pub const PURPOSE_REQUIRED: &str = "Purpose is required.";
pub const PURPOSE_TOO_SHORT: &str = "Purpose must be at least 50 characters long.";
pub const ISSUED_ON_REQUIRED: &str = "Issued on date is required.";
pub const ISSUED_ON_NOT_FUTURE: &str = "Issued on date must be a future date.";
pub const EMPLOYEE_ID_REQUIRED: &str = "Employee ID is required.";
pub const EMPLOYEE_ID_NOT_NUMERIC: &str = "Employee ID must be a number.";

/// Field-scoped validation messages. Empty means the request is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(FormField) -> bool) {
        self.0.retain(|field, _| keep(*field));
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

pub fn validate(request: &CertificateRequest, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in FormField::ALL {
        if let Some(message) = validate_field(field, request.field(field), today) {
            errors.insert(field, message);
        }
    }
    errors
}

pub fn validate_now(request: &CertificateRequest) -> FieldErrors {
    validate(request, today())
}

/// First failing rule for one field, if any.
pub fn validate_field(field: FormField, value: &str, today: NaiveDate) -> Option<&'static str> {
    match field {
        FormField::AddressTo => check_address_to(value),
        FormField::Purpose => check_purpose(value),
        FormField::IssuedOn => check_issued_on(value, today),
        FormField::EmployeeId => check_employee_id(value),
    }
}

pub fn purpose_char_count(purpose: &str) -> usize {
    purpose.trim().chars().count()
}

fn check_address_to(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some(ADDRESS_TO_REQUIRED);
    }
    if !value.chars().all(is_address_char) {
        return Some(ADDRESS_TO_CHARSET);
    }
    None
}

fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, ',' | '.' | '\'' | '-')
}

fn check_purpose(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(PURPOSE_REQUIRED);
    }
    if purpose_char_count(value) < PURPOSE_MIN_CHARS {
        return Some(PURPOSE_TOO_SHORT);
    }
    None
}

fn check_issued_on(value: &str, today: NaiveDate) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(ISSUED_ON_REQUIRED);
    }
    match parse_issued_on_date(value) {
        Some(date) if date > today => None,
        _ => Some(ISSUED_ON_NOT_FUTURE),
    }
}

fn check_employee_id(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some(EMPLOYEE_ID_REQUIRED);
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => None,
        _ => Some(EMPLOYEE_ID_NOT_NUMERIC),
    }
}
