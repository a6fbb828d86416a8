use std::collections::BTreeSet;

use chrono::NaiveDate;
use shared::domain::{CertificateRequest, FormField};

use crate::validation::{purpose_char_count, validate, FieldErrors, PURPOSE_MIN_CHARS};

/// Request form state: the entered values plus which fields the user has visited.
///
/// Errors are always derived from `values`; `touched` only decides whether an
/// error is shown yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateForm {
    pub values: CertificateRequest,
    touched: BTreeSet<FormField>,
}

impl CertificateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: CertificateRequest) -> Self {
        Self {
            values,
            touched: BTreeSet::new(),
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.values.field_mut(field) = value.into();
    }

    pub fn blur(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(FormField::ALL);
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    pub fn errors(&self, today: NaiveDate) -> FieldErrors {
        validate(&self.values, today)
    }

    pub fn visible_errors(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = self.errors(today);
        errors.retain(|field| self.touched.contains(&field));
        errors
    }

    pub fn is_valid(&self, today: NaiveDate) -> bool {
        self.errors(today).is_empty()
    }

    /// Trimmed purpose length and whether it is still below the minimum.
    pub fn purpose_counter(&self) -> (usize, bool) {
        let count = purpose_char_count(&self.values.purpose);
        (count, count < PURPOSE_MIN_CHARS)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ADDRESS_TO_REQUIRED, PURPOSE_TOO_SHORT};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).expect("ymd")
    }

    #[test]
    fn untouched_errors_stay_hidden_but_still_block() {
        let form = CertificateForm::new();
        assert!(form.visible_errors(today()).is_empty());
        assert!(!form.is_valid(today()));
    }

    #[test]
    fn blur_reveals_required_error() {
        let mut form = CertificateForm::new();
        form.blur(FormField::AddressTo);
        let visible = form.visible_errors(today());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible.get(FormField::AddressTo), Some(ADDRESS_TO_REQUIRED));
    }

    #[test]
    fn typing_revalidates_but_error_waits_for_blur() {
        let mut form = CertificateForm::new();
        form.set_field(FormField::Purpose, "a");
        assert!(!form.is_touched(FormField::Purpose));
        assert!(form.errors(today()).contains(FormField::Purpose));
        assert!(form.visible_errors(today()).is_empty());

        form.blur(FormField::Purpose);
        assert_eq!(
            form.visible_errors(today()).get(FormField::Purpose),
            Some(PURPOSE_TOO_SHORT)
        );

        form.set_field(FormField::Purpose, "p".repeat(PURPOSE_MIN_CHARS));
        assert!(!form.visible_errors(today()).contains(FormField::Purpose));
    }

    #[test]
    fn purpose_counter_tracks_trimmed_length() {
        let mut form = CertificateForm::new();
        form.set_field(FormField::Purpose, "   hello   ");
        assert_eq!(form.purpose_counter(), (5, true));

        form.set_field(FormField::Purpose, "q".repeat(PURPOSE_MIN_CHARS));
        assert_eq!(form.purpose_counter(), (PURPOSE_MIN_CHARS, false));
    }

    #[test]
    fn touch_all_then_reset() {
        let mut form = CertificateForm::new();
        form.touch_all();
        assert_eq!(form.visible_errors(today()).len(), 4);

        form.set_field(FormField::EmployeeId, "77");
        form.reset();
        assert_eq!(form, CertificateForm::new());
        assert!(!form.is_touched(FormField::EmployeeId));
    }
}
