use serde::{Deserialize, Serialize};

/// A certificate request as entered by the employee and sent to the submit endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub address_to: String,
    pub purpose: String,
    pub issued_on: String,
    pub employee_id: String,
}

impl CertificateRequest {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::AddressTo => &self.address_to,
            FormField::Purpose => &self.purpose,
            FormField::IssuedOn => &self.issued_on,
            FormField::EmployeeId => &self.employee_id,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::AddressTo => &mut self.address_to,
            FormField::Purpose => &mut self.purpose,
            FormField::IssuedOn => &mut self.issued_on,
            FormField::EmployeeId => &mut self.employee_id,
        }
    }

    /// Copy with every field trimmed, as sent over the wire.
    pub fn normalized(&self) -> Self {
        Self {
            address_to: self.address_to.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
            issued_on: self.issued_on.trim().to_string(),
            employee_id: self.employee_id.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    AddressTo,
    Purpose,
    IssuedOn,
    EmployeeId,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::AddressTo,
        FormField::Purpose,
        FormField::IssuedOn,
        FormField::EmployeeId,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::AddressTo => "Address to",
            FormField::Purpose => "Purpose",
            FormField::IssuedOn => "Issued on",
            FormField::EmployeeId => "Employee ID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    ReferenceNo,
    AddressTo,
    Status,
}

/// Free-text list filters. An empty (or whitespace-only) value places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub reference_no: String,
    pub address_to: String,
    pub status: String,
}

impl FilterCriteria {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::ReferenceNo => &self.reference_no,
            FilterField::AddressTo => &self.address_to,
            FilterField::Status => &self.status,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::ReferenceNo => self.reference_no = value,
            FilterField::AddressTo => self.address_to = value,
            FilterField::Status => self.status = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reference_no.trim().is_empty()
            && self.address_to.trim().is_empty()
            && self.status.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    IssuedOn,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriteria {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortCriteria {
    fn default() -> Self {
        Self {
            field: SortField::IssuedOn,
            direction: SortDirection::Descending,
        }
    }
}

impl SortCriteria {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the active column flips it; any other column starts ascending.
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Ascending)
        }
    }

    pub fn indicator(self, field: SortField) -> Option<&'static str> {
        if self.field != field {
            return None;
        }
        Some(match self.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_active_column_flips_direction() {
        let sort = SortCriteria::new(SortField::IssuedOn, SortDirection::Ascending);
        assert_eq!(
            sort.toggled(SortField::IssuedOn),
            SortCriteria::new(SortField::IssuedOn, SortDirection::Descending)
        );
    }

    #[test]
    fn toggling_other_column_resets_to_ascending() {
        let sort = SortCriteria::new(SortField::IssuedOn, SortDirection::Descending);
        assert_eq!(
            sort.toggled(SortField::Status),
            SortCriteria::new(SortField::Status, SortDirection::Ascending)
        );
    }

    #[test]
    fn indicator_only_marks_active_column() {
        let sort = SortCriteria::default();
        assert_eq!(sort.indicator(SortField::IssuedOn), Some("▼"));
        assert_eq!(sort.indicator(SortField::Status), None);
    }

    #[test]
    fn normalized_trims_every_field() {
        let request = CertificateRequest {
            address_to: "  Embassy of Neptune ".into(),
            purpose: "\tvisa\n".into(),
            issued_on: " 2030-01-01".into(),
            employee_id: " 42 ".into(),
        };
        let normalized = request.normalized();
        assert_eq!(normalized.address_to, "Embassy of Neptune");
        assert_eq!(normalized.purpose, "visa");
        assert_eq!(normalized.issued_on, "2030-01-01");
        assert_eq!(normalized.employee_id, "42");
    }

    #[test]
    fn whitespace_filters_count_as_empty() {
        let mut filters = FilterCriteria::default();
        filters.set(FilterField::Status, "   ");
        assert!(filters.is_empty());
        filters.set(FilterField::ReferenceNo, "REF-1");
        assert!(!filters.is_empty());
        assert_eq!(filters.get(FilterField::ReferenceNo), "REF-1");
    }
}
