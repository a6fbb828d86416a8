//! Client-side filter and sort over the fetched request list.
//!
//! Everything here is pure: the input slice is never reordered or modified,
//! and malformed values degrade to "missing" instead of failing.

use std::cmp::Ordering;

use shared::{
    domain::{FilterCriteria, SortCriteria, SortDirection, SortField},
    protocol::CertificateRequestRecord,
};

use crate::dates::parse_issued_on;

pub const MISSING_REFERENCE_NO: &str = "—";
pub const MISSING_STATUS: &str = "Unknown";

pub fn apply(
    records: &[CertificateRequestRecord],
    filters: &FilterCriteria,
    sort: SortCriteria,
) -> Vec<CertificateRequestRecord> {
    let matcher = Matcher::new(filters);
    let mut view: Vec<CertificateRequestRecord> = records
        .iter()
        .filter(|record| matcher.matches(record))
        .cloned()
        .collect();

    match sort.field {
        SortField::IssuedOn => view.sort_by(compare_issued_on),
        SortField::Status => view.sort_by(compare_status),
    }

    // Plain reversal: ties end up in reverse input order too.
    if sort.direction == SortDirection::Descending {
        view.reverse();
    }

    view
}

struct Matcher {
    reference_no: Option<String>,
    address_to: Option<String>,
    status: Option<String>,
}

impl Matcher {
    fn new(filters: &FilterCriteria) -> Self {
        Self {
            reference_no: needle(&filters.reference_no),
            address_to: needle(&filters.address_to),
            status: needle(&filters.status),
        }
    }

    fn matches(&self, record: &CertificateRequestRecord) -> bool {
        if let Some(wanted) = &self.reference_no {
            if record.reference_no_or_empty().to_lowercase() != *wanted {
                return false;
            }
        }
        if let Some(wanted) = &self.address_to {
            if !record.address_to.to_lowercase().contains(wanted.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = &self.status {
            if record.status_or_empty().to_lowercase() != *wanted {
                return false;
            }
        }
        true
    }
}

fn needle(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn compare_issued_on(a: &CertificateRequestRecord, b: &CertificateRequestRecord) -> Ordering {
    match (parse_issued_on(&a.issued_on), parse_issued_on(&b.issued_on)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_status(a: &CertificateRequestRecord, b: &CertificateRequestRecord) -> Ordering {
    a.status_or_empty()
        .to_lowercase()
        .cmp(&b.status_or_empty().to_lowercase())
}

pub fn display_reference_no(record: &CertificateRequestRecord) -> &str {
    record.reference_no.as_deref().unwrap_or(MISSING_REFERENCE_NO)
}

pub fn display_status(record: &CertificateRequestRecord) -> &str {
    record.status.as_deref().unwrap_or(MISSING_STATUS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    generation: u64,
    filters: FilterCriteria,
    sort: SortCriteria,
}

/// Remembers the last [`apply`] result.
///
/// `generation` must change whenever the underlying records change; the cache
/// does not look inside the record list itself.
#[derive(Debug, Default)]
pub struct ListingCache {
    key: Option<CacheKey>,
    view: Vec<CertificateRequestRecord>,
    recomputations: u64,
}

impl ListingCache {
    pub fn view(
        &mut self,
        generation: u64,
        records: &[CertificateRequestRecord],
        filters: &FilterCriteria,
        sort: SortCriteria,
    ) -> &[CertificateRequestRecord] {
        let fresh = self.key.as_ref().is_some_and(|key| {
            key.generation == generation && key.sort == sort && key.filters == *filters
        });
        if !fresh {
            self.view = apply(records, filters, sort);
            self.key = Some(CacheKey {
                generation,
                filters: filters.clone(),
                sort,
            });
            self.recomputations += 1;
        }
        &self.view
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::FilterField;

    fn record(
        reference_no: Option<&str>,
        address_to: &str,
        issued_on: &str,
        status: Option<&str>,
    ) -> CertificateRequestRecord {
        CertificateRequestRecord {
            address_to: address_to.to_string(),
            purpose: "purpose".to_string(),
            issued_on: issued_on.to_string(),
            employee_id: "1".to_string(),
            reference_no: reference_no.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    fn refs(records: &[CertificateRequestRecord]) -> Vec<&str> {
        records.iter().map(display_reference_no).collect()
    }

    fn asc(field: SortField) -> SortCriteria {
        SortCriteria::new(field, SortDirection::Ascending)
    }

    fn desc(field: SortField) -> SortCriteria {
        SortCriteria::new(field, SortDirection::Descending)
    }

    fn sample() -> Vec<CertificateRequestRecord> {
        vec![
            record(Some("REF-3"), "Embassy of Neptune", "2024-03-01", Some("Approved")),
            record(Some("REF-1"), "First Bank", "2024-01-05", Some("Pending")),
            record(Some("REF-2"), "HR department", "garbage", Some("pending")),
            record(None, "embassy of mars", "2024-02-10", None),
        ]
    }

    #[test]
    fn pending_then_approved_by_issue_date() {
        let records = vec![
            record(Some("A"), "x", "2024-01-05", Some("Pending")),
            record(Some("B"), "x", "2024-02-10", Some("Approved")),
        ];
        let ascending = apply(&records, &FilterCriteria::default(), asc(SortField::IssuedOn));
        assert_eq!(refs(&ascending), vec!["A", "B"]);

        let descending = apply(&records, &FilterCriteria::default(), desc(SortField::IssuedOn));
        assert_eq!(refs(&descending), vec!["B", "A"]);
    }

    #[test]
    fn unparsable_dates_sort_last_ascending_and_first_descending() {
        let records = sample();
        let ascending = apply(&records, &FilterCriteria::default(), asc(SortField::IssuedOn));
        assert_eq!(refs(&ascending), vec!["REF-1", "—", "REF-3", "REF-2"]);

        let descending = apply(&records, &FilterCriteria::default(), desc(SortField::IssuedOn));
        assert_eq!(refs(&descending), vec!["REF-2", "REF-3", "—", "REF-1"]);
    }

    #[test]
    fn invalid_dates_keep_relative_order_among_themselves() {
        let records = vec![
            record(Some("bad-1"), "x", "??", None),
            record(Some("ok"), "x", "2024-01-01", None),
            record(Some("bad-2"), "x", "", None),
        ];
        let ascending = apply(&records, &FilterCriteria::default(), asc(SortField::IssuedOn));
        assert_eq!(refs(&ascending), vec!["ok", "bad-1", "bad-2"]);
    }

    #[test]
    fn descending_is_exact_reverse_including_ties() {
        let records = vec![
            record(Some("first"), "x", "2024-01-01", Some("Pending")),
            record(Some("second"), "x", "2024-01-01", Some("pending")),
            record(Some("third"), "x", "2024-01-01", Some("PENDING")),
        ];
        let ascending = apply(&records, &FilterCriteria::default(), asc(SortField::Status));
        let mut reversed = refs(&ascending);
        reversed.reverse();

        let descending = apply(&records, &FilterCriteria::default(), desc(SortField::Status));
        assert_eq!(refs(&descending), reversed);
        assert_eq!(refs(&descending), vec!["third", "second", "first"]);
    }

    #[test]
    fn status_sort_is_case_insensitive_with_missing_first() {
        let records = sample();
        let ascending = apply(&records, &FilterCriteria::default(), asc(SortField::Status));
        assert_eq!(refs(&ascending), vec!["—", "REF-3", "REF-1", "REF-2"]);
    }

    #[test]
    fn status_filter_is_case_insensitive_exact_match() {
        let mut filters = FilterCriteria::default();
        filters.set(FilterField::Status, "pending");
        let view = apply(&sample(), &filters, asc(SortField::Status));
        assert_eq!(refs(&view), vec!["REF-1", "REF-2"]);

        filters.set(FilterField::Status, "pend");
        assert!(apply(&sample(), &filters, asc(SortField::Status)).is_empty());
    }

    #[test]
    fn reference_filter_is_exact_and_skips_missing_references() {
        let mut filters = FilterCriteria::default();
        filters.set(FilterField::ReferenceNo, " ref-1 ");
        let view = apply(&sample(), &filters, asc(SortField::IssuedOn));
        assert_eq!(refs(&view), vec!["REF-1"]);

        filters.set(FilterField::ReferenceNo, "REF");
        assert!(apply(&sample(), &filters, asc(SortField::IssuedOn)).is_empty());
    }

    #[test]
    fn address_filter_matches_any_substring() {
        let records = sample();
        for source in &records {
            let len = source.address_to.chars().count();
            let fragment: String = source.address_to.chars().skip(len / 3).take(3).collect();
            let mut filters = FilterCriteria::default();
            filters.set(FilterField::AddressTo, fragment.to_uppercase());
            let view = apply(&records, &filters, asc(SortField::IssuedOn));
            assert!(view.contains(source), "{fragment:?} should match {source:?}");
        }
    }

    #[test]
    fn filters_combine_with_and() {
        let mut filters = FilterCriteria::default();
        filters.set(FilterField::AddressTo, "embassy");
        filters.set(FilterField::Status, "approved");
        let view = apply(&sample(), &filters, asc(SortField::IssuedOn));
        assert_eq!(refs(&view), vec!["REF-3"]);
    }

    #[test]
    fn empty_filters_only_reorder() {
        let records = sample();
        let view = apply(&records, &FilterCriteria::default(), asc(SortField::IssuedOn));
        assert_eq!(view.len(), records.len());
        for source in &records {
            assert!(view.contains(source));
        }
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let records = sample();
        let before = records.clone();
        let _ = apply(&records, &FilterCriteria::default(), desc(SortField::Status));
        assert_eq!(records, before);
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let bare = record(None, "x", "2024-01-01", None);
        assert_eq!(display_reference_no(&bare), MISSING_REFERENCE_NO);
        assert_eq!(display_status(&bare), MISSING_STATUS);
    }

    #[test]
    fn cache_recomputes_only_when_key_changes() {
        let records = sample();
        let mut cache = ListingCache::default();
        let mut filters = FilterCriteria::default();

        cache.view(1, &records, &filters, SortCriteria::default());
        cache.view(1, &records, &filters, SortCriteria::default());
        assert_eq!(cache.recomputations(), 1);

        filters.set(FilterField::Status, "pending");
        assert_eq!(cache.view(1, &records, &filters, SortCriteria::default()).len(), 2);
        assert_eq!(cache.recomputations(), 2);

        cache.view(2, &records, &filters, SortCriteria::default());
        assert_eq!(cache.recomputations(), 3);

        cache.view(2, &records, &filters, asc(SortField::Status));
        assert_eq!(cache.recomputations(), 4);
    }
}
