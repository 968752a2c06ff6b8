//! Search, facet and date-range filtering over record collections.
//!
//! Filtering is permissive: blank values, unknown facet codes and unparseable
//! dates are dropped and act as "no constraint" so a view always renders.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Facet, Record};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date interval; a missing bound is open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    /// `today` through `today + days`.
    pub fn upcoming(today: NaiveDate, days: u32) -> Self {
        let end = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self::between(today, end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| start <= date) && self.end.map_or(true, |end| date <= end)
    }

    /// Tightest range satisfying both. May be empty (start after end).
    pub fn intersect(self, other: DateRange) -> DateRange {
        DateRange {
            start: self.start.max(other.start),
            end: match (self.end, other.end) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

/// User-selected filter values for one view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub facets: BTreeMap<Facet, String>,
    #[serde(default)]
    pub range: DateRange,
}

impl FilterState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_facet(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.set_facet(facet, value);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Sets a facet; an empty value clears it.
    pub fn set_facet(&mut self, facet: Facet, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.facets.remove(&facet);
        } else {
            self.facets.insert(facet, value);
        }
    }

    pub fn facet(&self, facet: Facet) -> Option<&str> {
        self.facets.get(&facet).map(String::as_str)
    }

    /// Toggle semantics used by filter chips: selecting the active value clears it.
    pub fn toggle_facet(&mut self, facet: Facet, value: &str) {
        if self.facet(facet) == Some(value) {
            self.facets.remove(&facet);
        } else {
            self.facets.insert(facet, value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.facets.values().all(|v| v.trim().is_empty())
            && self.range.is_unbounded()
    }
}

/// Untyped filter input as it arrives from a form, JS or the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub facets: BTreeMap<String, String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    /// A single selected day, intersected with `start`/`end`.
    #[serde(default)]
    pub date: Option<String>,
}

impl From<RawFilter> for FilterState {
    fn from(raw: RawFilter) -> Self {
        let mut state = FilterState {
            search: raw.search.unwrap_or_default(),
            ..FilterState::default()
        };

        for (name, value) in raw.facets {
            match Facet::from_code(name.trim()) {
                Some(facet) => state.set_facet(facet, value),
                None => tracing::warn!(facet = %name, "ignoring unknown filter"),
            }
        }

        state.range = DateRange {
            start: raw.start.as_deref().and_then(parse_lenient_date),
            end: raw.end.as_deref().and_then(parse_lenient_date),
        };
        if let Some(day) = raw.date.as_deref().and_then(parse_lenient_date) {
            state.range = state.range.intersect(DateRange::single(day));
        }

        state
    }
}

/// Parses `YYYY-MM-DD`; blank or malformed input yields `None`.
pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(value = raw, %err, "ignoring malformed date filter");
            None
        }
    }
}

/// A [`FilterState`] normalized for one record type.
#[derive(Debug, Clone)]
pub struct RecordFilter<R> {
    needle: String,
    facets: Vec<(Facet, String)>,
    range: DateRange,
    _record: PhantomData<fn(&R)>,
}

impl<R: Record> RecordFilter<R> {
    /// The search term is trimmed and lowercased, so a whitespace-only search
    /// is no constraint. Facet values are trimmed; blank values and values `R`
    /// does not accept are dropped.
    pub fn new(state: &FilterState) -> Self {
        let facets = state
            .facets
            .iter()
            .filter_map(|(facet, value)| {
                let value = value.trim();
                if value.is_empty() {
                    return None;
                }
                if !R::accepts(*facet, value) {
                    tracing::warn!(%facet, value, "dropping filter value not valid for record type");
                    return None;
                }
                Some((*facet, value.to_string()))
            })
            .collect();

        Self {
            needle: state.search.trim().to_lowercase(),
            facets,
            range: state.range,
            _record: PhantomData,
        }
    }

    /// True when no active constraint remains after normalization.
    pub fn is_pass_through(&self) -> bool {
        self.needle.is_empty() && self.facets.is_empty() && self.range.is_unbounded()
    }

    pub fn matches(&self, record: &R) -> bool {
        self.matches_search(record) && self.matches_facets(record) && self.matches_range(record)
    }

    /// Keeps matching records in source order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a R>
    where
        R: 'a,
        I: IntoIterator<Item = &'a R>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }

    fn matches_search(&self, record: &R) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    fn matches_facets(&self, record: &R) -> bool {
        self.facets
            .iter()
            .all(|(facet, value)| record.facet(*facet) == Some(value.as_str()))
    }

    fn matches_range(&self, record: &R) -> bool {
        if self.range.is_unbounded() {
            return true;
        }
        record.date().is_some_and(|date| self.range.contains(date))
    }
}

/// Filters `records` with `state`.
pub fn filter_records<'a, R: Record>(records: &'a [R], state: &FilterState) -> Vec<&'a R> {
    RecordFilter::<R>::new(state).apply(records)
}

/// Groups records by date, ascending, each group ordered by time of day.
/// Records without a date are left out.
pub fn group_by_date<'a, R, I>(records: I) -> BTreeMap<NaiveDate, Vec<&'a R>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut groups: BTreeMap<NaiveDate, Vec<&'a R>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            groups.entry(date).or_default().push(record);
        }
    }
    for group in groups.values_mut() {
        group.sort_by_key(|record| record.time_of_day());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, AppointmentKind, AppointmentStatus, Gender, Patient};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn appt(id: &str, day: NaiveDate, time: (u32, u32), status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            patient_name: format!("Patient {id}"),
            patient_id: format!("P-{id}"),
            date: day,
            time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            doctor: "Dr. Suzuki".into(),
            kind: AppointmentKind::Consultation,
            status,
            contact: String::new(),
            email: String::new(),
        }
    }

    fn pair() -> Vec<Appointment> {
        vec![
            appt("A1", date(2025, 1, 10), (14, 0), AppointmentStatus::Confirmed),
            appt("A2", date(2025, 1, 10), (9, 30), AppointmentStatus::Cancelled),
        ]
    }

    fn ids(records: &[&Appointment]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let records = pair();
        let result = filter_records(&records, &FilterState::default());
        assert_eq!(ids(&result), vec!["A1", "A2"]);
        assert!(RecordFilter::<Appointment>::new(&FilterState::default()).is_pass_through());
    }

    #[test]
    fn status_facet_keeps_only_matching_records() {
        let records = pair();
        let state = FilterState::default().with_facet(Facet::Status, "confirmed");
        assert_eq!(ids(&filter_records(&records, &state)), vec!["A1"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let records = vec![
            appt("J31", date(2025, 1, 31), (9, 0), AppointmentStatus::Confirmed),
            appt("F01", date(2025, 2, 1), (9, 0), AppointmentStatus::Confirmed),
            appt("J01", date(2025, 1, 1), (9, 0), AppointmentStatus::Confirmed),
        ];
        let state =
            FilterState::default().with_range(DateRange::between(date(2025, 1, 1), date(2025, 1, 31)));
        assert_eq!(ids(&filter_records(&records, &state)), vec!["J31", "J01"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = pair();
        let by_id = FilterState::default().with_search("a2");
        assert_eq!(ids(&filter_records(&records, &by_id)), vec!["A2"]);

        let by_doctor = FilterState::default().with_search("  SUZUKI ");
        assert_eq!(filter_records(&records, &by_doctor).len(), 2);

        let none = FilterState::default().with_search("nobody");
        assert!(filter_records(&records, &none).is_empty());
    }

    #[test]
    fn whitespace_only_search_matches_everything() {
        let records = pair();
        let state = FilterState::default().with_search("   ");
        assert!(RecordFilter::<Appointment>::new(&state).is_pass_through());
        assert_eq!(filter_records(&records, &state).len(), 2);
    }

    #[test]
    fn filters_combine_with_and() {
        let records = pair();
        let state = FilterState::default()
            .with_search("patient")
            .with_facet(Facet::Status, "cancelled")
            .with_facet(Facet::Doctor, "Dr. Suzuki");
        assert_eq!(ids(&filter_records(&records, &state)), vec!["A2"]);

        let other_doctor = state.with_facet(Facet::Doctor, "Dr. Sato");
        assert!(filter_records(&records, &other_doctor).is_empty());
    }

    #[test]
    fn invalid_facet_values_are_no_constraint() {
        let records = pair();
        let state = FilterState::default()
            .with_facet(Facet::Status, "finished")
            .with_facet(Facet::Priority, "high")
            .with_facet(Facet::Kind, "   ");
        assert_eq!(filter_records(&records, &state).len(), 2);
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = pair();
        let state = FilterState::default().with_search("patient a");
        let filter = RecordFilter::<Appointment>::new(&state);
        let once = filter.apply(&records);
        let twice = filter.apply(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn source_collection_is_untouched() {
        let records = pair();
        let before = records.clone();
        let state = FilterState::default().with_facet(Facet::Status, "confirmed");
        let _ = filter_records(&records, &state);
        assert_eq!(records, before);
    }

    #[test]
    fn grouping_sorts_by_time_within_date() {
        let records = pair();
        let groups = group_by_date(&records);
        assert_eq!(groups.len(), 1);
        let day = &groups[&date(2025, 1, 10)];
        assert_eq!(ids(day), vec!["A2", "A1"]);
    }

    #[test]
    fn grouping_orders_dates_ascending() {
        let records = vec![
            appt("B", date(2025, 3, 2), (9, 0), AppointmentStatus::Pending),
            appt("A", date(2025, 1, 2), (9, 0), AppointmentStatus::Pending),
        ];
        let keys: Vec<_> = group_by_date(&records).into_keys().collect();
        assert_eq!(keys, vec![date(2025, 1, 2), date(2025, 3, 2)]);
    }

    #[test]
    fn undated_records_fall_out_of_ranges_and_groups() {
        let patients = vec![Patient {
            id: "P1".into(),
            name: "Hanako Sato".into(),
            age: 42,
            gender: Gender::Female,
            contact: String::new(),
            email: String::new(),
            address: String::new(),
            next_appointment: None,
        }];
        assert_eq!(filter_records(&patients, &FilterState::default()).len(), 1);
        let ranged = FilterState::default().with_range(DateRange::single(date(2025, 1, 1)));
        assert!(filter_records(&patients, &ranged).is_empty());
        assert!(group_by_date(&patients).is_empty());

        let by_bracket = FilterState::default().with_facet(Facet::AgeBracket, "31-50");
        assert_eq!(filter_records(&patients, &by_bracket).len(), 1);
    }

    #[test]
    fn raw_filter_is_parsed_leniently() {
        let raw = RawFilter {
            search: Some("tanaka".into()),
            facets: BTreeMap::from([
                ("status".to_string(), "confirmed".to_string()),
                ("colour".to_string(), "blue".to_string()),
            ]),
            start: Some("2025-01-01".into()),
            end: Some("31/01/2025".into()),
            date: None,
        };
        let state = FilterState::from(raw);
        assert_eq!(state.search, "tanaka");
        assert_eq!(state.facet(Facet::Status), Some("confirmed"));
        assert_eq!(state.facets.len(), 1);
        assert_eq!(state.range.start, Some(date(2025, 1, 1)));
        assert_eq!(state.range.end, None);
    }

    #[test]
    fn selected_day_narrows_range() {
        let raw = RawFilter {
            start: Some("2025-01-01".into()),
            end: Some("2025-01-08".into()),
            date: Some("2025-01-05".into()),
            ..RawFilter::default()
        };
        let state = FilterState::from(raw);
        assert_eq!(state.range, DateRange::single(date(2025, 1, 5)));
    }

    #[test]
    fn range_helpers() {
        let week = DateRange::upcoming(date(2025, 1, 28), 7);
        assert_eq!(week.end, Some(date(2025, 2, 4)));
        assert!(week.contains(date(2025, 2, 4)));
        assert!(!week.contains(date(2025, 1, 27)));

        let disjoint = week.intersect(DateRange::single(date(2025, 3, 1)));
        assert!(!disjoint.contains(date(2025, 3, 1)));
        assert!(DateRange::default().contains(date(1900, 1, 1)));
    }

    #[test]
    fn toggling_a_facet_twice_clears_it() {
        let mut state = FilterState::default();
        state.toggle_facet(Facet::Status, "pending");
        assert_eq!(state.facet(Facet::Status), Some("pending"));
        state.toggle_facet(Facet::Status, "pending");
        assert!(state.is_empty());
    }
}
