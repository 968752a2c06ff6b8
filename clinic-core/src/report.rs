//! Dashboard summary cards and report aggregates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthCursor;
use crate::filter::DateRange;
use crate::models::{AppointmentStatus, MedicalRecord, Priority, Record, RecordStatus};
use crate::source::ClinicDataset;

/// Figures shown on the dashboard landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub appointments_today: usize,
    pub today_by_status: BTreeMap<AppointmentStatus, usize>,
    pub pending_records: usize,
    pub abnormal_records: usize,
    pub unread_notifications: usize,
    pub high_priority_unread: usize,
    pub patients: usize,
}

impl DashboardSummary {
    pub fn compute(dataset: &ClinicDataset, today: NaiveDate) -> Self {
        let mut today_by_status = BTreeMap::new();
        for appointment in dataset.appointments.iter().filter(|a| a.date == today) {
            *today_by_status.entry(appointment.status).or_insert(0) += 1;
        }

        let records_with = |status: RecordStatus| {
            dataset
                .medical_records
                .iter()
                .filter(|r| r.status == status)
                .count()
        };

        let unread = dataset.notifications.iter().filter(|n| !n.is_read);

        Self {
            date: today,
            appointments_today: today_by_status.values().sum(),
            today_by_status,
            pending_records: records_with(RecordStatus::Pending),
            abnormal_records: records_with(RecordStatus::Abnormal),
            unread_notifications: unread.clone().count(),
            high_priority_unread: unread.filter(|n| n.priority == Priority::High).count(),
            patients: dataset.patients.len(),
        }
    }
}

/// Records per calendar month, for visit charts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Counts records per month inside `range`. Every month between the first and
/// last (range bounds, or the data when a bound is open) appears, zero-filled.
pub fn monthly_counts<'a, R, I>(records: I, range: DateRange) -> Vec<MonthlyCount>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut buckets: BTreeMap<MonthCursor, usize> = BTreeMap::new();
    for date in records
        .into_iter()
        .filter_map(Record::date)
        .filter(|date| range.contains(*date))
    {
        *buckets.entry(MonthCursor::containing(date)).or_insert(0) += 1;
    }

    let first = range
        .start
        .map(MonthCursor::containing)
        .or_else(|| buckets.keys().next().copied());
    let last = range
        .end
        .map(MonthCursor::containing)
        .or_else(|| buckets.keys().next_back().copied());

    let (Some(mut cursor), Some(last)) = (first, last) else {
        return Vec::new();
    };

    let mut counts = Vec::new();
    while cursor <= last {
        counts.push(MonthlyCount {
            year: cursor.year(),
            month: cursor.month(),
            count: buckets.get(&cursor).copied().unwrap_or(0),
        });
        cursor = cursor.next();
    }
    counts
}

/// Normal versus abnormal results for one test type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestTypeBreakdown {
    pub test_type: String,
    pub normal: usize,
    pub abnormal: usize,
}

impl TestTypeBreakdown {
    pub fn total(&self) -> usize {
        self.normal + self.abnormal
    }
}

/// Result breakdown per test type, ordered by test type. Pending records have
/// no result yet and are not counted; completed and reviewed ones are normal.
pub fn test_result_breakdown<'a, I>(records: I) -> Vec<TestTypeBreakdown>
where
    I: IntoIterator<Item = &'a MedicalRecord>,
{
    let mut by_type: BTreeMap<&'a str, (usize, usize)> = BTreeMap::new();
    for record in records {
        if record.status == RecordStatus::Pending {
            continue;
        }
        let (normal, abnormal) = by_type.entry(record.test_type.as_str()).or_insert((0, 0));
        if record.status == RecordStatus::Abnormal {
            *abnormal += 1;
        } else {
            *normal += 1;
        }
    }

    by_type
        .into_iter()
        .map(|(test_type, (normal, abnormal))| TestTypeBreakdown {
            test_type: test_type.to_string(),
            normal,
            abnormal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, AppointmentKind, Notification, NotificationKind};
    use chrono::{NaiveTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn appt(id: &str, day: NaiveDate, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            patient_name: "Misaki Suzuki".into(),
            patient_id: "P004".into(),
            date: day,
            time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            doctor: "Dr. Sato".into(),
            kind: AppointmentKind::HealthScreening,
            status,
            contact: String::new(),
            email: String::new(),
        }
    }

    fn record(id: &str, day: NaiveDate, status: RecordStatus) -> MedicalRecord {
        typed_record(id, "ECG", day, status)
    }

    fn typed_record(
        id: &str,
        test_type: &str,
        day: NaiveDate,
        status: RecordStatus,
    ) -> MedicalRecord {
        MedicalRecord {
            id: id.into(),
            patient_name: "Misaki Suzuki".into(),
            patient_id: "P004".into(),
            test_type: test_type.into(),
            result: "Sinus rhythm".into(),
            doctor: "Dr. Sato".into(),
            status,
            recorded_on: day,
            notes: None,
        }
    }

    #[test]
    fn summary_counts_today_and_unread() {
        let today = date(2025, 1, 10);
        let dataset = ClinicDataset {
            appointments: vec![
                appt("A1", today, AppointmentStatus::Confirmed),
                appt("A2", today, AppointmentStatus::Arrived),
                appt("A3", date(2025, 1, 11), AppointmentStatus::Confirmed),
            ],
            medical_records: vec![
                record("R1", today, RecordStatus::Pending),
                record("R2", today, RecordStatus::Abnormal),
                record("R3", today, RecordStatus::Abnormal),
            ],
            notifications: vec![Notification {
                id: "N1".into(),
                kind: NotificationKind::Error,
                title: "Printer offline".into(),
                message: "Reception printer is not responding".into(),
                timestamp: Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap(),
                is_read: false,
                priority: Priority::High,
                patient_id: None,
                patient_name: None,
                action_required: true,
            }],
            patients: Vec::new(),
        };

        let summary = DashboardSummary::compute(&dataset, today);
        assert_eq!(summary.appointments_today, 2);
        assert_eq!(summary.today_by_status[&AppointmentStatus::Arrived], 1);
        assert_eq!(summary.pending_records, 1);
        assert_eq!(summary.abnormal_records, 2);
        assert_eq!(summary.unread_notifications, 1);
        assert_eq!(summary.high_priority_unread, 1);
        assert_eq!(summary.patients, 0);
    }

    #[test]
    fn monthly_counts_are_zero_filled_within_range() {
        let records = vec![
            record("R1", date(2024, 1, 3), RecordStatus::Completed),
            record("R2", date(2024, 1, 31), RecordStatus::Completed),
            record("R3", date(2024, 3, 1), RecordStatus::Completed),
            record("R4", date(2024, 5, 1), RecordStatus::Completed),
        ];
        let range = DateRange::between(date(2024, 1, 1), date(2024, 3, 31));
        let counts = monthly_counts(&records, range);
        let flat: Vec<_> = counts.iter().map(|c| (c.month, c.count)).collect();
        assert_eq!(flat, vec![(1, 2), (2, 0), (3, 1)]);
    }

    #[test]
    fn open_range_spans_the_data() {
        let records = vec![
            record("R1", date(2024, 11, 3), RecordStatus::Completed),
            record("R2", date(2025, 1, 5), RecordStatus::Completed),
        ];
        let counts = monthly_counts(&records, DateRange::default());
        assert_eq!(counts.len(), 3);
        assert_eq!((counts[0].year, counts[0].month), (2024, 11));
        assert_eq!((counts[2].year, counts[2].month, counts[2].count), (2025, 1, 1));

        let empty: Vec<MedicalRecord> = Vec::new();
        assert!(monthly_counts(&empty, DateRange::default()).is_empty());
    }

    #[test]
    fn results_break_down_by_test_type() {
        let day = date(2025, 1, 5);
        let records = vec![
            typed_record("R1", "Blood test", day, RecordStatus::Completed),
            typed_record("R2", "Blood test", day, RecordStatus::Abnormal),
            typed_record("R3", "Blood test", day, RecordStatus::Reviewed),
            typed_record("R4", "X-ray", day, RecordStatus::Abnormal),
            typed_record("R5", "MRI", day, RecordStatus::Pending),
        ];
        let breakdown = test_result_breakdown(&records);
        let types: Vec<_> = breakdown.iter().map(|b| b.test_type.as_str()).collect();
        assert_eq!(types, vec!["Blood test", "X-ray"]);
        assert_eq!((breakdown[0].normal, breakdown[0].abnormal), (2, 1));
        assert_eq!(breakdown[0].total(), 3);
        assert_eq!((breakdown[1].normal, breakdown[1].abnormal), (0, 1));
    }
}
