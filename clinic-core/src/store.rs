//! Per-view record stores. Each view owns its collection and derives filtered
//! rows, groups and calendar grids from it without mutating the source.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{count_by_date, MonthCursor, MonthGrid};
use crate::filter::{group_by_date, DateRange, FilterState, RecordFilter};
use crate::models::{
    Appointment, AppointmentStatus, MedicalRecord, Notification, Patient, Priority, Record,
    RecordStatus,
};
use crate::source::ClinicDataSource;
use crate::ClinicError;

fn position_of<R: Record>(
    records: &[R],
    section: &'static str,
    id: &str,
) -> Result<usize, ClinicError> {
    records
        .iter()
        .position(|record| record.id() == id)
        .ok_or_else(|| ClinicError::NotFound {
            section,
            id: id.to_string(),
        })
}

/// Appointment list and calendar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentBook {
    appointments: Vec<Appointment>,
}

impl AppointmentBook {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self { appointments }
    }

    pub fn from_source(source: &dyn ClinicDataSource) -> Result<Self, ClinicError> {
        Ok(Self::new(source.appointments()?))
    }

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn filtered(&self, state: &FilterState) -> Vec<&Appointment> {
        RecordFilter::new(state).apply(&self.appointments)
    }

    /// Table rows: the filter restricted to `today ..= today + window_days`.
    pub fn table(
        &self,
        state: &FilterState,
        today: NaiveDate,
        window_days: u32,
    ) -> Vec<&Appointment> {
        let mut scoped = state.clone();
        scoped.range = state.range.intersect(DateRange::upcoming(today, window_days));
        self.filtered(&scoped)
    }

    pub fn grouped_table(
        &self,
        state: &FilterState,
        today: NaiveDate,
        window_days: u32,
    ) -> BTreeMap<NaiveDate, Vec<&Appointment>> {
        group_by_date(self.table(state, today, window_days))
    }

    /// Today's appointments ordered by time.
    pub fn todays(&self, today: NaiveDate) -> Vec<&Appointment> {
        let mut rows: Vec<&Appointment> =
            self.appointments.iter().filter(|a| a.date == today).collect();
        rows.sort_by_key(|a| a.time);
        rows
    }

    /// Month grid counting every appointment, independent of table filters.
    pub fn calendar(
        &self,
        cursor: MonthCursor,
        today: NaiveDate,
        selected: Option<NaiveDate>,
    ) -> MonthGrid {
        let counts = count_by_date(&self.appointments);
        MonthGrid::for_cursor(cursor, today, selected, &counts)
    }

    pub fn cancel(&mut self, id: &str) -> Result<&Appointment, ClinicError> {
        self.set_status(id, AppointmentStatus::Cancelled)
    }

    pub fn mark_arrived(&mut self, id: &str) -> Result<&Appointment, ClinicError> {
        self.set_status(id, AppointmentStatus::Arrived)
    }

    fn set_status(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<&Appointment, ClinicError> {
        let index = position_of(&self.appointments, "appointment", id)?;
        let appointment = &mut self.appointments[index];
        tracing::debug!(id, from = %appointment.status, to = %status, "appointment status changed");
        appointment.status = status;
        Ok(appointment)
    }
}

/// Test result table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicalRecordTable {
    records: Vec<MedicalRecord>,
}

impl MedicalRecordTable {
    pub fn new(records: Vec<MedicalRecord>) -> Self {
        Self { records }
    }

    pub fn from_source(source: &dyn ClinicDataSource) -> Result<Self, ClinicError> {
        Ok(Self::new(source.medical_records()?))
    }

    pub fn all(&self) -> &[MedicalRecord] {
        &self.records
    }

    pub fn filtered(&self, state: &FilterState) -> Vec<&MedicalRecord> {
        RecordFilter::new(state).apply(&self.records)
    }

    /// Distinct patient names, for the patient drop-down.
    pub fn patient_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.iter().map(|r| r.patient_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Distinct test types, for the test type drop-down.
    pub fn test_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.records.iter().map(|r| r.test_type.as_str()).collect();
        types.sort_unstable();
        types.dedup();
        types
    }
}

/// Per-status totals for the summary cards; every status is present.
pub fn status_counts(records: &[&MedicalRecord]) -> BTreeMap<RecordStatus, usize> {
    let mut counts: BTreeMap<RecordStatus, usize> =
        RecordStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for record in records {
        *counts.entry(record.status).or_insert(0) += 1;
    }
    counts
}

/// Per-status totals for the appointment statistics card; every status is present.
pub fn appointment_status_counts(rows: &[&Appointment]) -> BTreeMap<AppointmentStatus, usize> {
    let mut counts: BTreeMap<AppointmentStatus, usize> =
        AppointmentStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for appointment in rows {
        *counts.entry(appointment.status).or_insert(0) += 1;
    }
    counts
}

/// Coarse age of a notification as shown in the feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum RelativeAge {
    WithinHour,
    Hours(i64),
    Days(i64),
}

impl RelativeAge {
    pub fn between(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let hours = now.signed_duration_since(timestamp).num_hours();
        if hours < 1 {
            RelativeAge::WithinHour
        } else if hours < 24 {
            RelativeAge::Hours(hours)
        } else {
            RelativeAge::Days(hours / 24)
        }
    }
}

impl fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeAge::WithinHour => f.write_str("within the hour"),
            RelativeAge::Hours(hours) => write!(f, "{hours} hours ago"),
            RelativeAge::Days(days) => write!(f, "{days} days ago"),
        }
    }
}

/// Notification feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFeed {
    notifications: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self { notifications }
    }

    pub fn from_source(source: &dyn ClinicDataSource) -> Result<Self, ClinicError> {
        Ok(Self::new(source.notifications()?))
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn filtered(&self, state: &FilterState) -> Vec<&Notification> {
        RecordFilter::new(state).apply(&self.notifications)
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    pub fn high_priority_unread(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| !n.is_read && n.priority == Priority::High)
            .count()
    }

    pub fn mark_read(&mut self, id: &str) -> Result<&Notification, ClinicError> {
        let index = position_of(&self.notifications, "notification", id)?;
        let notification = &mut self.notifications[index];
        notification.is_read = true;
        Ok(notification)
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.is_read) {
            notification.is_read = true;
            changed += 1;
        }
        changed
    }

    pub fn delete(&mut self, id: &str) -> Result<Notification, ClinicError> {
        let index = position_of(&self.notifications, "notification", id)?;
        Ok(self.notifications.remove(index))
    }
}

/// Patient list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self { patients }
    }

    pub fn from_source(source: &dyn ClinicDataSource) -> Result<Self, ClinicError> {
        Ok(Self::new(source.patients()?))
    }

    pub fn all(&self) -> &[Patient] {
        &self.patients
    }

    pub fn filtered(&self, state: &FilterState) -> Vec<&Patient> {
        RecordFilter::new(state).apply(&self.patients)
    }

    pub fn find(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }
}
