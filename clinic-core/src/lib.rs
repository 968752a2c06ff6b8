//! Core logic for the clinic dashboard: typed records, month calendar grid,
//! record filtering and per-view stores.

pub mod calendar;
pub mod filter;
pub mod models;
pub mod preferences;
pub mod report;
pub mod source;
pub mod store;

use serde::{Deserialize, Serialize};

pub use calendar::{count_by_date, CalendarCell, CountWith, DateCounter, MonthCursor, MonthGrid};
pub use filter::{filter_records, group_by_date, DateRange, FilterState, RawFilter, RecordFilter};
pub use models::{
    AgeBracket, Appointment, AppointmentKind, AppointmentStatus, Facet, Gender, MedicalRecord,
    Notification, NotificationKind, Patient, Priority, ReadState, Record, RecordStatus,
};
pub use preferences::{Language, MemoryPreferenceStore, PreferenceStore};
pub use report::{
    monthly_counts, test_result_breakdown, DashboardSummary, MonthlyCount, TestTypeBreakdown,
};
pub use source::{ClinicDataSource, ClinicDataset};
pub use store::{
    appointment_status_counts, status_counts, AppointmentBook, MedicalRecordTable, NotificationFeed, PatientRegistry,
    RelativeAge,
};

/// Settings shared by the views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Days after today shown in the appointment table.
    pub upcoming_window_days: u32,
    /// Language used when none has been saved.
    pub default_language: Language,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            upcoming_window_days: 7,
            default_language: Language::default(),
        }
    }
}

/// Errors raised at ingestion and by store mutations. Filtering and calendar
/// building never fail.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("Input data is missing required information")]
    MissingData,
    #[error("Could not read data: {0}")]
    Parse(String),
    #[error("Duplicate {section} id: {id}")]
    DuplicateId { section: &'static str, id: String },
    #[error("No {section} with id {id}")]
    NotFound { section: &'static str, id: String },
    #[error("Other error: {0}")]
    Other(String),
}
