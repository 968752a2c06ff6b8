//! Clinic records shown by the dashboard views and the `Record` abstraction the
//! filter and calendar operate on.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Declares a closed categorical enum with a stable wire code and a display label.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, ::serde::Serialize, ::serde::Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Code used in JSON, filter state and UI attributes.
            pub fn as_code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Human readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_code())
            }
        }
    };
}

pub(crate) use coded_enum;

coded_enum! {
    /// Name of a categorical filter dimension.
    Facet {
        Status => ("status", "Status"),
        Doctor => ("doctor", "Doctor"),
        Patient => ("patient", "Patient"),
        Kind => ("kind", "Type"),
        TestType => ("test_type", "Test type"),
        Priority => ("priority", "Priority"),
        Gender => ("gender", "Gender"),
        AgeBracket => ("age_bracket", "Age"),
        ReadState => ("read_state", "Read state"),
    }
}

coded_enum! {
    AppointmentStatus {
        Confirmed => ("confirmed", "Confirmed"),
        Pending => ("pending", "Pending"),
        Cancelled => ("cancelled", "Cancelled"),
        Arrived => ("arrived", "Arrived"),
    }
}

coded_enum! {
    AppointmentKind {
        Checkup => ("checkup", "Regular checkup"),
        Consultation => ("consultation", "Consultation"),
        Treatment => ("treatment", "Treatment"),
        HealthScreening => ("health_screening", "Health screening"),
        FollowUp => ("follow_up", "Follow-up"),
    }
}

coded_enum! {
    /// Review state of a test result.
    RecordStatus {
        Pending => ("pending", "Pending"),
        Completed => ("completed", "Completed"),
        Abnormal => ("abnormal", "Needs attention"),
        Reviewed => ("reviewed", "Reviewed"),
    }
}

coded_enum! {
    NotificationKind {
        Maintenance => ("maintenance", "Maintenance"),
        Error => ("error", "Error"),
        Patient => ("patient", "Patient"),
        Appointment => ("appointment", "Appointment"),
        System => ("system", "System"),
    }
}

coded_enum! {
    Priority {
        High => ("high", "High"),
        Medium => ("medium", "Medium"),
        Low => ("low", "Low"),
    }
}

coded_enum! {
    Gender {
        Male => ("male", "Male"),
        Female => ("female", "Female"),
    }
}

coded_enum! {
    AgeBracket {
        TwentyToThirty => ("20-30", "20-30"),
        ThirtyOneToFifty => ("31-50", "31-50"),
        FiftyOnePlus => ("51+", "51+"),
    }
}

coded_enum! {
    ReadState {
        Read => ("read", "Read"),
        Unread => ("unread", "Unread"),
    }
}

impl AgeBracket {
    /// Bracket used by the patient list age filter. Patients under 20 fall in none.
    pub fn for_age(age: u32) -> Option<Self> {
        match age {
            20..=30 => Some(AgeBracket::TwentyToThirty),
            31..=50 => Some(AgeBracket::ThirtyOneToFifty),
            51.. => Some(AgeBracket::FiftyOnePlus),
            _ => None,
        }
    }
}

/// A flat item the dashboard can search, filter, group and count per day.
pub trait Record {
    /// Identifier, unique within its collection.
    fn id(&self) -> &str;

    /// Calendar date the record is filed under.
    fn date(&self) -> Option<NaiveDate>;

    /// Secondary sort key inside a date group.
    fn time_of_day(&self) -> Option<NaiveTime> {
        None
    }

    /// Fields matched by the free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Current value of a categorical field, as its code.
    fn facet(&self, facet: Facet) -> Option<&str>;

    /// Whether `value` is a legal filter value for `facet` on this record type.
    fn accepts(facet: Facet, value: &str) -> bool
    where
        Self: Sized;
}

/// A booked visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub doctor: String,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
}

impl Record for Appointment {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn time_of_day(&self) -> Option<NaiveTime> {
        Some(self.time)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.patient_name.as_str(),
            self.id.as_str(),
            self.doctor.as_str(),
        ]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_code()),
            Facet::Doctor => Some(&self.doctor),
            Facet::Patient => Some(&self.patient_name),
            Facet::Kind => Some(self.kind.as_code()),
            _ => None,
        }
    }

    fn accepts(facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Status => AppointmentStatus::from_code(value).is_some(),
            Facet::Kind => AppointmentKind::from_code(value).is_some(),
            Facet::Doctor | Facet::Patient => true,
            _ => false,
        }
    }
}

/// A lab or imaging result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub test_type: String,
    pub result: String,
    pub doctor: String,
    pub status: RecordStatus,
    pub recorded_on: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for MedicalRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.recorded_on)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.patient_name.as_str(),
            self.id.as_str(),
            self.test_type.as_str(),
            self.doctor.as_str(),
        ]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Status => Some(self.status.as_code()),
            Facet::Doctor => Some(&self.doctor),
            Facet::Patient => Some(&self.patient_name),
            Facet::TestType => Some(&self.test_type),
            _ => None,
        }
    }

    fn accepts(facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Status => RecordStatus::from_code(value).is_some(),
            Facet::Doctor | Facet::Patient | Facet::TestType => true,
            _ => false,
        }
    }
}

/// An entry in the notification feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    pub priority: Priority,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub action_required: bool,
}

impl Notification {
    pub fn read_state(&self) -> ReadState {
        if self.is_read {
            ReadState::Read
        } else {
            ReadState::Unread
        }
    }
}

impl Record for Notification {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.timestamp.date_naive())
    }

    fn time_of_day(&self) -> Option<NaiveTime> {
        Some(self.timestamp.time())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.message.as_str()];
        if let Some(name) = &self.patient_name {
            fields.push(name);
        }
        fields
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Kind => Some(self.kind.as_code()),
            Facet::Priority => Some(self.priority.as_code()),
            Facet::ReadState => Some(self.read_state().as_code()),
            Facet::Patient => self.patient_name.as_deref(),
            _ => None,
        }
    }

    fn accepts(facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Kind => NotificationKind::from_code(value).is_some(),
            Facet::Priority => Priority::from_code(value).is_some(),
            Facet::ReadState => ReadState::from_code(value).is_some(),
            Facet::Patient => true,
            _ => false,
        }
    }
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub next_appointment: Option<NaiveDate>,
}

impl Patient {
    pub fn age_bracket(&self) -> Option<AgeBracket> {
        AgeBracket::for_age(self.age)
    }
}

impl Record for Patient {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> Option<NaiveDate> {
        self.next_appointment
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str()]
    }

    fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Gender => Some(self.gender.as_code()),
            Facet::AgeBracket => self.age_bracket().map(AgeBracket::as_code),
            _ => None,
        }
    }

    fn accepts(facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Gender => Gender::from_code(value).is_some(),
            Facet::AgeBracket => AgeBracket::from_code(value).is_some(),
            _ => false,
        }
    }
}

/// Appointment times travel as `HH:MM`, or `HH:MM:SS` when seconds are set.
mod hh_mm {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";
    const FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 {
            FORMAT
        } else {
            FORMAT_WITH_SECONDS
        };
        serializer.collect_str(&time.format(format))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, FORMAT_WITH_SECONDS))
            .map_err(|err| de::Error::custom(format!("invalid time {raw:?}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment() -> Appointment {
        Appointment {
            id: "A001".into(),
            patient_name: "Taro Tanaka".into(),
            patient_id: "P001".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            doctor: "Dr. Yamada".into(),
            kind: AppointmentKind::Checkup,
            status: AppointmentStatus::Confirmed,
            contact: "090-1234-5678".into(),
            email: "tanaka@example.com".into(),
        }
    }

    #[test]
    fn codes_round_trip_through_from_code() {
        for status in AppointmentStatus::ALL {
            assert_eq!(AppointmentStatus::from_code(status.as_code()), Some(*status));
        }
        assert_eq!(Facet::from_code("test_type"), Some(Facet::TestType));
        assert_eq!(Priority::from_code("urgent"), None);
    }

    #[test]
    fn age_brackets_match_patient_list_ranges() {
        assert_eq!(AgeBracket::for_age(19), None);
        assert_eq!(AgeBracket::for_age(20), Some(AgeBracket::TwentyToThirty));
        assert_eq!(AgeBracket::for_age(30), Some(AgeBracket::TwentyToThirty));
        assert_eq!(AgeBracket::for_age(31), Some(AgeBracket::ThirtyOneToFifty));
        assert_eq!(AgeBracket::for_age(51), Some(AgeBracket::FiftyOnePlus));
    }

    #[test]
    fn appointment_serializes_with_short_time_and_codes() {
        let value = serde_json::to_value(appointment()).unwrap();
        assert_eq!(value["time"], "09:00");
        assert_eq!(value["date"], "2025-01-20");
        assert_eq!(value["status"], "confirmed");
        assert_eq!(value["kind"], "checkup");

        let back: Appointment = serde_json::from_value(value).unwrap();
        assert_eq!(back, appointment());
    }

    #[test]
    fn appointment_time_keeps_seconds() {
        let mut value = serde_json::to_value(appointment()).unwrap();
        value["time"] = "09:00:45".into();

        let loaded: Appointment = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.time, NaiveTime::from_hms_opt(9, 0, 45).unwrap());

        let written = serde_json::to_value(&loaded).unwrap();
        assert_eq!(written["time"], "09:00:45");
        let reloaded: Appointment = serde_json::from_value(written).unwrap();
        assert_eq!(reloaded, loaded);
    }

    #[test]
    fn appointment_exposes_facets_and_search_fields() {
        let appt = appointment();
        assert_eq!(appt.facet(Facet::Status), Some("confirmed"));
        assert_eq!(appt.facet(Facet::Priority), None);
        assert_eq!(appt.search_fields(), vec!["Taro Tanaka", "A001", "Dr. Yamada"]);
        assert!(Appointment::accepts(Facet::Status, "arrived"));
        assert!(!Appointment::accepts(Facet::Status, "done"));
        assert!(!Appointment::accepts(Facet::Gender, "male"));
    }

    #[test]
    fn notification_read_state_is_a_facet() {
        let notification = Notification {
            id: "N1".into(),
            kind: NotificationKind::System,
            title: "Backup finished".into(),
            message: "Nightly backup completed".into(),
            timestamp: "2025-01-10T08:30:00Z".parse().unwrap(),
            is_read: false,
            priority: Priority::Low,
            patient_id: None,
            patient_name: None,
            action_required: false,
        };
        assert_eq!(notification.facet(Facet::ReadState), Some("unread"));
        assert_eq!(notification.date(), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(notification.search_fields().len(), 2);
    }
}
