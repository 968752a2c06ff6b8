//! JSON dataset ingestion for the clinic dashboard.
//!
//! The dataset is an object with optional `appointments`, `medical_records`,
//! `notifications` and `patients` arrays. Each entry is decoded on its own so
//! errors name the offending section and index; ids are checked for
//! uniqueness before the data reaches a view.

use std::path::Path;

use clinic_core::{
    Appointment, ClinicDataSource, ClinicDataset, ClinicError, MedicalRecord, Notification, Patient,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Load a dataset from a JSON string.
pub fn load_dataset_str(json: &str) -> Result<ClinicDataset, ClinicError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| ClinicError::Parse(err.to_string()))?;
    load_dataset_value(&value)
}

/// Load a dataset from a `serde_json::Value`.
pub fn load_dataset_value(value: &Value) -> Result<ClinicDataset, ClinicError> {
    let root = value.as_object().ok_or(ClinicError::MissingData)?;

    let dataset = ClinicDataset {
        appointments: decode_section::<Appointment>(root, "appointments")?,
        medical_records: decode_section::<MedicalRecord>(root, "medical_records")?,
        notifications: decode_section::<Notification>(root, "notifications")?,
        patients: decode_section::<Patient>(root, "patients")?,
    };
    dataset.validate()?;

    tracing::debug!(
        appointments = dataset.appointments.len(),
        medical_records = dataset.medical_records.len(),
        notifications = dataset.notifications.len(),
        patients = dataset.patients.len(),
        "dataset loaded"
    );

    Ok(dataset)
}

/// Load a dataset from a JSON file.
pub fn load_dataset_path(path: impl AsRef<Path>) -> Result<ClinicDataset, ClinicError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|err| ClinicError::Other(format!("Cannot read {}: {err}", path.display())))?;
    load_dataset_str(&json)
}

fn decode_section<T: DeserializeOwned>(
    root: &Map<String, Value>,
    section: &str,
) -> Result<Vec<T>, ClinicError> {
    let entries = match root.get(section) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ClinicError::Parse(format!(
                "Expected {section} to be an array"
            )))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            T::deserialize(entry)
                .map_err(|err| ClinicError::Parse(format!("{section}[{index}]: {err}")))
        })
        .collect()
}

/// A [`ClinicDataSource`] backed by a validated JSON dataset.
#[derive(Debug, Clone, Default)]
pub struct JsonDataSource {
    dataset: ClinicDataset,
}

impl JsonDataSource {
    pub fn from_json(json: &str) -> Result<Self, ClinicError> {
        Ok(Self {
            dataset: load_dataset_str(json)?,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClinicError> {
        Ok(Self {
            dataset: load_dataset_path(path)?,
        })
    }

    pub fn dataset(&self) -> &ClinicDataset {
        &self.dataset
    }
}

impl ClinicDataSource for JsonDataSource {
    fn appointments(&self) -> Result<Vec<Appointment>, ClinicError> {
        self.dataset.appointments()
    }

    fn medical_records(&self) -> Result<Vec<MedicalRecord>, ClinicError> {
        self.dataset.medical_records()
    }

    fn notifications(&self) -> Result<Vec<Notification>, ClinicError> {
        self.dataset.notifications()
    }

    fn patients(&self) -> Result<Vec<Patient>, ClinicError> {
        self.dataset.patients()
    }
}
