//! Data access seam: views are initialized from a [`ClinicDataSource`]
//! instead of owning inline sample data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, MedicalRecord, Notification, Patient, Record};
use crate::ClinicError;

/// Everything the dashboard views display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicDataset {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub medical_records: Vec<MedicalRecord>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl ClinicDataset {
    /// Rejects collections with repeated ids.
    pub fn validate(&self) -> Result<(), ClinicError> {
        ensure_unique_ids("appointment", &self.appointments)?;
        ensure_unique_ids("medical record", &self.medical_records)?;
        ensure_unique_ids("notification", &self.notifications)?;
        ensure_unique_ids("patient", &self.patients)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
            && self.medical_records.is_empty()
            && self.notifications.is_empty()
            && self.patients.is_empty()
    }
}

fn ensure_unique_ids<R: Record>(section: &'static str, records: &[R]) -> Result<(), ClinicError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(ClinicError::DuplicateId {
                section,
                id: record.id().to_string(),
            });
        }
    }
    Ok(())
}

/// Supplies the records each view starts from.
pub trait ClinicDataSource {
    fn appointments(&self) -> Result<Vec<Appointment>, ClinicError>;
    fn medical_records(&self) -> Result<Vec<MedicalRecord>, ClinicError>;
    fn notifications(&self) -> Result<Vec<Notification>, ClinicError>;
    fn patients(&self) -> Result<Vec<Patient>, ClinicError>;
}

impl ClinicDataSource for ClinicDataset {
    fn appointments(&self) -> Result<Vec<Appointment>, ClinicError> {
        Ok(self.appointments.clone())
    }

    fn medical_records(&self) -> Result<Vec<MedicalRecord>, ClinicError> {
        Ok(self.medical_records.clone())
    }

    fn notifications(&self) -> Result<Vec<Notification>, ClinicError> {
        Ok(self.notifications.clone())
    }

    fn patients(&self) -> Result<Vec<Patient>, ClinicError> {
        Ok(self.patients.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.into(),
            name: format!("Patient {id}"),
            age: 40,
            gender: Gender::Male,
            contact: String::new(),
            email: String::new(),
            address: String::new(),
            next_appointment: None,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dataset = ClinicDataset {
            patients: vec![patient("P001"), patient("P002"), patient("P001")],
            ..ClinicDataset::default()
        };
        match dataset.validate() {
            Err(ClinicError::DuplicateId { section, id }) => {
                assert_eq!(section, "patient");
                assert_eq!(id, "P001");
            }
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn dataset_is_its_own_source() {
        let dataset = ClinicDataset {
            patients: vec![patient("P001")],
            ..ClinicDataset::default()
        };
        assert!(dataset.validate().is_ok());
        assert_eq!(dataset.patients().unwrap().len(), 1);
        assert!(dataset.appointments().unwrap().is_empty());
    }
}
