//! In-memory record store
//!
//! Enforces the same unique constraints as the relational schema (patient
//! number, national id, email) so the use cases behave identically against
//! it. Used by unit tests and by the server's router tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{BloodType, Gender, NewBloodType, NewGender, Patient};
use crate::store::{BloodTypeStore, GenderStore, PatientStore};

#[derive(Default)]
struct Tables {
    patients: Vec<Patient>,
    genders: Vec<Gender>,
    blood_types: Vec<BloodType>,
    next_patient_id: i64,
}

/// All three stores over one shared set of tables
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn duplicate(existing: &Patient, candidate: &Patient) -> Option<&'static str> {
    if existing.id == candidate.id {
        return None;
    }
    if existing.number == candidate.number {
        Some("number")
    } else if existing.national_id == candidate.national_id {
        Some("national_id")
    } else if existing.email == candidate.email {
        Some("email")
    } else {
        None
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        Ok(self
            .tables()
            .patients
            .iter()
            .find(|p| p.id == Some(id))
            .cloned())
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        Ok(self
            .tables()
            .patients
            .iter()
            .find(|p| p.id == Some(id) && p.active)
            .cloned())
    }

    async fn find_all_active(&self) -> Result<Vec<Patient>, StoreError> {
        Ok(self
            .tables()
            .patients
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect())
    }

    async fn exists_by_number(&self, number: &str) -> Result<bool, StoreError> {
        Ok(self.tables().patients.iter().any(|p| p.number == number))
    }

    async fn exists_by_national_id(&self, national_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables()
            .patients
            .iter()
            .any(|p| p.national_id == national_id))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.tables().patients.iter().any(|p| p.email == email))
    }

    async fn save(&self, mut patient: Patient) -> Result<Patient, StoreError> {
        let mut tables = self.tables();

        if let Some(column) = tables
            .patients
            .iter()
            .find_map(|existing| duplicate(existing, &patient))
        {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint on patients.{}",
                column
            )));
        }

        match patient.id {
            Some(id) => {
                let slot = tables
                    .patients
                    .iter_mut()
                    .find(|p| p.id == Some(id))
                    .ok_or_else(|| StoreError::Backend(format!("no patient row with id {}", id)))?;
                *slot = patient.clone();
            }
            None => {
                tables.next_patient_id += 1;
                patient.id = Some(tables.next_patient_id);
                tables.patients.push(patient.clone());
            }
        }

        Ok(patient)
    }
}

#[async_trait]
impl GenderStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Gender>, StoreError> {
        Ok(self.tables().genders.iter().find(|g| g.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Gender>, StoreError> {
        Ok(self.tables().genders.clone())
    }

    async fn save(&self, gender: NewGender) -> Result<Gender, StoreError> {
        let mut tables = self.tables();
        let gender = Gender {
            id: tables.genders.len() as i64 + 1,
            name: gender.name,
            code: gender.code,
        };
        tables.genders.push(gender.clone());
        Ok(gender)
    }
}

#[async_trait]
impl BloodTypeStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<BloodType>, StoreError> {
        Ok(self.tables().blood_types.iter().find(|b| b.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<BloodType>, StoreError> {
        Ok(self.tables().blood_types.clone())
    }

    async fn save(&self, blood_type: NewBloodType) -> Result<BloodType, StoreError> {
        let mut tables = self.tables();
        let blood_type = BloodType {
            id: tables.blood_types.len() as i64 + 1,
            name: blood_type.name,
        };
        tables.blood_types.push(blood_type.clone());
        Ok(blood_type)
    }
}
