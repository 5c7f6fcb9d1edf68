//! Collaborator interfaces: record stores and the report renderer

use async_trait::async_trait;

use crate::error::{RenderError, StoreError};
use crate::model::{BloodType, Gender, NewBloodType, NewGender, Patient};

/// Durable storage for patients
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Look up a patient by id regardless of its active flag
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError>;

    /// Look up a patient by id, only if it is active
    async fn find_active_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError>;

    /// All active patients, ordered by id
    async fn find_all_active(&self) -> Result<Vec<Patient>, StoreError>;

    async fn exists_by_number(&self, number: &str) -> Result<bool, StoreError>;

    async fn exists_by_national_id(&self, national_id: &str) -> Result<bool, StoreError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Insert (`id == None`) or overwrite (`id == Some`) a patient.
    ///
    /// Fails with [`StoreError::Conflict`] when a unique constraint rejects
    /// the write.
    async fn save(&self, patient: Patient) -> Result<Patient, StoreError>;

    /// Cheap liveness probe used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait GenderStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Gender>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Gender>, StoreError>;
    async fn save(&self, gender: NewGender) -> Result<Gender, StoreError>;
}

#[async_trait]
pub trait BloodTypeStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<BloodType>, StoreError>;
    async fn find_all(&self) -> Result<Vec<BloodType>, StoreError>;
    async fn save(&self, blood_type: NewBloodType) -> Result<BloodType, StoreError>;
}

/// Renders the technical sheet of one patient as PDF bytes
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, patient_id: i64) -> Result<Vec<u8>, RenderError>;
}
