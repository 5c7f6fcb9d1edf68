//! ficha-core: patient records, lookup tables and their use cases
//!
//! This crate holds the domain model, the validation and patient-number
//! rules, and the collaborator traits (record stores, report renderer) the
//! server implements. It has no knowledge of HTTP or SQL.

pub mod error;
pub mod model;
pub mod number;
pub mod patient;
pub mod reference;
pub mod store;
pub mod validation;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use error::{ClinicalError, ClinicalResult, RenderError, StoreError};
pub use model::{
    BloodType, BloodTypeDraft, Gender, GenderDraft, NewBloodType, NewGender, Patient, PatientDraft,
    Reference,
};
pub use number::{NumberSource, RandomNumberSource};
pub use store::{BloodTypeStore, GenderStore, PatientStore, ReportRenderer};
