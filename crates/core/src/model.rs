//! Patient, Gender and BloodType records

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maximum lengths of the stored text columns
pub const PATIENT_NAME_MAX: usize = 35;
pub const NATIONAL_ID_MAX: usize = 12;
pub const EMAIL_MAX: usize = 100;
pub const GENDER_NAME_MAX: usize = 20;
pub const BLOOD_TYPE_NAME_MAX: usize = 5;

/// Gender lookup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gender {
    pub id: i64,
    pub name: String,
    /// Single-character code, e.g. `F`
    pub code: String,
}

/// Blood type lookup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodType {
    pub id: i64,
    pub name: String,
}

/// A stored (or about to be stored) patient record.
///
/// `id` is `None` until the store assigns one. Age is not a field: it is
/// derived from `birth_date` every time it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: Option<i64>,
    pub number: String,
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub active: bool,
    pub gender: Gender,
    pub blood_type: BloodType,
}

impl Patient {
    /// Age in whole years as of today (local calendar)
    pub fn age(&self) -> u32 {
        age_on(self.birth_date, Local::now().date_naive())
    }

    /// Age in whole years as of `today`
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_on(self.birth_date, today)
    }
}

/// Whole years elapsed between `birth_date` and `today`.
///
/// A birth date in the future yields 0.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birth_date).unwrap_or(0)
}

/// Caller-supplied reference to a lookup entry; only the id is used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: Option<i64>,
}

impl Reference {
    pub fn to(id: i64) -> Self {
        Self { id: Some(id) }
    }
}

/// Patient payload as submitted on create or update.
///
/// Every field is optional: create requires most of them, update applies
/// only the ones present. Number, active flag and age are never accepted
/// from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Reference>,
    #[serde(default)]
    pub blood_type: Option<Reference>,
}

/// Gender payload as submitted on create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Blood type payload as submitted on create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodTypeDraft {
    #[serde(default)]
    pub name: Option<String>,
}

/// Validated gender ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGender {
    pub name: String,
    pub code: String,
}

/// Validated blood type ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBloodType {
    pub name: String,
}
