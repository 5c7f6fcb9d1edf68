//! Patient use cases: create, update, list, get, soft-delete, report
//!
//! Each use case is a plain async function taking its collaborators
//! explicitly. Errors keep their kind ([`ClinicalError`]) and only gain a
//! context prefix, so callers can map them to transport statuses directly.

use crate::error::{ClinicalError, ClinicalResult};
use crate::model::{BloodType, Gender, Patient, PatientDraft};
use crate::number::{NumberSource, generate_unique_number};
use crate::store::{BloodTypeStore, GenderStore, PatientStore, ReportRenderer};
use crate::validation::{check_id, check_patient, new_patient_fields, reference_id};

/// Register a new patient.
///
/// Validates required fields, resolves gender and blood type by id, rejects
/// a national id or email already in use, assigns a fresh unique patient
/// number and persists the record as active.
///
/// A draft carrying a non-zero `id` re-submits an existing record: the
/// stored active flag and patient number are carried over instead of
/// being reset.
pub async fn create_patient(
    patients: &dyn PatientStore,
    genders: &dyn GenderStore,
    blood_types: &dyn BloodTypeStore,
    numbers: &dyn NumberSource,
    max_attempts: u32,
    draft: PatientDraft,
) -> ClinicalResult<Patient> {
    let result =
        assemble_new_patient(patients, genders, blood_types, numbers, max_attempts, draft).await;

    match result {
        Ok(patient) => {
            tracing::info!(
                patient_id = ?patient.id,
                number = %patient.number,
                "Patient registered"
            );
            Ok(patient)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Patient registration rejected");
            Err(e.context("could not register patient"))
        }
    }
}

/// Apply a partial update to an existing patient.
///
/// Only fields present in `draft` overwrite stored values. Patient number
/// and active flag are never touched.
pub async fn update_patient(
    patients: &dyn PatientStore,
    genders: &dyn GenderStore,
    blood_types: &dyn BloodTypeStore,
    id: i64,
    draft: PatientDraft,
) -> ClinicalResult<Patient> {
    check_id(id, "patient")?;

    let result = merge_patient_update(patients, genders, blood_types, id, draft).await;

    match result {
        Ok(patient) => {
            tracing::info!(patient_id = id, "Patient updated");
            Ok(patient)
        }
        Err(e) => {
            tracing::warn!(patient_id = id, error = %e, "Patient update rejected");
            Err(e.context("could not update patient"))
        }
    }
}

/// All active patients
pub async fn list_patients(patients: &dyn PatientStore) -> ClinicalResult<Vec<Patient>> {
    Ok(patients.find_all_active().await?)
}

/// Active patient by id, `None` if absent or soft-deleted
pub async fn get_patient(patients: &dyn PatientStore, id: i64) -> ClinicalResult<Option<Patient>> {
    check_id(id, "patient")?;
    Ok(patients.find_active_by_id(id).await?)
}

/// Soft-delete: mark the patient inactive, keeping the row
pub async fn delete_patient(patients: &dyn PatientStore, id: i64) -> ClinicalResult<()> {
    check_id(id, "patient")?;

    let mut patient = patients
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("patient {} does not exist", id)))?;
    patient.active = false;
    patients.save(patient).await?;

    tracing::info!(patient_id = id, "Patient deactivated");
    Ok(())
}

/// Render the technical sheet PDF for a patient.
///
/// Only the id is validated here; callers check the patient exists first.
pub async fn generate_report(renderer: &dyn ReportRenderer, id: i64) -> ClinicalResult<Vec<u8>> {
    check_id(id, "patient")?;
    let pdf = renderer.render(id).await?;
    tracing::info!(patient_id = id, bytes = pdf.len(), "Technical sheet rendered");
    Ok(pdf)
}

async fn assemble_new_patient(
    patients: &dyn PatientStore,
    genders: &dyn GenderStore,
    blood_types: &dyn BloodTypeStore,
    numbers: &dyn NumberSource,
    max_attempts: u32,
    draft: PatientDraft,
) -> ClinicalResult<Patient> {
    let fields = new_patient_fields(&draft)?;

    let existing = match draft.id.filter(|id| *id != 0) {
        Some(id) => Some(
            patients
                .find_by_id(id)
                .await?
                .ok_or_else(|| ClinicalError::NotFound(format!("patient {} does not exist", id)))?,
        ),
        None => None,
    };

    let gender = resolve_gender(genders, fields.gender_id).await?;
    let blood_type = resolve_blood_type(blood_types, fields.blood_type_id).await?;

    ensure_unique_identity(patients, existing.as_ref(), &fields.national_id, &fields.email)
        .await?;

    let (id, number, active) = match existing {
        Some(stored) => (stored.id, stored.number, stored.active),
        None => (
            None,
            generate_unique_number(patients, numbers, max_attempts).await?,
            true,
        ),
    };

    let patient = Patient {
        id,
        number,
        name: fields.name,
        national_id: fields.national_id,
        email: fields.email,
        birth_date: fields.birth_date,
        active,
        gender,
        blood_type,
    };

    Ok(patients.save(patient).await?)
}

async fn merge_patient_update(
    patients: &dyn PatientStore,
    genders: &dyn GenderStore,
    blood_types: &dyn BloodTypeStore,
    id: i64,
    draft: PatientDraft,
) -> ClinicalResult<Patient> {
    let previous = patients
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("patient {} does not exist", id)))?;
    let mut patient = previous.clone();

    if let Some(name) = draft.name {
        patient.name = name.trim().to_string();
    }
    if let Some(national_id) = draft.national_id {
        patient.national_id = national_id.trim().to_string();
    }
    if let Some(email) = draft.email {
        patient.email = email.trim().to_string();
    }
    if let Some(birth_date) = draft.birth_date {
        patient.birth_date = birth_date;
    }
    if let Some(gender) = draft.gender.as_ref() {
        let gender_id = reference_id(Some(gender), "gender")?;
        patient.gender = resolve_gender(genders, gender_id).await?;
    }
    if let Some(blood_type) = draft.blood_type.as_ref() {
        let blood_type_id = reference_id(Some(blood_type), "blood type")?;
        patient.blood_type = resolve_blood_type(blood_types, blood_type_id).await?;
    }

    check_patient(&patient)?;
    ensure_unique_identity(patients, Some(&previous), &patient.national_id, &patient.email)
        .await?;

    Ok(patients.save(patient).await?)
}

async fn resolve_gender(genders: &dyn GenderStore, id: i64) -> ClinicalResult<Gender> {
    genders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("gender {} does not exist", id)))
}

async fn resolve_blood_type(
    blood_types: &dyn BloodTypeStore,
    id: i64,
) -> ClinicalResult<BloodType> {
    blood_types
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("blood type {} does not exist", id)))
}

/// Reject a national id or email already used by another patient.
/// Values unchanged from `current` are not re-checked.
async fn ensure_unique_identity(
    patients: &dyn PatientStore,
    current: Option<&Patient>,
    national_id: &str,
    email: &str,
) -> ClinicalResult<()> {
    let national_id_changed = current.is_none_or(|p| p.national_id != national_id);
    if national_id_changed && patients.exists_by_national_id(national_id).await? {
        return Err(ClinicalError::Conflict(format!(
            "a patient with national id {} already exists",
            national_id
        )));
    }

    let email_changed = current.is_none_or(|p| p.email != email);
    if email_changed && patients.exists_by_email(email).await? {
        return Err(ClinicalError::Conflict(format!(
            "a patient with email {} already exists",
            email
        )));
    }

    Ok(())
}
