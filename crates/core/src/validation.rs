//! Field-level checks shared by the create and update paths

use chrono::NaiveDate;

use crate::error::{ClinicalError, ClinicalResult};
use crate::model::{
    BLOOD_TYPE_NAME_MAX, BloodTypeDraft, EMAIL_MAX, GENDER_NAME_MAX, GenderDraft, NATIONAL_ID_MAX,
    NewBloodType, NewGender, PATIENT_NAME_MAX, Patient, PatientDraft, Reference,
};

/// Fields a new patient must carry, already trimmed and bounded
#[derive(Debug)]
pub(crate) struct NewPatientFields {
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub gender_id: i64,
    pub blood_type_id: i64,
}

/// Reject null or non-positive identifiers
pub fn check_id(id: i64, entity: &str) -> ClinicalResult<()> {
    if id <= 0 {
        return Err(ClinicalError::InvalidArgument(format!(
            "invalid {} id: {}",
            entity, id
        )));
    }
    Ok(())
}

/// Trimmed, non-blank text of at most `max` characters
pub(crate) fn required_text(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> ClinicalResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ClinicalError::Validation(format!("{} is required", field)));
    }
    bounded(value, field, max)?;
    Ok(value.to_string())
}

fn bounded(value: &str, field: &str, max: usize) -> ClinicalResult<()> {
    if value.chars().count() > max {
        return Err(ClinicalError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Id carried by a supplied reference
pub(crate) fn reference_id(reference: Option<&Reference>, field: &str) -> ClinicalResult<i64> {
    reference
        .and_then(|r| r.id)
        .ok_or_else(|| ClinicalError::Validation(format!("{} id is required", field)))
}

pub(crate) fn new_patient_fields(draft: &PatientDraft) -> ClinicalResult<NewPatientFields> {
    let name = required_text(draft.name.as_deref(), "name", PATIENT_NAME_MAX)?;
    let national_id = required_text(draft.national_id.as_deref(), "national id", NATIONAL_ID_MAX)?;
    let email = required_text(draft.email.as_deref(), "email", EMAIL_MAX)?;
    let birth_date = draft
        .birth_date
        .ok_or_else(|| ClinicalError::Validation("birth date is required".to_string()))?;
    let gender_id = reference_id(draft.gender.as_ref(), "gender")?;
    let blood_type_id = reference_id(draft.blood_type.as_ref(), "blood type")?;

    Ok(NewPatientFields {
        name,
        national_id,
        email,
        birth_date,
        gender_id,
        blood_type_id,
    })
}

/// Re-check a merged record before it is written back
pub(crate) fn check_patient(patient: &Patient) -> ClinicalResult<()> {
    required_text(Some(patient.name.as_str()), "name", PATIENT_NAME_MAX)?;
    required_text(Some(patient.national_id.as_str()), "national id", NATIONAL_ID_MAX)?;
    required_text(Some(patient.email.as_str()), "email", EMAIL_MAX)?;
    Ok(())
}

pub fn new_gender(draft: &GenderDraft) -> ClinicalResult<NewGender> {
    let name = required_text(draft.name.as_deref(), "gender name", GENDER_NAME_MAX)?;
    let code = required_text(draft.code.as_deref(), "gender code", 1)?;
    Ok(NewGender { name, code })
}

pub fn new_blood_type(draft: &BloodTypeDraft) -> ClinicalResult<NewBloodType> {
    let name = required_text(draft.name.as_deref(), "blood type name", BLOOD_TYPE_NAME_MAX)?;
    Ok(NewBloodType { name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PatientDraft {
        PatientDraft {
            id: None,
            name: Some("  Ana Rojas ".to_string()),
            national_id: Some("11111111-1".to_string()),
            email: Some("ana@example.com".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1980, 1, 31),
            gender: Some(Reference::to(1)),
            blood_type: Some(Reference::to(1)),
        }
    }

    fn validation_message(result: ClinicalResult<NewPatientFields>) -> String {
        match result {
            Err(ClinicalError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn trims_required_text() {
        let fields = new_patient_fields(&draft()).unwrap();
        assert_eq!(fields.name, "Ana Rojas");
        assert_eq!(fields.gender_id, 1);
    }

    #[test]
    fn names_the_missing_field() {
        let mut d = draft();
        d.name = Some("   ".to_string());
        assert!(validation_message(new_patient_fields(&d)).contains("name"));

        let mut d = draft();
        d.national_id = None;
        assert!(validation_message(new_patient_fields(&d)).contains("national id"));

        let mut d = draft();
        d.email = Some(String::new());
        assert!(validation_message(new_patient_fields(&d)).contains("email"));

        let mut d = draft();
        d.birth_date = None;
        assert!(validation_message(new_patient_fields(&d)).contains("birth date"));

        let mut d = draft();
        d.blood_type = Some(Reference { id: None });
        assert!(validation_message(new_patient_fields(&d)).contains("blood type"));
    }

    #[test]
    fn rejects_overlong_fields() {
        let mut d = draft();
        d.national_id = Some("1234567890123".to_string());
        assert!(validation_message(new_patient_fields(&d)).contains("at most 12"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut d = draft();
        d.name = Some("Ñ".repeat(PATIENT_NAME_MAX));
        assert!(new_patient_fields(&d).is_ok());
    }

    #[test]
    fn gender_code_is_one_character() {
        let ok = new_gender(&GenderDraft {
            name: Some("Femenino".to_string()),
            code: Some("F".to_string()),
        })
        .unwrap();
        assert_eq!(ok.code, "F");

        let err = new_gender(&GenderDraft {
            name: Some("Femenino".to_string()),
            code: Some("FE".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, ClinicalError::Validation(_)));

        let err = new_gender(&GenderDraft {
            name: None,
            code: Some("F".to_string()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("gender name"));
    }

    #[test]
    fn blood_type_name_is_bounded() {
        assert!(new_blood_type(&BloodTypeDraft {
            name: Some("AB+".to_string())
        })
        .is_ok());
        assert!(new_blood_type(&BloodTypeDraft {
            name: Some("AB+ROH".to_string())
        })
        .is_err());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(check_id(1, "patient").is_ok());
        assert!(matches!(
            check_id(0, "patient"),
            Err(ClinicalError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_id(-4, "patient"),
            Err(ClinicalError::InvalidArgument(_))
        ));
    }
}
