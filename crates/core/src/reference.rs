//! Gender and blood type lookup tables

use crate::error::{ClinicalError, ClinicalResult};
use crate::model::{BloodType, BloodTypeDraft, Gender, GenderDraft};
use crate::store::{BloodTypeStore, GenderStore};
use crate::validation::{check_id, new_blood_type, new_gender};

pub async fn list_genders(genders: &dyn GenderStore) -> ClinicalResult<Vec<Gender>> {
    Ok(genders.find_all().await?)
}

pub async fn get_gender(genders: &dyn GenderStore, id: i64) -> ClinicalResult<Gender> {
    check_id(id, "gender")?;
    genders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("gender {} does not exist", id)))
}

pub async fn create_gender(
    genders: &dyn GenderStore,
    draft: GenderDraft,
) -> ClinicalResult<Gender> {
    let gender = genders.save(new_gender(&draft)?).await?;
    tracing::info!(gender_id = gender.id, code = %gender.code, "Gender registered");
    Ok(gender)
}

pub async fn list_blood_types(blood_types: &dyn BloodTypeStore) -> ClinicalResult<Vec<BloodType>> {
    Ok(blood_types.find_all().await?)
}

pub async fn get_blood_type(
    blood_types: &dyn BloodTypeStore,
    id: i64,
) -> ClinicalResult<BloodType> {
    check_id(id, "blood type")?;
    blood_types
        .find_by_id(id)
        .await?
        .ok_or_else(|| ClinicalError::NotFound(format!("blood type {} does not exist", id)))
}

pub async fn create_blood_type(
    blood_types: &dyn BloodTypeStore,
    draft: BloodTypeDraft,
) -> ClinicalResult<BloodType> {
    let blood_type = blood_types.save(new_blood_type(&draft)?).await?;
    tracing::info!(blood_type_id = blood_type.id, "Blood type registered");
    Ok(blood_type)
}
