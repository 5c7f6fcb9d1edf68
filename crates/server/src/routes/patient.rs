//! Patient HTTP handlers

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::NaiveDate;
use ficha_core::{BloodType, Gender, Patient, PatientDraft, patient};
use serde::Serialize;

use super::{json_body, path_id};
use crate::AppState;
use crate::error::AppError;

/// Patient as returned to clients, with the age derived at response time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Option<i64>,
    pub number: String,
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub age: u32,
    pub active: bool,
    pub gender: Gender,
    pub blood_type: BloodType,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            age: patient.age(),
            id: patient.id,
            number: patient.number,
            name: patient.name,
            national_id: patient.national_id,
            email: patient.email,
            birth_date: patient.birth_date,
            active: patient.active,
            gender: patient.gender,
            blood_type: patient.blood_type,
        }
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("patient {} does not exist", id))
}

/// `technical_sheet_<name>_<id>.pdf`. Whitespace in the name becomes an
/// underscore; quotes and control characters are dropped so the result is
/// always a valid header value.
fn report_filename(patient: &Patient, id: i64) -> String {
    let name: String = patient
        .name
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '\t' | '\n' | '\r' => Some('_'),
            '"' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    format!("technical_sheet_{}_{}.pdf", name, id)
}

/// GET /api/v1/patients - List active patients
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let patients = patient::list_patients(state.patients.as_ref()).await?;
    let body: Vec<PatientResponse> = patients.into_iter().map(PatientResponse::from).collect();
    Ok(Json(body))
}

/// POST /api/v1/patients - Register a patient
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<PatientDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let draft = json_body(payload)?;

    let created = patient::create_patient(
        state.patients.as_ref(),
        state.genders.as_ref(),
        state.blood_types.as_ref(),
        state.numbers.as_ref(),
        state.max_number_attempts,
        draft,
    )
    .await?;

    let location = created
        .id
        .map(|id| format!("/api/v1/patients/{}", id))
        .unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PatientResponse::from(created)),
    ))
}

/// GET /api/v1/patients/{id} - Read an active patient
pub async fn read(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;

    match patient::get_patient(state.patients.as_ref(), id).await? {
        Some(found) => Ok(Json(PatientResponse::from(found))),
        None => Err(not_found(id)),
    }
}

/// PUT /api/v1/patients/{id} - Partially update a patient
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PatientDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    let draft = json_body(payload)?;

    let updated = patient::update_patient(
        state.patients.as_ref(),
        state.genders.as_ref(),
        state.blood_types.as_ref(),
        id,
        draft,
    )
    .await?;

    Ok(Json(PatientResponse::from(updated)))
}

/// DELETE /api/v1/patients/{id} - Deactivate a patient
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    patient::delete_patient(state.patients.as_ref(), id).await?;
    Ok(StatusCode::OK)
}

/// GET /api/v1/patients/{id}/report - Download the technical sheet PDF
pub async fn report(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;

    let found = patient::get_patient(state.patients.as_ref(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let renderer = state
        .renderer
        .as_ref()
        .ok_or_else(|| AppError::Internal("report renderer not configured".to_string()))?;

    let pdf = patient::generate_report(renderer.as_ref(), id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report_filename(&found, id)),
            ),
        ],
        pdf,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(name: &str, birth_date: NaiveDate) -> Patient {
        Patient {
            id: Some(7),
            number: "abc".to_string(),
            name: name.to_string(),
            national_id: "0912345678".to_string(),
            email: "ana@example.com".to_string(),
            birth_date,
            active: true,
            gender: Gender {
                id: 2,
                name: "Femenino".to_string(),
                code: "F".to_string(),
            },
            blood_type: BloodType {
                id: 1,
                name: "A+".to_string(),
            },
        }
    }

    #[test]
    fn filename_replaces_spaces() {
        let p = patient("Ana María Pérez", NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert_eq!(
            report_filename(&p, 7),
            "technical_sheet_Ana_María_Pérez_7.pdf"
        );
    }

    #[test]
    fn filename_drops_control_characters() {
        let p = patient("Ana\nPerez\u{7}\"x\"", NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        let filename = report_filename(&p, 3);

        assert_eq!(filename, "technical_sheet_Ana_Perezx_3.pdf");
        assert!(axum::http::HeaderValue::from_str(&filename).is_ok());
    }

    #[test]
    fn response_is_camel_case_with_age() {
        let birth = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let p = patient("Ana", birth);
        let expected_age = p.age();

        let json = serde_json::to_value(PatientResponse::from(p)).unwrap();

        assert_eq!(json["nationalId"], "0912345678");
        assert_eq!(json["birthDate"], "2000-01-01");
        assert_eq!(json["age"], expected_age);
        assert_eq!(json["bloodType"]["name"], "A+");
        assert_eq!(json["gender"]["code"], "F");
    }
}
