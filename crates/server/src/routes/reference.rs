//! Gender and blood type HTTP handlers

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use ficha_core::{BloodTypeDraft, GenderDraft, reference};

use super::{json_body, path_id};
use crate::AppState;
use crate::error::AppError;

/// GET /api/v1/genders
pub async fn list_genders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(reference::list_genders(state.genders.as_ref()).await?))
}

/// GET /api/v1/genders/{id}
pub async fn read_gender(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    Ok(Json(reference::get_gender(state.genders.as_ref(), id).await?))
}

/// POST /api/v1/genders
pub async fn create_gender(
    State(state): State<AppState>,
    payload: Result<Json<GenderDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let draft = json_body(payload)?;
    let gender = reference::create_gender(state.genders.as_ref(), draft).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/genders/{}", gender.id))],
        Json(gender),
    ))
}

/// GET /api/v1/blood-types
pub async fn list_blood_types(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        reference::list_blood_types(state.blood_types.as_ref()).await?,
    ))
}

/// GET /api/v1/blood-types/{id}
pub async fn read_blood_type(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    Ok(Json(
        reference::get_blood_type(state.blood_types.as_ref(), id).await?,
    ))
}

/// POST /api/v1/blood-types
pub async fn create_blood_type(
    State(state): State<AppState>,
    payload: Result<Json<BloodTypeDraft>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let draft = json_body(payload)?;
    let blood_type = reference::create_blood_type(state.blood_types.as_ref(), draft).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/blood-types/{}", blood_type.id))],
        Json(blood_type),
    ))
}
