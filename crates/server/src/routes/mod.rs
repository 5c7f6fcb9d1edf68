pub mod health;
pub mod metrics;
mod patient;
mod reference;

use axum::{
    Json, Router,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
    routing::get,
};

use crate::AppState;
use crate::error::AppError;

/// Build the `/api/v1` routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(patient::list).post(patient::create))
        .route(
            "/patients/{id}",
            get(patient::read)
                .put(patient::update)
                .delete(patient::delete),
        )
        .route("/patients/{id}/report", get(patient::report))
        .route(
            "/genders",
            get(reference::list_genders).post(reference::create_gender),
        )
        .route("/genders/{id}", get(reference::read_gender))
        .route(
            "/blood-types",
            get(reference::list_blood_types).post(reference::create_blood_type),
        )
        .route("/blood-types/{id}", get(reference::read_blood_type))
}

/// Unwrap a JSON body, turning a malformed payload into a 400
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap a numeric `{id}` path segment, turning anything else into a 400
fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
