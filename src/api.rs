use std::sync::Arc;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, get, options, Request, State};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::docs::ApiDoc;
use crate::error::ApiError;
use crate::genres::GENRES;
use crate::types::{
    GenreQuery, HealthResponse, MessageResponse, PredictionResponse, ValidationErrorResponse,
};

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up and the model is loaded", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health(state: &State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.classifier.name().to_string(),
        labels: GENRES.len(),
    })
}

#[utoipa::path(
    get,
    path = "/genero_pelicula",
    tag = "prediccion",
    params(
        ("Titulo" = String, Query, description = "Titulo o nombre de la pelicula"),
        ("Sinopsis" = String, Query, description = "Sinopsis de la pelicula")
    ),
    responses(
        (status = 200, description = "Success", body = PredictionResponse),
        (status = 400, description = "Input payload validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Inference failed", body = MessageResponse)
    )
)]
#[get("/genero_pelicula?<query..>")]
pub async fn genero_pelicula(
    state: &State<Arc<AppState>>,
    query: GenreQuery<'_>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let (title, synopsis) = query.require()?;
    tracing::debug!(title, synopsis_len = synopsis.len(), "predicting genres");

    let prediction = state.predict(title, synopsis).await?;

    Ok(Json(PredictionResponse {
        result: prediction.filtered_labels(),
        probabilities: prediction.formatted_probabilities(),
    }))
}

#[get("/swagger.json")]
pub async fn swagger() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// CORS preflight; the headers themselves come from the `Cors` fairing.
#[options("/<_..>")]
pub async fn preflight() -> Status {
    Status::NoContent
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!(
            "The requested URL `{}` was not found on the server.",
            req.uri().path()
        ),
    })
}

#[catch(500)]
pub fn internal_error() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Internal Server Error".to_string(),
    })
}
