use std::collections::BTreeMap;

use rocket::FromForm;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, MissingParam};

pub const TITULO: MissingParam = MissingParam {
    name: "Titulo",
    help: "Titulo o nombre de la pelicula",
};

pub const SINOPSIS: MissingParam = MissingParam {
    name: "Sinopsis",
    help: "Sinopsis de la pelicula",
};

/// Query string of `GET /genero_pelicula`.
///
/// Repeated parameters are collected; the first occurrence wins.
#[derive(Debug, FromForm)]
pub struct GenreQuery<'r> {
    #[field(name = "Titulo")]
    pub titulo: Vec<&'r str>,
    #[field(name = "Sinopsis")]
    pub sinopsis: Vec<&'r str>,
}

impl<'r> GenreQuery<'r> {
    /// Both fields must be present and non-empty; every missing one is reported.
    pub fn require(&self) -> Result<(&'r str, &'r str), ApiError> {
        match (first_non_empty(&self.titulo), first_non_empty(&self.sinopsis)) {
            (Some(title), Some(synopsis)) => Ok((title, synopsis)),
            (title, synopsis) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push(TITULO);
                }
                if synopsis.is_none() {
                    missing.push(SINOPSIS);
                }
                Err(ApiError::MissingParameters(missing))
            }
        }
    }
}

fn first_non_empty<'r>(values: &[&'r str]) -> Option<&'r str> {
    values.first().copied().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub result: Vec<String>,
    pub probabilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub labels: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: BTreeMap<String, String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
