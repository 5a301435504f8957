use std::collections::BTreeMap;
use std::path::PathBuf;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;

use crate::types::{MessageResponse, ValidationErrorResponse};

/// Failures while loading the model artifact. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model directory `{}` does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("failed to load tokenizer `{}`: {message}", path.display())]
    Tokenizer { path: PathBuf, message: String },

    #[error("failed to load weights `{}`: {source}", path.display())]
    Weights {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },

    #[error("tensor `{name}` is missing from the weights file")]
    MissingTensor { name: &'static str },

    #[error("tensor `{name}` has shape {actual:?}, expected {expected:?}")]
    Shape {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// A required query parameter and the help text shown when it is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingParam {
    pub name: &'static str,
    pub help: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Input payload validation failed")]
    MissingParameters(Vec<MissingParam>),

    #[error("inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            ApiError::MissingParameters(params) => {
                let errors: BTreeMap<String, String> = params
                    .iter()
                    .map(|p| {
                        (
                            p.name.to_string(),
                            format!("{} Missing required parameter in the query string", p.help),
                        )
                    })
                    .collect();

                let body = ValidationErrorResponse {
                    errors,
                    message: "Input payload validation failed".to_string(),
                };
                (Status::BadRequest, Json(body)).respond_to(req)
            }
            ApiError::Inference(err) => {
                tracing::error!(error = %format!("{err:#}"), uri = %req.uri(), "genre inference failed");
                let body = MessageResponse {
                    message: "Internal Server Error".to_string(),
                };
                (Status::InternalServerError, Json(body)).respond_to(req)
            }
        }
    }
}
