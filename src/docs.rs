//! OpenAPI document served at `/swagger.json`, derived from the route annotations.

use utoipa::OpenApi;

use crate::types::{HealthResponse, MessageResponse, PredictionResponse, ValidationErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Predicción de Géneros Cinematográficos",
        version = "1.0",
        description = "El objetivo es predecir la probabilidad de que una película pertenezca a uno o varios de los siguientes géneros: Acción, Aventura, Animación, Biografía, Comedia, Crimen, Documental, Drama, Familia, Fantasía, Film-Noir, Historia, Terror, Música, Musical, Misterio, Noticias, Romance, Ciencia Ficción, Cortometraje, Deporte, Suspenso, Guerra o Western"
    ),
    paths(crate::api::genero_pelicula, crate::api::health),
    components(schemas(
        PredictionResponse,
        ValidationErrorResponse,
        MessageResponse,
        HealthResponse
    )),
    tags(
        (name = "prediccion", description = "Predicción de géneros a partir de título y sinopsis"),
        (name = "health", description = "Service health checks")
    )
)]
pub struct ApiDoc;
