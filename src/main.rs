#[macro_use]
extern crate rocket;

mod api;
mod app_state;
mod config;
mod cors;
mod docs;
mod engine;
mod error;
mod genres;
mod types;

use rocket::figment::Figment;
use rocket::{Build, Rocket};
use tracing_subscriber::EnvFilter;

use api::{genero_pelicula, health, internal_error, not_found, preflight, swagger};
use app_state::AppState;
use cors::Cors;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let rocket = build_rocket(config::figment()).attach(AppState::fairing());
    if let Err(e) = rocket.launch().await {
        let kind = format!("{:?}", e.kind());
        tracing::error!(error = %kind, "server failed to start");
        anyhow::bail!("server failed to start: {kind}");
    }

    Ok(())
}

/// Routes, catchers and CORS; the model state is attached separately.
pub(crate) fn build_rocket(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .mount(
            "/",
            routes![
                health,
                genero_pelicula,
                swagger,
                preflight,
            ],
        )
        .register("/", catchers![not_found, internal_error])
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("movie_genre_server=info,rocket=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
