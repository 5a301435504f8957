use std::sync::Arc;

use anyhow::anyhow;
use rocket::fairing::AdHoc;

use crate::config::ServiceConfig;
use crate::engine::{GenreClassifier, TfidfEngine};
use crate::genres::Prediction;

/// Process-wide state, built once at ignition and shared read-only by every request.
pub struct AppState {
    pub classifier: Arc<dyn GenreClassifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn GenreClassifier>) -> Arc<Self> {
        Arc::new(Self { classifier })
    }

    /// Attach-time loader: reads `model_dir` from the figment and aborts
    /// ignition if the artifact can't be loaded.
    pub fn fairing() -> AdHoc {
        AdHoc::try_on_ignite("Genre Model", |rocket| async move {
            let extracted = rocket.figment().extract::<ServiceConfig>();
            let config = match extracted {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(error = %e, "invalid service configuration");
                    return Err(rocket);
                }
            };

            tracing::info!(path = %config.model_dir.display(), "loading genre model");
            match TfidfEngine::load(&config.model_dir) {
                Ok(engine) => Ok(rocket.manage(AppState::new(engine))),
                Err(e) => {
                    tracing::error!(path = %config.model_dir.display(), error = %e, "failed to load genre model");
                    Err(rocket)
                }
            }
        })
    }

    pub async fn predict(&self, title: &str, synopsis: &str) -> anyhow::Result<Prediction> {
        let text = compose_input(title, synopsis);
        let batch = self.classifier.predict_proba(&[text]).await?;
        let probabilities = batch
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("classifier returned an empty batch"))?;

        Prediction::from_probabilities(&probabilities)
    }
}

/// Model input format: title, one space, synopsis.
pub fn compose_input(title: &str, synopsis: &str) -> String {
    format!("{title} {synopsis}")
}
