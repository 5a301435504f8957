use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::{Figment, Profile};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL_DIR: &str = "modelo_prediccion_genero_pelicula";
pub const DEFAULT_PORT: u16 = 5000;

/// Service settings read from the same figment as Rocket's own config.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_DIR)
}

#[derive(Debug, Serialize)]
struct ServiceDefaults {
    address: IpAddr,
    port: u16,
    model_dir: PathBuf,
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            model_dir: default_model_dir(),
        }
    }
}

/// Rocket's default figment with this service's defaults slotted in under
/// `Rocket.toml` and `ROCKET_*` env vars, so both can still override them.
pub fn figment() -> Figment {
    Figment::from(rocket::Config::default())
        .merge(Serialized::defaults(ServiceDefaults::default()))
        .merge(Toml::file(Env::var_or("ROCKET_CONFIG", "Rocket.toml")).nested())
        .merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
        .select(Profile::from_env_or(
            "ROCKET_PROFILE",
            rocket::Config::DEFAULT_PROFILE,
        ))
}
