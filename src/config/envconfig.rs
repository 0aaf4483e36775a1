use std::path::Path;

use ::config as config_src;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

/// Environment-backed configuration: `APP_GENERAL__PORT=8080` maps to
/// `general.port`. A `.env` next to the manifest is loaded first, the
/// working directory is the fallback.
pub trait EnvConfig: Sized + DeserializeOwned {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        load_dotenv();
        let cfg: Self = read_environment()?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn load_dotenv() {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
}

fn read_environment<T: DeserializeOwned>() -> Result<T> {
    let source = config_src::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true);

    config_src::Config::builder()
        .add_source(source)
        .build()
        .context("cannot read configuration from the environment")?
        .try_deserialize()
        .context("environment variables do not match the configuration shape")
}
