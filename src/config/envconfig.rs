use std::path::{Path, PathBuf};

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Layered loader: an optional TOML file named by `CAR_NOTES_CONFIG`, then
/// `APP_*` environment variables on top of it.
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    const FILE_VAR: &'static str = "CAR_NOTES_CONFIG";

    fn load_dotenv() {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn config_file() -> Option<PathBuf> {
        std::env::var_os(Self::FILE_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();

        let mut builder = config_rs::Config::builder();
        if let Some(path) = Self::config_file() {
            builder = builder.add_source(
                config_rs::File::from(path.clone())
                    .format(config_rs::FileFormat::Toml)
                    .required(true),
            );
            tracing::debug!(path = %path.display(), "loading config file");
        }

        let settings = builder
            .add_source(
                config_rs::Environment::with_prefix(Self::PREFIX)
                    .prefix_separator("_")
                    .separator(Self::SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration sources")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
