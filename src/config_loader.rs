use crate::config::AppConfig;
use crate::errors::PredictResult;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

/// Default configuration file, read when present.
pub const DEFAULT_CONFIG_FILE: &str = "obesity.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "OBESITY_CONFIG";

/// Layer defaults, the TOML file and `OBESITY_*` environment variables.
pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(config_file))
        .merge(Env::prefixed("OBESITY_").ignore(&["CONFIG"]))
}

/// Load and validate the configuration.
///
/// An explicit path wins over `OBESITY_CONFIG`, which wins over
/// `obesity.toml` in the working directory. A missing file is not an error.
pub fn load_config(config_file: Option<&Path>) -> PredictResult<AppConfig> {
    let path: PathBuf = match config_file {
        Some(path) => path.to_path_buf(),
        None => std::env::var(CONFIG_PATH_ENV)
            .map(Into::into)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into()),
    };

    let config: AppConfig = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}
