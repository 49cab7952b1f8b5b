use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// File stem looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_STEM: &str = "initium";
/// Environment prefix; nesting uses `__` (`INITIUM__INITIALIZR__URL`).
pub const ENV_PREFIX: &str = "INITIUM";

#[initium_derive::initium_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `INITIUM__*` environment variables.
///
/// An explicit `path` must exist (any extension the `config` crate knows:
/// TOML, YAML, JSON). Without one, `./initium.{toml,yaml,json}` is used when
/// present and defaults plus environment apply otherwise.
///
/// # Example
/// ```rust
/// use initium_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match &path {
        Some(path) => {
            info!(path = %path.as_ref().display(), "Loading config");
            File::from(path.as_ref()).required(true)
        },
        None => File::with_name(DEFAULT_CONFIG_STEM).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
