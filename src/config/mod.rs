mod settings;

use std::path::Path;

use config::{Config, Environment, File};

use crate::utils::error::Result;

use settings::PartialSettings;

pub use settings::{LogSettings, ServerSettings, Settings, SocketSettings};

/// Environment variables are read as `SUBFAN_<SECTION>__<KEY>`,
/// e.g. `SUBFAN_SOCKET__SEND_CAPACITY=64`.
pub const ENV_PREFIX: &str = "SUBFAN";

/// Loads the configuration from `config/default` (any format the `config`
/// crate understands, optional) and the environment, merged over defaults.
pub fn load_config() -> Result<Settings> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit base path for the file source.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_with_defaults())
}
