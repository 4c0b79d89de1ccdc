use std::path::Path;

use config::{Config, Environment, File};
use eyre::Context;

use crate::settings::Settings;

/// Load settings from an optional config file, overlaid with environment
/// variables prefixed `WATCHTOWER` (nested keys separated by `__`, e.g.
/// `WATCHTOWER_RESPONDER__MAX_QUEUE_DEPTH`).
pub fn load_settings(path: Option<&Path>) -> eyre::Result<Settings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }
    let config = builder
        .add_source(Environment::with_prefix("WATCHTOWER").separator("__"))
        .build()
        .context("Building configuration")?;
    config
        .try_deserialize()
        .context("Deserializing configuration")
}
