use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use knightrehber_models::settings::Settings;

/// Reads `appsettings.toml`, the optional `appsettings.local.toml` and
/// `APP__`-prefixed environment variables, later sources winning.
pub fn load() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("appsettings").required(true))
        .add_source(File::with_name("appsettings.local").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    builder.build()?.try_deserialize()
}
