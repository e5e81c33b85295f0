// Configuration module entry point
// Layered configuration: defaults, config.toml, the env file, then RECORDS_* variables

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, DatabaseBackend, DatabaseConfig};

/// Env file keys and the configuration paths they feed
const ENV_FILE_KEYS: [(&str, &str); 3] = [
    ("database_url", "database.url"),
    ("database_backend", "database.backend"),
    ("database_seed_file", "database.seed_file"),
];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let layered = with_defaults(config::Config::builder())?
            .add_source(File::with_name(config_path).required(false));

        // The env file location may itself come from config.toml or the environment
        let env_file = layered
            .clone()
            .add_source(environment())
            .build()?
            .get_string("server.env_file")?;

        let settings = layered
            .add_source(env_file_layer(&env_file)?)
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Configuration built from defaults only
    #[cfg(test)]
    pub fn defaults() -> Self {
        with_defaults(config::Config::builder())
            .and_then(ConfigBuilder::<DefaultState>::build)
            .and_then(config::Config::try_deserialize)
            .expect("default configuration deserializes")
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("server.env_file", ".env")?
        .set_default("database.backend", "postgres")?
        .set_default("database.max_connections", 5)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 15)?
        .set_default("performance.write_timeout", 15)?
        .set_default("http.server_name", "records-api/0.1")?
        .set_default("http.enable_cors", false)?
        .set_default("http.max_body_size", 10_485_760)? // 10MB
        .set_default("http.strict_methods", false)
}

/// `RECORDS_SERVER__PORT=9000` style overrides
fn environment() -> Environment {
    Environment::with_prefix("RECORDS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Read a flat `KEY=value` env file and map its keys onto `database.*`
///
/// A missing file yields an empty layer.
fn env_file_layer(path: &str) -> Result<config::Config, ConfigError> {
    let vars = config::Config::builder()
        .add_source(File::new(path, FileFormat::Ini).required(false))
        .build()?;

    let mut layer = config::Config::builder();
    for (key, target) in ENV_FILE_KEYS {
        let value = vars
            .get_string(key)
            .or_else(|_| vars.get_string(&key.to_uppercase()))
            .ok();
        layer = layer.set_override_option(target, value)?;
    }
    layer.build()
}
