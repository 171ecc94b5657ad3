use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment, File, FileFormat};
use dust::providers::{
    configs::{DustProviderConfig, DEFAULT_DUST_HOST},
    sse::StreamMode,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub workspace_id: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub stream_mode: StreamMode,
}

impl Settings {
    /// Defaults, then the optional TOML file, then `DUST_*` environment variables
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().set_default("host", default_host())?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("DUST")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Deserialization reports "missing field `api_key`"
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn into_config(self) -> DustProviderConfig {
        let mut config = DustProviderConfig::new(self.workspace_id, self.api_key)
            .with_host(self.host)
            .with_stream_mode(self.stream_mode);
        if let Some(assistant_id) = self.assistant_id {
            config = config.with_assistant_id(assistant_id);
        }
        if let Some(model) = self.model {
            config = config.with_model(model);
        }
        config
    }
}

fn default_host() -> String {
    DEFAULT_DUST_HOST.to_string()
}
