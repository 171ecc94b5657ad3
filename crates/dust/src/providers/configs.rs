use super::catalog::{ModelCatalog, DEFAULT_AGENT_ID};
use super::sse::StreamMode;
use crate::errors::{ProviderError, ProviderResult};

pub const DEFAULT_DUST_HOST: &str = "https://dust.tt";

/// Credentials and routing for a Dust workspace
#[derive(Debug, Clone)]
pub struct DustProviderConfig {
    pub host: String,
    pub api_key: String,
    pub workspace_id: String,
    /// Agent to mention; takes precedence over `model`
    pub assistant_id: Option<String>,
    pub model: Option<String>,
    /// Catalog from an earlier `fetch_available_models`, used by `get_model`
    pub available_models: Option<ModelCatalog>,
    pub stream_mode: StreamMode,
}

impl DustProviderConfig {
    pub fn new<W: Into<String>, K: Into<String>>(workspace_id: W, api_key: K) -> Self {
        Self {
            host: DEFAULT_DUST_HOST.to_string(),
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
            assistant_id: None,
            model: None,
            available_models: None,
            stream_mode: StreamMode::default(),
        }
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_assistant_id<S: Into<String>>(mut self, assistant_id: S) -> Self {
        self.assistant_id = Some(assistant_id.into());
        self
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_available_models(mut self, models: ModelCatalog) -> Self {
        self.available_models = Some(models);
        self
    }

    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.stream_mode = mode;
        self
    }

    /// Check the workspace id, then the API key
    pub fn validate(&self) -> ProviderResult<()> {
        if self.workspace_id.is_empty() {
            return Err(ProviderError::Configuration(
                "Dust workspace ID is required".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Dust API key is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Agent mentioned in every posted message: assistant, then model, then the default agent
    pub fn configuration_id(&self) -> &str {
        [&self.assistant_id, &self.model]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|id| !id.is_empty())
            .unwrap_or(DEFAULT_AGENT_ID)
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}
