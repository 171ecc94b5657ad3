use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::catalog::{ModelCatalog, ModelEntry};
use crate::errors::ProviderResult;
use crate::models::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// A normalized chat-completion event handed back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Text { text: String },
    Usage(Usage),
}

impl StreamEvent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        StreamEvent::Text { text: text.into() }
    }

    pub fn usage(input_tokens: u64, output_tokens: u64) -> Self {
        StreamEvent::Usage(Usage::new(input_tokens, output_tokens))
    }
}

/// Events of one request, produced lazily as the response bodies arrive.
///
/// Dropping the stream cancels the request and releases its connection.
pub type ProviderStream<'a> = BoxStream<'a, ProviderResult<StreamEvent>>;

/// Base trait for conversational-agent providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the system prompt and message history, streaming back the reply events
    fn create_message<'a>(&'a self, system: &'a str, messages: &'a [Message])
        -> ProviderStream<'a>;

    /// The agent or model this provider addresses, falling back to the default entry
    fn get_model(&self) -> ModelEntry;

    /// List the agents or models available to the configured credentials
    async fn fetch_available_models(&self) -> ProviderResult<ModelCatalog>;
}
