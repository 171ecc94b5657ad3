use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::base::{Provider, ProviderStream};
use super::catalog::{catalog_from_agent_configurations, get_model, ModelCatalog, ModelEntry};
use super::configs::DustProviderConfig;
use super::sse::DustStreamDecoder;
use super::utils::messages_to_dust_spec;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::{Message, MessageContent};

pub struct DustProvider {
    client: Client,
    config: DustProviderConfig,
}

#[derive(Deserialize)]
struct ResourceId {
    #[serde(rename = "sId")]
    s_id: String,
}

#[derive(Deserialize)]
struct ConversationResponse {
    conversation: ResourceId,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: ResourceId,
}

impl DustProvider {
    pub fn new(config: DustProviderConfig) -> ProviderResult<Self> {
        config.validate()?;
        // No request timeout, reply streams stay open while the agent writes
        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/w/{}/assistant/{}",
            self.config.base_url(),
            self.config.workspace_id,
            path
        )
    }

    fn mentions(&self) -> Value {
        json!([{ "configurationId": self.config.configuration_id() }])
    }

    async fn post(&self, path: &str, payload: &Value, context: &str) -> ProviderResult<Value> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(context, status));
        }
        read_json(response).await
    }

    async fn get(&self, path: &str, context: &str) -> ProviderResult<Response> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(context, status));
        }
        Ok(response)
    }

    /// Open an unlisted conversation whose first message is `system`, returning its id
    pub async fn create_conversation(&self, system: &str) -> ProviderResult<String> {
        let payload = json!({
            "message": {
                "content": system,
                "mentions": self.mentions(),
            },
            "visibility": "unlisted",
            "blocking": true,
        });

        let body = self
            .post("conversations", &payload, "Failed to create conversation")
            .await?;
        let created: ConversationResponse = serde_json::from_value(body).map_err(|e| {
            ProviderError::ProtocolMismatch(format!("conversation response: {}", e))
        })?;

        tracing::debug!(conversation_id = %created.conversation.s_id, "Created Dust conversation");
        Ok(created.conversation.s_id)
    }

    /// Post one message to the conversation, returning the new message id
    pub async fn post_message(
        &self,
        conversation_id: &str,
        content: &MessageContent,
    ) -> ProviderResult<String> {
        let payload = json!({
            "content": content,
            "mentions": self.mentions(),
        });

        let body = self
            .post(
                &format!("conversations/{}/messages", conversation_id),
                &payload,
                "Failed to send message",
            )
            .await?;
        let posted: MessageResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::ProtocolMismatch(format!("message response: {}", e)))?;

        tracing::debug!(message_id = %posted.message.s_id, "Posted Dust message");
        Ok(posted.message.s_id)
    }

    /// Open the event stream of a posted message
    pub async fn message_events(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> ProviderResult<Response> {
        self.get(
            &format!(
                "conversations/{}/messages/{}/events",
                conversation_id, message_id
            ),
            "Failed to get message events",
        )
        .await
    }
}

/// Read a success body as JSON; a body that is not JSON is a protocol mismatch
async fn read_json(response: Response) -> ProviderResult<Value> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::ProtocolMismatch(format!("invalid JSON body: {}", e)))
}

#[async_trait]
impl Provider for DustProvider {
    fn create_message<'a>(
        &'a self,
        system: &'a str,
        messages: &'a [Message],
    ) -> ProviderStream<'a> {
        Box::pin(async_stream::try_stream! {
            let wire_messages = messages_to_dust_spec(messages, system);
            let conversation_id = self.create_conversation(system).await?;

            for message in &wire_messages {
                let message_id = self.post_message(&conversation_id, &message.content).await?;
                let response = self.message_events(&conversation_id, &message_id).await?;

                let mut decoder = DustStreamDecoder::new(self.config.stream_mode);
                let mut body = response.bytes_stream();
                while let Some(chunk) = body.next().await {
                    let chunk = chunk.map_err(ProviderError::from)?;
                    for event in decoder.feed(&chunk) {
                        yield event;
                    }
                }
                for event in decoder.finish() {
                    yield event;
                }

                tracing::debug!(message_id = %message_id, "Drained Dust message events");
            }
        })
    }

    fn get_model(&self) -> ModelEntry {
        // The assistant override only picks who is mentioned, not the reported model
        let requested = self.config.model.as_deref().filter(|model| !model.is_empty());
        get_model(requested, self.config.available_models.as_ref())
    }

    async fn fetch_available_models(&self) -> ProviderResult<ModelCatalog> {
        let response = self
            .get("agent_configurations", "Failed to fetch models")
            .await?;
        catalog_from_agent_configurations(read_json(response).await?)
    }
}
