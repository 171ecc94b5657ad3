use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{ProviderError, ProviderResult};

/// Agent addressed when neither an assistant nor a model is configured
pub const DEFAULT_AGENT_ID: &str = "dust";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_CONTEXT_WINDOW: u32 = 200_000;

/// Capabilities and descriptive metadata of one Dust agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub max_tokens: u32,
    pub context_window: u32,
    pub supports_images: bool,
    pub supports_prompt_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_picture_url: Option<String>,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            agent_id: None,
            model_id: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            context_window: DEFAULT_CONTEXT_WINDOW,
            supports_images: true,
            supports_prompt_cache: true,
            agent_name: None,
            agent_description: None,
            agent_instructions: None,
            agent_picture_url: None,
        }
    }
}

impl ModelInfo {
    /// Name shown to users: the agent name when known, else the given id
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.agent_name.as_deref().unwrap_or(id)
    }
}

/// Available agents keyed by agent id
pub type ModelCatalog = BTreeMap<String, ModelInfo>;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub id: String,
    pub info: ModelInfo,
}

lazy_static! {
    static ref DEFAULT_MODEL: ModelEntry = ModelEntry {
        id: DEFAULT_AGENT_ID.to_string(),
        info: ModelInfo::default(),
    };
}

pub fn default_model() -> &'static ModelEntry {
    &DEFAULT_MODEL
}

/// Resolve the requested agent against previously fetched ones; never fails
pub fn get_model(requested: Option<&str>, available: Option<&ModelCatalog>) -> ModelEntry {
    let requested = requested.unwrap_or(DEFAULT_AGENT_ID);
    match available.and_then(|models| models.get(requested)) {
        Some(info) => ModelEntry {
            id: requested.to_string(),
            info: info.clone(),
        },
        None => default_model().clone(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AgentConfigurationsResponse {
    List(Vec<Value>),
    Wrapped {
        #[serde(rename = "agentConfigurations")]
        agent_configurations: Vec<Value>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentConfiguration {
    #[serde(rename = "sId")]
    s_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    instructions: Option<String>,
    picture_url: Option<String>,
    model: Option<AgentModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentModel {
    model_id: Option<String>,
}

/// Build a catalog from an `agent_configurations` response body.
///
/// Both a bare array and an `{ "agentConfigurations": [...] }` wrapper are accepted.
/// Entries without an agent id or a model id are skipped.
pub fn catalog_from_agent_configurations(body: Value) -> ProviderResult<ModelCatalog> {
    let entries = match serde_json::from_value::<AgentConfigurationsResponse>(body) {
        Ok(AgentConfigurationsResponse::List(entries)) => entries,
        Ok(AgentConfigurationsResponse::Wrapped {
            agent_configurations,
        }) => agent_configurations,
        Err(_) => {
            return Err(ProviderError::ProtocolMismatch(
                "agent configurations must be an array or an object with an agentConfigurations array"
                    .to_string(),
            ))
        }
    };

    let mut models = ModelCatalog::new();
    for entry in entries {
        let Ok(config) = serde_json::from_value::<AgentConfiguration>(entry) else {
            continue;
        };
        let model_id = config.model.and_then(|model| model.model_id);
        let (Some(agent_id), Some(model_id)) = (config.s_id, model_id) else {
            continue;
        };

        models.insert(
            agent_id.clone(),
            ModelInfo {
                agent_id: Some(agent_id),
                model_id: Some(model_id),
                agent_name: config.name,
                agent_description: config.description,
                agent_instructions: config.instructions,
                agent_picture_url: config.picture_url,
                ..ModelInfo::default()
            },
        );
    }

    Ok(models)
}

/// Agents ordered by display name, ties broken by id
pub fn sorted_agents(catalog: &ModelCatalog) -> Vec<(&str, &ModelInfo)> {
    let mut agents: Vec<(&str, &ModelInfo)> = catalog
        .iter()
        .map(|(id, info)| (id.as_str(), info))
        .collect();
    agents.sort_by(|(a_id, a), (b_id, b)| {
        a.display_name(a_id)
            .to_lowercase()
            .cmp(&b.display_name(b_id).to_lowercase())
            .then_with(|| a_id.cmp(b_id))
    });
    agents
}

/// Agents whose id, name or description contains `term`, ignoring case
pub fn search_agents<'a>(catalog: &'a ModelCatalog, term: &str) -> Vec<(&'a str, &'a ModelInfo)> {
    let needle = term.trim().to_lowercase();
    sorted_agents(catalog)
        .into_iter()
        .filter(|(id, info)| {
            needle.is_empty()
                || id.to_lowercase().contains(&needle)
                || [&info.agent_name, &info.agent_description]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
