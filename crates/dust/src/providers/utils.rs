use serde::Serialize;

use crate::models::content::ContentBlock;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::prompt_template::dust_system_prompt;
use crate::tool_xml::format_tool_call;

/// A message in the shape posted to a Dust conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: MessageContent,
}

impl WireMessage {
    fn new<C: Into<MessageContent>>(role: Role, content: C) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }
}

/// Convert the host history to Dust wire messages.
///
/// The wrapped system prompt is prepended as a user message, assistant block lists
/// are flattened to a single string with tool calls in pseudo-XML, and string tool
/// results are re-sent as user messages. Everything else passes through unchanged.
pub fn messages_to_dust_spec(messages: &[Message], system: &str) -> Vec<WireMessage> {
    let mut messages_spec = Vec::with_capacity(messages.len() + 1);
    messages_spec.push(WireMessage::new(Role::User, dust_system_prompt(system)));

    for message in messages {
        let converted = match (message.role, &message.content) {
            (Role::Assistant, MessageContent::Blocks(blocks)) => {
                WireMessage::new(Role::Assistant, flatten_assistant_blocks(blocks))
            }
            (Role::Tool, MessageContent::Text(text)) => {
                WireMessage::new(Role::User, text.as_str())
            }
            (role, content) => WireMessage::new(role, content.clone()),
        };
        messages_spec.push(converted);
    }

    messages_spec
}

fn flatten_assistant_blocks(blocks: &[ContentBlock]) -> String {
    let text = blocks
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join("\n");
    let calls = blocks
        .iter()
        .filter_map(ContentBlock::as_tool_use)
        .map(|call| format_tool_call(&call.name, &call.input))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{text}\n\n{calls}").trim().to_string()
}
