use super::tool::{ToolCall, ToolInput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub data: String,
    pub encoding: String,
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// A typed block inside a message's content list
pub enum ContentBlock {
    Text(TextContent),
    Image(ImageContent),
    ToolUse(ToolCall),
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text(TextContent { text: text.into() })
    }

    pub fn image<S: Into<String>, T: Into<String>>(data: S, media_type: T) -> Self {
        ContentBlock::Image(ImageContent {
            data: data.into(),
            encoding: "base64".to_string(),
            media_type: media_type.into(),
        })
    }

    pub fn tool_use<I: Into<String>, N: Into<String>>(id: I, name: N, input: ToolInput) -> Self {
        ContentBlock::ToolUse(ToolCall::new(id, name, input))
    }

    /// Get the text content if this is a Text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    /// Get the tool call if this is a ToolUse block
    pub fn as_tool_use(&self) -> Option<&ToolCall> {
        match self {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        }
    }
}
