use super::content::ContentBlock;
use super::role::Role;
use super::tool::ToolInput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Message content is either a plain string or a list of typed blocks
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Blocks(_) => None,
        }
    }

    pub fn as_blocks(&self) -> Option<&[ContentBlock]> {
        match self {
            MessageContent::Text(_) => None,
            MessageContent::Blocks(blocks) => Some(blocks),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        MessageContent::Blocks(blocks)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message from the host's conversation history
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new<C: Into<MessageContent>>(role: Role, content: C) -> Self {
        Message {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message with an empty block list
    pub fn user() -> Self {
        Message::new(Role::User, Vec::<ContentBlock>::new())
    }

    /// Create a new assistant message with an empty block list
    pub fn assistant() -> Self {
        Message::new(Role::Assistant, Vec::<ContentBlock>::new())
    }

    /// Create a tool result message with string content
    pub fn tool<S: Into<String>>(result: S) -> Self {
        Message::new(Role::Tool, MessageContent::Text(result.into()))
    }

    /// Add a content block, turning plain string content into a text block first
    pub fn with_content(mut self, block: ContentBlock) -> Self {
        self.content = match self.content {
            MessageContent::Blocks(mut blocks) => {
                blocks.push(block);
                MessageContent::Blocks(blocks)
            }
            MessageContent::Text(text) => {
                MessageContent::Blocks(vec![ContentBlock::text(text), block])
            }
        };
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(ContentBlock::text(text))
    }

    /// Add image content to the message
    pub fn with_image<S: Into<String>, T: Into<String>>(self, data: S, media_type: T) -> Self {
        self.with_content(ContentBlock::image(data, media_type))
    }

    /// Add a tool use to the message
    pub fn with_tool_use<I: Into<String>, N: Into<String>>(
        self,
        id: I,
        name: N,
        input: ToolInput,
    ) -> Self {
        self.with_content(ContentBlock::tool_use(id, name, input))
    }
}
