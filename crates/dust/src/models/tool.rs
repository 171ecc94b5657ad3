use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named string parameters of a tool call, kept in the order they were written.
///
/// Keys are unique; equality ignores order.
pub type ToolInput = IndexMap<String, String>;

/// A tool call request, either sent by the host or recovered from model output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    /// The name of the tool to execute
    pub name: String,
    /// The parameters for the execution
    pub input: ToolInput,
}

impl ToolCall {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, input: ToolInput) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}
