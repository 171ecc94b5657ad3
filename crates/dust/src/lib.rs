//! Dust conversational-agent provider.
//!
//! Translates a host conversation into Dust conversations and messages, and turns the
//! server-sent event stream of each reply back into text and usage events. Tool use is
//! carried inside plain text as pseudo-XML, see [`tool_xml`].

pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod tool_xml;
