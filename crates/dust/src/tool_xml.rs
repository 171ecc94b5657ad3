//! Pseudo-XML tool calls embedded in model output.
//!
//! A tool call is written as
//!
//! ```text
//! <tool_name>
//! <param>value</param>
//! </tool_name>
//! ```
//!
//! Parsing happens in two stages: [`extract_tag_pairs`] finds balanced `<name>...</name>`
//! pairs without knowing anything about tools, then a [`ToolSchema`] decides which of
//! those pairs are valid calls by looking up the required parameters of each tool.
//! Values are never escaped, so a value containing its own closing tag cannot round-trip.

use chrono::Utc;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::models::tool::{ToolCall, ToolInput};

/// Tools understood by the built-in schema, with their required parameters
pub const BUILTIN_TOOLS: &[(&str, &[&str])] = &[
    ("execute_command", &["command"]),
    ("list_files", &["path"]),
    ("list_code_definition_names", &["path"]),
    ("search_files", &["path", "regex"]),
    ("read_file", &["path"]),
    ("write_to_file", &["path", "content"]),
    ("ask_followup_question", &["question"]),
    ("attempt_completion", &["result"]),
];

lazy_static! {
    static ref BUILTIN_SCHEMA: ToolSchema = ToolSchema::new(BUILTIN_TOOLS);
}

/// Render a tool call in the pseudo-XML format, parameters in insertion order
pub fn format_tool_call(tool_name: &str, input: &ToolInput) -> String {
    let params = input
        .iter()
        .map(|(key, value)| format!("<{key}>{value}</{key}>"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("<{tool_name}>\n{params}\n</{tool_name}>")
}

/// Split model output into narrative text and the tool calls of the built-in schema
pub fn parse_tool_calls(text: &str) -> ParsedResponse {
    ToolSchema::builtin().parse(text)
}

/// A balanced `<name>content</name>` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair<'a> {
    pub name: &'a str,
    pub content: &'a str,
    /// Byte offset of the opening `<`
    pub start: usize,
    /// Byte offset just past the closing `>`
    pub end: usize,
}

/// Find all non-overlapping `<name>...</name>` pairs, left to right.
///
/// A name is one or more ASCII word characters. The content is matched lazily, so it
/// ends at the first closing tag with the same name. An opening tag without a closing
/// tag is skipped and scanning resumes right after its `<`.
pub fn extract_tag_pairs(text: &str) -> Vec<TagPair<'_>> {
    let bytes = text.as_bytes();
    let mut pairs = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let open = pos + offset;
        let name_start = open + 1;
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| is_word_byte(**b))
            .count();
        let name_end = name_start + name_len;

        if name_len == 0 || bytes.get(name_end) != Some(&b'>') {
            pos = name_start;
            continue;
        }

        let name = &text[name_start..name_end];
        let content_start = name_end + 1;
        let closing = format!("</{name}>");

        match text[content_start..].find(&closing) {
            Some(relative) => {
                let content_end = content_start + relative;
                let end = content_end + closing.len();
                pairs.push(TagPair {
                    name,
                    content: &text[content_start..content_end],
                    start: open,
                    end,
                });
                pos = end;
            }
            None => pos = name_start,
        }
    }

    pairs
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Read `<param>value</param>` pairs one level deep; values are trimmed, last one wins
fn parse_tool_input(content: &str) -> ToolInput {
    let mut input = ToolInput::new();
    for pair in extract_tag_pairs(content) {
        input.insert(pair.name.to_string(), pair.content.trim().to_string());
    }
    input
}

/// The result of splitting model output
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Everything before the first known tool tag, trimmed
    pub normal_text: String,
    /// Valid tool calls in order of appearance
    pub tool_calls: Vec<ToolCall>,
}

impl ParsedResponse {
    /// Narrative text followed by every call re-encoded, separated by blank lines
    pub fn to_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.tool_calls.len() + 1);
        if !self.normal_text.is_empty() {
            parts.push(self.normal_text.clone());
        }
        parts.extend(
            self.tool_calls
                .iter()
                .map(|call| format_tool_call(&call.name, &call.input)),
        );
        parts.join("\n\n")
    }
}

/// Tool names and the parameters each of them requires
#[derive(Debug, Clone)]
pub struct ToolSchema {
    required: IndexMap<String, Vec<String>>,
    opening_tag: Option<Regex>,
}

impl ToolSchema {
    pub fn new(tools: &[(&str, &[&str])]) -> Self {
        let required: IndexMap<String, Vec<String>> = tools
            .iter()
            .map(|(name, fields)| {
                (
                    name.to_string(),
                    fields.iter().map(|field| field.to_string()).collect(),
                )
            })
            .collect();

        let opening_tag = if required.is_empty() {
            None
        } else {
            let names = required
                .keys()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            RegexBuilder::new(&format!("<(?:{names})>"))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            required,
            opening_tag,
        }
    }

    /// The schema of the tools described in the Dust system prompt
    pub fn builtin() -> &'static ToolSchema {
        &BUILTIN_SCHEMA
    }

    /// A call is valid when the tool is known and every required parameter is present
    pub fn validate(&self, tool_name: &str, input: &ToolInput) -> bool {
        self.required
            .get(tool_name)
            .is_some_and(|fields| fields.iter().all(|field| input.contains_key(field)))
    }

    /// Byte offset of the first opening tag of a known tool, ignoring case
    pub fn find_first_tool_tag(&self, text: &str) -> Option<usize> {
        self.opening_tag
            .as_ref()
            .and_then(|pattern| pattern.find(text))
            .map(|found| found.start())
    }

    pub fn parse(&self, text: &str) -> ParsedResponse {
        let Some(start) = self.find_first_tool_tag(text) else {
            return ParsedResponse {
                normal_text: text.trim().to_string(),
                tool_calls: Vec::new(),
            };
        };

        let timestamp = Utc::now().timestamp_millis();
        let mut tool_calls = Vec::new();
        for pair in extract_tag_pairs(&text[start..]) {
            let input = parse_tool_input(pair.content);
            if self.validate(pair.name, &input) {
                let id = format!("call_{}_{}", tool_calls.len(), timestamp);
                tool_calls.push(ToolCall::new(id, pair.name, input));
            }
        }

        ParsedResponse {
            normal_text: text[..start].trim().to_string(),
            tool_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> ToolInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_format_tool_call() {
        let text = format_tool_call(
            "write_to_file",
            &input(&[("path", "a.txt"), ("content", "hello")]),
        );
        assert_eq!(
            text,
            "<write_to_file>\n<path>a.txt</path>\n<content>hello</content>\n</write_to_file>"
        );
    }

    #[test]
    fn test_round_trip_for_every_builtin_tool() {
        for (name, fields) in BUILTIN_TOOLS {
            let original: ToolInput = fields
                .iter()
                .map(|field| (field.to_string(), format!("value of {field}")))
                .collect();

            let parsed = parse_tool_calls(&format_tool_call(name, &original));

            assert_eq!(parsed.normal_text, "");
            assert_eq!(parsed.tool_calls.len(), 1, "tool {name}");
            assert_eq!(parsed.tool_calls[0].name, *name);
            assert_eq!(parsed.tool_calls[0].input, original);
        }
    }

    #[test]
    fn test_parse_normal_text_without_tool_calls() {
        let parsed = parse_tool_calls("  This is a normal response without tool calls.\n");
        assert_eq!(
            parsed.normal_text,
            "This is a normal response without tool calls."
        );
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_unknown_tags_only_is_plain_text() {
        let parsed = parse_tool_calls("Use <b>bold</b> here");
        assert_eq!(parsed.normal_text, "Use <b>bold</b> here");
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_single_tool_call() {
        let parsed = parse_tool_calls(
            "Let me read the file.\n\n<read_file>\n<path>test.txt</path>\n</read_file>",
        );

        assert_eq!(parsed.normal_text, "Let me read the file.");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "read_file");
        assert_eq!(parsed.tool_calls[0].input, input(&[("path", "test.txt")]));
        assert!(parsed.tool_calls[0].id.starts_with("call_0_"));
    }

    #[test]
    fn test_parse_sibling_calls_in_order_with_distinct_ids() {
        let parsed = parse_tool_calls(
            "I'll execute these commands.\n\n\
             <execute_command>\n<command>npm install</command>\n</execute_command>\n\n\
             <execute_command>\n<command>npm test</command>\n</execute_command>",
        );

        assert_eq!(parsed.normal_text, "I'll execute these commands.");
        assert_eq!(parsed.tool_calls.len(), 2);
        assert_eq!(parsed.tool_calls[0].input["command"], "npm install");
        assert_eq!(parsed.tool_calls[1].input["command"], "npm test");
        assert_ne!(parsed.tool_calls[0].id, parsed.tool_calls[1].id);
    }

    #[test]
    fn test_parse_drops_invalid_calls_and_keeps_valid_ones() {
        let parsed = parse_tool_calls(
            "Testing invalid tool calls.\n\n\
             <read_file>\n</read_file>\n\n\
             <unknown_tool>\n<path>x</path>\n</unknown_tool>\n\n\
             <execute_command>\n<command>npm test</command>\n</execute_command>",
        );

        assert_eq!(parsed.normal_text, "Testing invalid tool calls.");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].input, input(&[("command", "npm test")]));
        // Ids count accepted calls only
        assert!(parsed.tool_calls[0].id.starts_with("call_0_"));
    }

    #[test]
    fn test_parse_multiline_content_is_trimmed() {
        let parsed = parse_tool_calls(
            "Creating a new file.\n\n<write_to_file>\n<path>test.js</path>\n<content>\n\
             function hello() {\n    console.log(\"Hello, World!\");\n}\nhello();\n\
             </content>\n</write_to_file>",
        );

        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(
            parsed.tool_calls[0].input["content"],
            "function hello() {\n    console.log(\"Hello, World!\");\n}\nhello();"
        );
        assert_eq!(parsed.tool_calls[0].input["path"], "test.js");
    }

    #[test]
    fn test_opening_tag_match_ignores_case() {
        let parsed = parse_tool_calls("Before <READ_FILE><path>a</path></READ_FILE>");
        assert_eq!(parsed.normal_text, "Before");
        // The pair matcher is exact, so the upper-case name fails validation
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_duplicate_parameters_last_wins() {
        let parsed = parse_tool_calls(
            "<read_file><path>first</path><path>second</path></read_file>",
        );
        assert_eq!(parsed.tool_calls[0].input, input(&[("path", "second")]));
    }

    #[test]
    fn test_whitespace_only_value_counts_as_present() {
        let parsed = parse_tool_calls("<ask_followup_question><question>  </question></ask_followup_question>");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].input["question"], "");
    }

    #[test]
    fn test_schema_with_empty_required_set_accepts_bare_call() {
        let schema = ToolSchema::new(&[("list_agents", &[])]);
        let parsed = schema.parse("Checking.\n<list_agents>\n</list_agents>");
        assert_eq!(parsed.normal_text, "Checking.");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert!(parsed.tool_calls[0].input.is_empty());
    }

    #[test]
    fn test_empty_schema_never_matches() {
        let schema = ToolSchema::new(&[]);
        let parsed = schema.parse(" <read_file><path>a</path></read_file> ");
        assert_eq!(parsed.normal_text, "<read_file><path>a</path></read_file>");
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_extract_tag_pairs_skips_unbalanced_and_malformed_tags() {
        let pairs = extract_tag_pairs("<a>1</a> < b> <c>open <d x>no</d> <e>2</e>");
        let names: Vec<_> = pairs.iter().map(|pair| (pair.name, pair.content)).collect();
        assert_eq!(names, vec![("a", "1"), ("e", "2")]);
    }

    #[test]
    fn test_extract_tag_pairs_is_lazy_and_non_overlapping() {
        let text = "<x>one</x><x>two</x>";
        let pairs = extract_tag_pairs(text);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].content, "one");
        assert_eq!(&text[pairs[1].start..pairs[1].end], "<x>two</x>");
    }

    #[test]
    fn test_to_text_joins_with_blank_lines() {
        let parsed = parse_tool_calls("Plan.\n<read_file>\n<path>a</path>\n</read_file>trailing");
        assert_eq!(
            parsed.to_text(),
            "Plan.\n\n<read_file>\n<path>a</path>\n</read_file>"
        );
    }
}
