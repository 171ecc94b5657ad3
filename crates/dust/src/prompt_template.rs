// prompt_template.rs

use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Instructions wrapped around the host's system prompt before it is sent to Dust
const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct SystemPromptContext<'a> {
    system_prompt: &'a str,
}

/// Wrap the system prompt with the tool-call formatting instructions.
///
/// The result always contains the system prompt verbatim; if the template cannot be
/// rendered the prompt is returned under its heading alone.
pub fn dust_system_prompt(system_prompt: &str) -> String {
    match load_prompt(SYSTEM_TEMPLATE, &SystemPromptContext { system_prompt }) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::warn!("Failed to render the Dust system prompt template: {}", e);
            format!("# System Prompt\n\n{system_prompt}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_xml::BUILTIN_TOOLS;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        // 'age' is missing from context
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_system_prompt_is_embedded_verbatim() {
        let system = "You are <careful> & \"precise\" {{ not a variable }}";
        let rendered = dust_system_prompt(system);

        assert!(rendered.starts_with("# System Prompt\n\n"));
        assert!(rendered.contains(system));
        assert!(rendered.contains("# Instructions for Formulating Your Response"));
    }

    #[test]
    fn test_system_prompt_describes_every_builtin_tool() {
        let rendered = dust_system_prompt("sys");
        for (name, fields) in BUILTIN_TOOLS {
            assert!(rendered.contains(&format!("<{name}>")), "missing {name}");
            for field in fields.iter() {
                assert!(rendered.contains(&format!("<{field}>")), "missing {name}.{field}");
            }
        }
    }
}
