use anyhow::{Context, Result};
use console::style;
use dust::models::{message::Message, role::Role};
use dust::providers::{
    base::{Provider, StreamEvent, Usage},
    dust::DustProvider,
    sse::StreamMode,
};
use futures::TryStreamExt;
use std::io::Write;

use crate::configuration::Settings;

pub struct ChatOptions {
    pub system: String,
    pub agent: Option<String>,
    pub tool_aware: bool,
    pub prompt: String,
}

pub async fn execute(settings: Settings, options: ChatOptions) -> Result<()> {
    let mut config = settings.into_config();
    if let Some(agent) = options.agent {
        config = config.with_assistant_id(agent);
    }
    if options.tool_aware {
        config = config.with_stream_mode(StreamMode::ToolAware);
    }
    let provider = DustProvider::new(config).context("Invalid Dust settings")?;

    let messages = vec![Message::new(Role::User, options.prompt)];
    let mut stream = provider.create_message(&options.system, &messages);

    let mut stdout = std::io::stdout();
    while let Some(event) = stream
        .try_next()
        .await
        .context("Dust request failed")?
    {
        match event {
            StreamEvent::Text { text } => {
                write!(stdout, "{text}")?;
                stdout.flush()?;
            }
            StreamEvent::Usage(usage) => eprintln!("{}", usage_line(&usage)),
        }
    }
    writeln!(stdout)?;
    Ok(())
}

fn usage_line(usage: &Usage) -> String {
    format!(
        "{} {} in, {} out",
        style("usage:").dim(),
        style(usage.input_tokens).bold(),
        style(usage.output_tokens).bold()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_line() {
        console::set_colors_enabled(false);
        assert_eq!(usage_line(&Usage::new(10, 5)), "usage: 10 in, 5 out");
    }
}
