use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands {
    pub mod agents;
    pub mod chat;
}
mod configuration;
mod error;

use commands::chat::ChatOptions;
use configuration::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file; DUST_* environment variables take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the agents available in the workspace
    Agents {
        /// Only show agents whose id, name or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Send a prompt to an agent and stream the reply
    Chat {
        /// System prompt sent ahead of the conversation
        #[arg(short, long, default_value = "You are a helpful assistant.")]
        system: String,

        /// Agent to mention, overriding the configured assistant
        #[arg(short, long)]
        agent: Option<String>,

        /// Hold the reply until it is complete and normalize its tool calls
        #[arg(long)]
        tool_aware: bool,

        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Agents { search } => {
            let settings = Settings::load(cli.config.as_deref())?;
            commands::agents::execute(settings, search.as_deref()).await
        }
        Command::Chat {
            system,
            agent,
            tool_aware,
            prompt,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            commands::chat::execute(
                settings,
                ChatOptions {
                    system,
                    agent,
                    tool_aware,
                    prompt,
                },
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["dust", "agents", "--search", "help"]).unwrap();
        assert!(matches!(cli.command, Command::Agents { search: Some(ref term) } if term == "help"));

        let cli = Cli::try_parse_from(["dust", "chat", "--tool-aware", "-a", "agent-1", "hi"]).unwrap();
        match cli.command {
            Command::Chat {
                agent,
                tool_aware,
                prompt,
                ..
            } => {
                assert_eq!(agent.as_deref(), Some("agent-1"));
                assert!(tool_aware);
                assert_eq!(prompt, "hi");
            }
            _ => panic!("Expected chat command"),
        }

        assert!(Cli::try_parse_from(["dust", "version"]).is_err());
    }
}
