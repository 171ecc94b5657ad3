use anyhow::{Context, Result};
use console::style;
use dust::providers::{
    base::Provider,
    catalog::{search_agents, sorted_agents, ModelInfo},
    dust::DustProvider,
};

use crate::configuration::Settings;

pub async fn execute(settings: Settings, search: Option<&str>) -> Result<()> {
    let provider = DustProvider::new(settings.into_config()).context("Invalid Dust settings")?;
    let catalog = provider
        .fetch_available_models()
        .await
        .context("Could not list Dust agents")?;

    let agents = match search {
        Some(term) => search_agents(&catalog, term),
        None => sorted_agents(&catalog),
    };

    if agents.is_empty() {
        println!("{}", style("No agents found").dim());
        return Ok(());
    }

    for (id, info) in agents {
        println!("{}", agent_line(id, info));
    }
    Ok(())
}

fn agent_line(id: &str, info: &ModelInfo) -> String {
    let mut line = format!(
        "{} {}",
        style(info.display_name(id)).bold().green(),
        style(format!("({id})")).dim()
    );
    if let Some(description) = info.agent_description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n    {description}"));
    }
    line
}
