//! Registry read commands: list, show.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use agentmint_types::agent::AgentRecord;

use crate::state::AppState;

use super::spinner;

/// List every registered agent in a table.
pub async fn list_agents(state: &AppState, json: bool) -> Result<()> {
    let spinner = spinner("Reading registry...");
    let agents = state.registrar.list_all().await;
    spinner.finish_and_clear();
    let agents = agents?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agents)?);
        return Ok(());
    }

    if agents.is_empty() {
        println!();
        println!(
            "  {} No agents registered yet. Create one with: {}",
            style("i").blue().bold(),
            style("agentmint create").yellow()
        );
        println!();
        return Ok(());
    }

    println!("{}", agent_table(&agents));
    println!();
    println!("  {} agent(s)", agents.len());
    Ok(())
}

/// Show one agent by its deployed address.
pub async fn show_agent(state: &AppState, address: &str, json: bool) -> Result<()> {
    let spinner = spinner("Reading registry...");
    let agent = state.registrar.get_by_address(address).await;
    spinner.finish_and_clear();
    let agent = agent?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agent)?);
        return Ok(());
    }

    print_agent(&agent);
    Ok(())
}

pub fn agent_table(agents: &[AgentRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Age").fg(Color::White),
        Cell::new("Race").fg(Color::White),
        Cell::new("Profession").fg(Color::White),
        Cell::new("Address").fg(Color::White),
    ]);

    for agent in agents {
        table.add_row(vec![
            Cell::new(&agent.name).fg(Color::Cyan),
            Cell::new(agent.age),
            Cell::new(&agent.race),
            Cell::new(&agent.profession),
            Cell::new(&agent.token_address).fg(Color::DarkGrey),
        ]);
    }

    table
}

pub fn print_agent(agent: &AgentRecord) {
    let row = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            println!("  {:<14} {}", style(label).bold(), value);
        }
    };

    println!();
    println!("  {}", style(&agent.name).cyan().bold());
    println!();
    row("Description:", &agent.description);
    row("Age:", &agent.age.to_string());
    row("Race:", &agent.race);
    row("Profession:", &agent.profession);
    row("Bio:", &agent.bio);
    row("Greeting:", &agent.first_message);
    row("Image:", &agent.image);
    row("Address:", &agent.token_address);
    row("Creator:", &agent.creator);
    println!();
}
