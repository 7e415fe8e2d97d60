//! Interactive chat with a committed agent.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;

use agentmint_core::chat::session::ChatSession;
use agentmint_types::error::ChatError;
use agentmint_types::llm::MessageRole;

use crate::state::AppState;

use super::spinner;

const EXIT_COMMANDS: [&str; 3] = ["/quit", "/exit", "/q"];

/// Look up the agent at `address` and chat with it.
pub async fn chat_with_address(state: &AppState, address: &str) -> Result<()> {
    let spinner = spinner("Loading agent...");
    let agent = state.registrar.get_by_address(address).await;
    spinner.finish_and_clear();
    let agent = agent.with_context(|| format!("could not load agent {address}"))?;

    run_chat(state.chat(agent)).await
}

/// Read-send-print loop until the user exits.
pub async fn run_chat(session: ChatSession) -> Result<()> {
    let name = session.agent().name.clone();

    println!();
    println!(
        "  {} Chatting with {} {}",
        style("*").cyan().bold(),
        style(&name).cyan().bold(),
        style(format!("(session {})", session.id())).dim()
    );
    println!("  {}", style("Type /quit to leave.").dim());
    println!();

    for message in session.visible_messages().await {
        if message.content.trim().is_empty() {
            continue;
        }
        print_message(&name, message.role, &message.content);
    }

    loop {
        let line: String = Input::new()
            .with_prompt(format!("{}", style("you").green().bold()))
            .allow_empty(true)
            .interact_text()?;

        let line = line.trim();
        if EXIT_COMMANDS.contains(&line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let spinner = spinner("thinking...");
        let reply = session.send(line).await;
        spinner.finish_and_clear();

        match reply {
            Ok(reply) => print_message(&name, MessageRole::Assistant, &reply),
            Err(ChatError::Generation(e)) => {
                eprintln!(
                    "  {} {e}. No reply; your message stays in the conversation.",
                    style("!").yellow().bold()
                );
            }
            Err(e) => eprintln!("  {} {e}", style("!").yellow().bold()),
        }
    }

    println!();
    println!("  {}", style("Goodbye.").dim());
    Ok(())
}

fn print_message(agent_name: &str, role: MessageRole, content: &str) {
    match role {
        MessageRole::Assistant => println!("{} {content}\n", style(format!("{agent_name}:")).cyan().bold()),
        MessageRole::User => println!("{} {content}\n", style("you:").green().bold()),
        MessageRole::System => {}
    }
}
