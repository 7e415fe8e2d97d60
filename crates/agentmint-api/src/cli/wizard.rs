//! `agentmint create` -- drives the persona wizard from the terminal.
//!
//! One menu per stage: edit a field by hand, have the model write the stage,
//! fill only what is empty, or move forward/back. Leaving Details mints the
//! agent; the wizard then hands over to the chat loop.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};

use agentmint_core::wizard::machine::{AutoFill, PersonaWizard, Transition};
use agentmint_types::draft::{DraftField, Stage};
use agentmint_types::error::WizardError;

use crate::state::AppState;

use super::agent::{agent_table, print_agent};
use super::chat::run_chat;
use super::spinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Edit(DraftField),
    Generate,
    RenderImage,
    FillEmpty,
    ToggleAssisted,
    Next,
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeChoice {
    Create,
    Existing,
    Quit,
}

/// Run the wizard until the user quits or a chat with the agent ends.
pub async fn run_wizard(state: &AppState, assisted: bool, json: bool) -> Result<()> {
    let mut wizard = state.wizard(assisted);

    if !state.can_sign {
        println!(
            "  {} No signing key set (AGENTMINT_PRIVATE_KEY); minting will fail.",
            style("!").yellow().bold()
        );
    }

    loop {
        match wizard.stage() {
            Stage::Home => match home_menu()? {
                HomeChoice::Create => {
                    let transition = with_spinner("Starting...", wizard.start()).await;
                    report_transition(transition);
                }
                HomeChoice::Existing => pick_existing(&mut wizard).await?,
                HomeChoice::Quit => return Ok(()),
            },
            Stage::Chat => break,
            stage => {
                print_stage(&wizard);
                let actions = actions_for(stage, wizard.is_assisted());
                let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
                let selection = Select::new().items(&labels).default(0).interact()?;

                if actions[selection].1 == Action::Quit {
                    return Ok(());
                }
                run_action(&mut wizard, actions[selection].1).await?;
            }
        }
    }

    let Some(record) = wizard.record() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_agent(record);
    }

    let session = wizard.open_chat()?;
    run_chat(session).await
}

fn home_menu() -> Result<HomeChoice> {
    let choices = [
        ("Create a new agent", HomeChoice::Create),
        ("Chat with an existing agent", HomeChoice::Existing),
        ("Quit", HomeChoice::Quit),
    ];
    let labels: Vec<&str> = choices.iter().map(|(label, _)| *label).collect();

    println!();
    let selection = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(choices[selection].1)
}

/// List the registry and jump to Chat with the chosen agent.
async fn pick_existing(wizard: &mut PersonaWizard) -> Result<()> {
    let agents = match with_spinner("Reading registry...", wizard.list_agents()).await {
        Ok(agents) => agents,
        Err(e) => {
            print_error(&e);
            return Ok(());
        }
    };

    if agents.is_empty() {
        println!("  {} No agents registered yet.", style("i").blue().bold());
        return Ok(());
    }

    println!("{}", agent_table(&agents));
    let mut labels: Vec<String> = agents
        .iter()
        .map(|a| format!("{} -- {}", a.name, style(&a.token_address).dim()))
        .collect();
    labels.push("< Back".to_string());

    let selection = Select::new().items(&labels).default(0).interact()?;
    let Some(agent) = agents.get(selection) else {
        return Ok(());
    };

    match with_spinner("Loading agent...", wizard.select_existing(&agent.token_address)).await {
        Ok(_) => {}
        Err(e) => print_error(&e),
    }
    Ok(())
}

async fn run_action(wizard: &mut PersonaWizard, action: Action) -> Result<()> {
    let outcome = match action {
        Action::Edit(field) => {
            let value: String = Input::new()
                .with_prompt(field_label(field))
                .with_initial_text(wizard.draft().get(field))
                .allow_empty(true)
                .interact_text()?;
            wizard.set_field(field, value)
        }
        Action::Generate => match wizard.stage() {
            Stage::Identity => with_spinner("Writing identity...", wizard.write_identity()).await,
            Stage::Visual => with_spinner("Writing image prompt...", wizard.write_image_prompt()).await,
            Stage::Details => with_spinner("Writing character sheet...", wizard.write_details()).await,
            Stage::Home | Stage::Chat => Ok(()),
        },
        Action::RenderImage => with_spinner("Rendering image...", wizard.render_image()).await,
        Action::FillEmpty => {
            let auto_fill = with_spinner("Filling empty fields...", wizard.auto_fill()).await;
            report_auto_fill(&auto_fill);
            Ok(())
        }
        Action::ToggleAssisted => {
            let assisted = !wizard.is_assisted();
            wizard.set_assisted(assisted);
            println!(
                "  {} Assisted mode {}",
                style("*").cyan(),
                if assisted { "on" } else { "off" }
            );
            Ok(())
        }
        Action::Next => {
            let message = if wizard.stage() == Stage::Details {
                "Minting agent..."
            } else {
                "Moving on..."
            };
            let transition = with_spinner(message, wizard.advance()).await;
            report_transition(transition);
            Ok(())
        }
        Action::Back => wizard.back().map(|_| ()),
        Action::Quit => Ok(()),
    };

    if let Err(e) = outcome {
        print_error(&e);
    }
    Ok(())
}

/// Menu entries for a wizard stage, in display order.
fn actions_for(stage: Stage, assisted: bool) -> Vec<(String, Action)> {
    let mut actions: Vec<(String, Action)> = editable_fields(stage)
        .iter()
        .map(|&field| (format!("Edit {}", field_label(field).to_lowercase()), Action::Edit(field)))
        .collect();

    match stage {
        Stage::Identity => actions.push(("Generate name and description".to_string(), Action::Generate)),
        Stage::Visual => {
            actions.push(("Generate image prompt".to_string(), Action::Generate));
            actions.push(("Render image".to_string(), Action::RenderImage));
        }
        Stage::Details => actions.push(("Generate character sheet".to_string(), Action::Generate)),
        Stage::Home | Stage::Chat => {}
    }

    actions.push(("Fill empty fields".to_string(), Action::FillEmpty));
    actions.push((
        format!("Assisted mode: {}", if assisted { "on" } else { "off" }),
        Action::ToggleAssisted,
    ));

    let next = if stage == Stage::Details { "Mint agent >" } else { "Next >" };
    actions.push((next.to_string(), Action::Next));
    actions.push(("< Back".to_string(), Action::Back));
    actions.push(("Quit".to_string(), Action::Quit));
    actions
}

fn editable_fields(stage: Stage) -> &'static [DraftField] {
    match stage {
        Stage::Visual => &[DraftField::ImagePrompt, DraftField::Image],
        other => other.required_fields(),
    }
}

fn field_label(field: DraftField) -> &'static str {
    match field {
        DraftField::Name => "Name",
        DraftField::Description => "Description",
        DraftField::ImagePrompt => "Image prompt",
        DraftField::Image => "Image URL",
        DraftField::Age => "Age",
        DraftField::Race => "Race",
        DraftField::Profession => "Profession",
        DraftField::Bio => "Bio",
        DraftField::FirstMessage => "First message",
    }
}

fn print_stage(wizard: &PersonaWizard) {
    let stage = wizard.stage();
    println!();
    println!(
        "{} {}",
        style(format!("--- Step {}/3:", stage.index())).cyan(),
        style(stage_title(stage)).cyan().bold()
    );

    for &field in editable_fields(stage) {
        let value = wizard.draft().get(field);
        let shown = if value.trim().is_empty() {
            style("(empty)".to_string()).dim()
        } else {
            style(value.to_string())
        };
        println!("  {:<14} {}", style(format!("{}:", field_label(field))).bold(), shown);
    }
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Home => "Home",
        Stage::Identity => "Identity",
        Stage::Visual => "Portrait",
        Stage::Details => "Character sheet",
        Stage::Chat => "Chat",
    }
}

fn report_transition(transition: Result<Transition, WizardError>) {
    match transition {
        Ok(transition) => report_auto_fill(&transition.auto_fill),
        Err(e) => print_error(&e),
    }
}

fn report_auto_fill(auto_fill: &AutoFill) {
    match auto_fill {
        AutoFill::Skipped => {}
        AutoFill::Filled(fields) => println!(
            "  {} Filled {}",
            style("✓").green().bold(),
            field_list(fields)
        ),
        AutoFill::Failed { filled, error } => {
            if !filled.is_empty() {
                println!("  {} Filled {}", style("✓").green().bold(), field_list(filled));
            }
            print_error(error);
        }
    }
}

fn field_list(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|&f| field_label(f).to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_error(error: &WizardError) {
    eprintln!("  {} {error}", style("✗").red().bold());
}

async fn with_spinner<T>(message: &str, future: impl std::future::Future<Output = T>) -> T {
    let spinner = spinner(message);
    let output = future.await;
    spinner.finish_and_clear();
    output
}
