//! Prompts for each generation step and the chat preamble.

use agentmint_types::agent::AgentRecord;
use agentmint_types::draft::Draft;

pub const IDENTITY_SYSTEM: &str = "You are an AI writer. Create a fictional character. \
Return the result as a JSON object that strictly follows the provided JSON schema.";

pub const IDENTITY_USER: &str = "Please generate a fictional character with a name and description.";

pub const IMAGE_PROMPT_SYSTEM: &str = "You are an AI writer. Generate an image prompt for a \
fictional character. The image prompt should be a concise, descriptive sentence suitable for \
image generation.";

pub const DETAILS_SYSTEM: &str = "You are an AI writer. Using the provided character details, \
generate additional character information.";

pub fn image_prompt_user(draft: &Draft) -> String {
    format!(
        "Generate an image prompt of simple 1-2 word comma-separated phrases for a fictional \
character, starting with gender (1girl or 1boy) with the name \"{}\" and description \"{}\".",
        draft.name.trim(),
        draft.description.trim()
    )
}

pub fn details_user(draft: &Draft) -> String {
    format!(
        "Generate additional details for a fictional character with the following details:\n\
Name: \"{}\"\n\
Description: \"{}\"\n\
Image Prompt: \"{}\"",
        draft.name.trim(),
        draft.description.trim(),
        draft.image_prompt.trim()
    )
}

/// The prompt actually rendered: quality prefix followed by the draft prompt.
pub fn render_prompt(prefix: &str, image_prompt: &str) -> String {
    format!("{prefix}{}", image_prompt.trim())
}

/// System preamble seeding a chat with `agent`. Lines for empty fields are omitted.
pub fn chat_preamble(agent: &AgentRecord) -> String {
    let age = agent.age.to_string();
    let lines = [
        ("Name", agent.name.as_str()),
        ("Description", agent.description.as_str()),
        ("Age", age.as_str()),
        ("Race", agent.race.as_str()),
        ("Profession", agent.profession.as_str()),
        ("Bio", agent.bio.as_str()),
        ("Image Prompt", agent.image_prompt.as_str()),
    ];

    let mut preamble =
        String::from("Continue roleplaying as a fictional character with the following details:");
    for (label, value) in lines {
        let value = value.trim();
        if !value.is_empty() {
            preamble.push('\n');
            preamble.push_str(label);
            preamble.push_str(": ");
            preamble.push_str(value);
        }
    }
    preamble
}
