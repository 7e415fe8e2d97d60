//! Structured output shapes for persona generation.
//!
//! Each shape is decoded with `deny_unknown_fields` so that a payload with
//! extra keys fails the same way it would fail strict schema validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::strict_schema_for;

/// A structured output shape: its schema name and strict JSON schema.
pub trait OutputShape: JsonSchema + for<'de> Deserialize<'de> {
    /// Name sent as `json_schema.name`.
    const SCHEMA_NAME: &'static str;

    fn schema() -> serde_json::Value {
        strict_schema_for::<Self>()
    }
}

/// Name and short description of a fictional character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CharacterIdentity {
    pub name: String,
    pub description: String,
}

impl OutputShape for CharacterIdentity {
    const SCHEMA_NAME: &'static str = "fictional_character";
}

/// Comma-separated image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ImagePromptOutput {
    pub image_prompt: String,
}

impl OutputShape for ImagePromptOutput {
    const SCHEMA_NAME: &'static str = "image_prompt";
}

/// Remaining character sheet. Age stays free text here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CharacterDetails {
    pub age: String,
    pub race: String,
    pub profession: String,
    pub bio: String,
    pub first_message: String,
}

impl OutputShape for CharacterDetails {
    const SCHEMA_NAME: &'static str = "character_details";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_schema_requires_every_field() {
        let schema = CharacterDetails::schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        for key in ["age", "race", "profession", "bio", "firstMessage"] {
            assert!(required.contains(&key), "missing {key}");
        }
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn extra_keys_are_rejected() {
        let value = serde_json::json!({"name": "Nyra", "description": "a bard", "mood": "sly"});
        assert!(serde_json::from_value::<CharacterIdentity>(value).is_err());
    }

    #[test]
    fn image_prompt_uses_camel_case_key() {
        let parsed: ImagePromptOutput =
            serde_json::from_str(r#"{"imagePrompt":"1girl, bard, lute"}"#).unwrap();
        assert_eq!(parsed.image_prompt, "1girl, bard, lute");
    }
}
