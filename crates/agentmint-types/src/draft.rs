//! Wizard stages and the in-progress persona draft.
//!
//! A `Draft` is owned by the wizard until commit. Its fields only ever
//! accumulate: stage transitions never clear them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wizard stage. `Chat` is the committed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Home,
    Identity,
    Visual,
    Details,
    Chat,
}

impl Stage {
    /// Numeric position in the wizard (Home = 0, Chat = 4).
    pub fn index(self) -> u8 {
        match self {
            Stage::Home => 0,
            Stage::Identity => 1,
            Stage::Visual => 2,
            Stage::Details => 3,
            Stage::Chat => 4,
        }
    }

    /// The stage a forward transition leads to, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Home => Some(Stage::Identity),
            Stage::Identity => Some(Stage::Visual),
            Stage::Visual => Some(Stage::Details),
            Stage::Details => Some(Stage::Chat),
            Stage::Chat => None,
        }
    }

    /// The stage backward navigation leads to. Home and Chat have none.
    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::Identity => Some(Stage::Home),
            Stage::Visual => Some(Stage::Identity),
            Stage::Details => Some(Stage::Visual),
            Stage::Home | Stage::Chat => None,
        }
    }

    /// Fields that must be populated before leaving this stage forward.
    pub fn required_fields(self) -> &'static [DraftField] {
        match self {
            Stage::Identity => &[DraftField::Name, DraftField::Description],
            Stage::Visual => &[DraftField::Image],
            Stage::Details => &[
                DraftField::Age,
                DraftField::Race,
                DraftField::Profession,
                DraftField::Bio,
                DraftField::FirstMessage,
            ],
            Stage::Home | Stage::Chat => &[],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Home => write!(f, "home"),
            Stage::Identity => write!(f, "identity"),
            Stage::Visual => write!(f, "visual"),
            Stage::Details => write!(f, "details"),
            Stage::Chat => write!(f, "chat"),
        }
    }
}

/// An editable draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Description,
    ImagePrompt,
    Image,
    Age,
    Race,
    Profession,
    Bio,
    FirstMessage,
}

impl DraftField {
    pub const ALL: [DraftField; 9] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::ImagePrompt,
        DraftField::Image,
        DraftField::Age,
        DraftField::Race,
        DraftField::Profession,
        DraftField::Bio,
        DraftField::FirstMessage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Description => "description",
            DraftField::ImagePrompt => "image_prompt",
            DraftField::Image => "image",
            DraftField::Age => "age",
            DraftField::Race => "race",
            DraftField::Profession => "profession",
            DraftField::Bio => "bio",
            DraftField::FirstMessage => "first_message",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown draft field: '{s}'"))
    }
}

/// Work-in-progress persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub image_prompt: String,
    /// Rendered image URL.
    pub image: String,
    /// Free text as produced by the generator; normalized on commit.
    pub age: String,
    pub race: String,
    pub profession: String,
    pub bio: String,
    pub first_message: String,
    pub stage: Stage,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            image_prompt: String::new(),
            image: String::new(),
            age: String::new(),
            race: String::new(),
            profession: String::new(),
            bio: String::new(),
            first_message: String::new(),
            stage: Stage::Home,
        }
    }
}

impl Draft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Description => &self.description,
            DraftField::ImagePrompt => &self.image_prompt,
            DraftField::Image => &self.image,
            DraftField::Age => &self.age,
            DraftField::Race => &self.race,
            DraftField::Profession => &self.profession,
            DraftField::Bio => &self.bio,
            DraftField::FirstMessage => &self.first_message,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Description => self.description = value,
            DraftField::ImagePrompt => self.image_prompt = value,
            DraftField::Image => self.image = value,
            DraftField::Age => self.age = value,
            DraftField::Race => self.race = value,
            DraftField::Profession => self.profession = value,
            DraftField::Bio => self.bio = value,
            DraftField::FirstMessage => self.first_message = value,
        }
    }

    /// A field is populated when its trimmed value is non-empty.
    pub fn is_set(&self, field: DraftField) -> bool {
        !self.get(field).trim().is_empty()
    }

    /// Fill `field` only if it is still empty. Returns whether it was written.
    pub fn fill(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        if self.is_set(field) {
            return false;
        }
        self.set(field, value);
        true
    }

    /// Required fields of `stage` that are not yet populated, in declaration order.
    pub fn missing_for(&self, stage: Stage) -> Vec<DraftField> {
        stage
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.is_set(*field))
            .collect()
    }
}

/// Parse a free-text age into an unsigned integer.
///
/// Takes the first run of ASCII digits, so "27", "27 years" and
/// "about 300 years old" all parse. Returns `None` when there are no digits
/// or the number does not fit in a `u32`.
pub fn normalize_age(raw: &str) -> Option<u32> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
