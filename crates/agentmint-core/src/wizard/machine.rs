//! PersonaWizard -- the stage machine that owns the draft.
//!
//! Home -> Identity -> Visual -> Details -> Chat, with a side entry into Chat
//! for agents that already exist on chain. Forward moves are gated by the
//! required fields of the stage being left; leaving Details commits through
//! the registrar.
//!
//! Every operation takes `&mut self`, so one wizard never has two requests
//! in flight. Draft writes happen only after a call succeeds, so an error or
//! a dropped future leaves the draft as it was.

use std::sync::Arc;

use tracing::{info, warn};

use agentmint_types::agent::AgentRecord;
use agentmint_types::config::AppConfig;
use agentmint_types::draft::{Draft, DraftField, Stage};
use agentmint_types::error::WizardError;
use agentmint_types::image::SamplingParams;
use agentmint_types::persona::{CharacterDetails, CharacterIdentity, ImagePromptOutput};

use crate::chain::registrar::Registrar;
use crate::chat::session::ChatSession;
use crate::image::client::ImageClient;
use crate::llm::box_provider::BoxTextGenerator;

use super::prompt;

/// Wizard behaviour that comes from configuration.
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub assisted: bool,
    pub prompt_prefix: String,
    pub negative_prompt: String,
    pub sampling: SamplingParams,
}

impl WizardSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            assisted: config.assisted,
            prompt_prefix: config.image.prompt_prefix.clone(),
            negative_prompt: config.image.negative_prompt.clone(),
            sampling: config.image.sampling.clone(),
        }
    }
}

/// What assisted mode did on stage entry.
#[derive(Debug)]
pub enum AutoFill {
    /// Not assisted, or nothing left to fill.
    Skipped,
    Filled(Vec<DraftField>),
    /// A generation failed. `filled` lists what earlier steps of the same
    /// entry already wrote; the failing step wrote nothing.
    Failed {
        filled: Vec<DraftField>,
        error: WizardError,
    },
}

/// Result of a successful stage change.
#[derive(Debug)]
pub struct Transition {
    pub stage: Stage,
    pub auto_fill: AutoFill,
}

pub struct PersonaWizard {
    text: Arc<BoxTextGenerator>,
    image: Arc<ImageClient>,
    registrar: Arc<Registrar>,
    settings: WizardSettings,
    draft: Draft,
    record: Option<AgentRecord>,
}

impl PersonaWizard {
    pub fn new(
        text: Arc<BoxTextGenerator>,
        image: Arc<ImageClient>,
        registrar: Arc<Registrar>,
        settings: WizardSettings,
    ) -> Self {
        Self {
            text,
            image,
            registrar,
            settings,
            draft: Draft::default(),
            record: None,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn stage(&self) -> Stage {
        self.draft.stage
    }

    /// The committed or selected agent, once the wizard reached Chat.
    pub fn record(&self) -> Option<&AgentRecord> {
        self.record.as_ref()
    }

    pub fn is_assisted(&self) -> bool {
        self.settings.assisted
    }

    /// Toggle assisted mode. Takes effect on the next stage entry.
    pub fn set_assisted(&mut self, assisted: bool) {
        self.settings.assisted = assisted;
    }

    /// Home -> Identity.
    pub async fn start(&mut self) -> Result<Transition, WizardError> {
        if self.stage() != Stage::Home {
            return Err(self.invalid("start"));
        }
        Ok(self.enter(Stage::Identity).await)
    }

    /// Move forward one stage if the current stage's required fields are set.
    ///
    /// From Details this commits the draft on chain and moves to Chat; a
    /// failed commit leaves the wizard in Details with the draft untouched.
    pub async fn advance(&mut self) -> Result<Transition, WizardError> {
        let stage = self.stage();
        let next = stage.next().ok_or_else(|| self.invalid("advance"))?;
        if stage == Stage::Home {
            return self.start().await;
        }

        let missing = self.draft.missing_for(stage);
        if !missing.is_empty() {
            return Err(WizardError::MissingFields {
                stage,
                fields: missing,
            });
        }

        if next == Stage::Chat {
            return self.commit().await;
        }
        Ok(self.enter(next).await)
    }

    /// Move back one stage. Fields are kept.
    pub fn back(&mut self) -> Result<Stage, WizardError> {
        let previous = self.stage().previous().ok_or_else(|| self.invalid("go back"))?;
        info!(from = %self.stage(), to = %previous, "wizard stage back");
        self.draft.stage = previous;
        Ok(previous)
    }

    /// Manually edit a field. Rejected once committed.
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), WizardError> {
        if self.stage() == Stage::Chat {
            return Err(WizardError::AlreadyCommitted);
        }
        self.draft.set(field, value);
        Ok(())
    }

    /// Jump straight to Chat with an agent that already exists on chain.
    pub async fn select_existing(&mut self, address: &str) -> Result<&AgentRecord, WizardError> {
        if self.stage() == Stage::Chat {
            return Err(WizardError::AlreadyCommitted);
        }
        let record = self.registrar.get_by_address(address).await?;
        info!(token_address = %record.token_address, from = %self.stage(), "selected existing agent");
        self.draft.stage = Stage::Chat;
        Ok(self.record.insert(record))
    }

    /// Every agent in the registry, for the selection listing.
    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>, WizardError> {
        Ok(self.registrar.list_all().await?)
    }

    /// Open a chat with the committed or selected agent.
    pub fn open_chat(&self) -> Result<ChatSession, WizardError> {
        let record = self.record.clone().ok_or_else(|| self.invalid("open chat"))?;
        Ok(ChatSession::new(record, Arc::clone(&self.text)))
    }

    /// Regenerate name and description, overwriting both.
    pub async fn write_identity(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::Identity, "write identity")?;
        let identity = self.generate_identity().await?;
        self.draft.name = identity.name;
        self.draft.description = identity.description;
        Ok(())
    }

    /// Regenerate the image prompt, overwriting it.
    pub async fn write_image_prompt(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::Visual, "write image prompt")?;
        self.draft.image_prompt = self.generate_image_prompt().await?;
        Ok(())
    }

    /// Render the current image prompt, overwriting the image.
    pub async fn render_image(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::Visual, "render image")?;
        if !self.draft.is_set(DraftField::ImagePrompt) {
            return Err(WizardError::MissingImagePrompt);
        }
        self.draft.image = self.generate_image().await?;
        Ok(())
    }

    /// Regenerate the character sheet, overwriting all five fields.
    pub async fn write_details(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::Details, "write details")?;
        let details = self.generate_details().await?;
        self.draft.age = details.age;
        self.draft.race = details.race;
        self.draft.profession = details.profession;
        self.draft.bio = details.bio;
        self.draft.first_message = details.first_message;
        Ok(())
    }

    /// Fill whatever is still empty in the current stage, regardless of the
    /// assisted flag. Never overwrites.
    pub async fn auto_fill(&mut self) -> AutoFill {
        let mut filled = Vec::new();
        let result = match self.stage() {
            Stage::Identity => self.fill_identity(&mut filled).await,
            Stage::Visual => self.fill_visual(&mut filled).await,
            Stage::Details => self.fill_details(&mut filled).await,
            Stage::Home | Stage::Chat => Ok(()),
        };

        match result {
            Err(error) => {
                warn!(stage = %self.stage(), "auto-fill failed: {error}");
                AutoFill::Failed { filled, error }
            }
            Ok(()) if filled.is_empty() => AutoFill::Skipped,
            Ok(()) => {
                info!(stage = %self.stage(), fields = filled.len(), "auto-filled draft");
                AutoFill::Filled(filled)
            }
        }
    }

    async fn enter(&mut self, stage: Stage) -> Transition {
        info!(from = %self.stage(), to = %stage, "wizard stage advance");
        self.draft.stage = stage;
        let auto_fill = if self.settings.assisted {
            self.auto_fill().await
        } else {
            AutoFill::Skipped
        };
        Transition { stage, auto_fill }
    }

    async fn commit(&mut self) -> Result<Transition, WizardError> {
        let record = self.registrar.register(&self.draft).await?;
        info!(token_address = %record.token_address, "draft committed");
        self.draft.stage = Stage::Chat;
        self.record = Some(record);
        Ok(Transition {
            stage: Stage::Chat,
            auto_fill: AutoFill::Skipped,
        })
    }

    async fn fill_identity(&mut self, filled: &mut Vec<DraftField>) -> Result<(), WizardError> {
        if self.draft.missing_for(Stage::Identity).is_empty() {
            return Ok(());
        }
        let identity = self.generate_identity().await?;
        self.fill(DraftField::Name, identity.name, filled);
        self.fill(DraftField::Description, identity.description, filled);
        Ok(())
    }

    async fn fill_visual(&mut self, filled: &mut Vec<DraftField>) -> Result<(), WizardError> {
        if !self.draft.is_set(DraftField::ImagePrompt) {
            let image_prompt = self.generate_image_prompt().await?;
            self.fill(DraftField::ImagePrompt, image_prompt, filled);
        }
        if !self.draft.is_set(DraftField::Image) && self.draft.is_set(DraftField::ImagePrompt) {
            let image = self.generate_image().await?;
            self.fill(DraftField::Image, image, filled);
        }
        Ok(())
    }

    async fn fill_details(&mut self, filled: &mut Vec<DraftField>) -> Result<(), WizardError> {
        if self.draft.missing_for(Stage::Details).is_empty() {
            return Ok(());
        }
        let details = self.generate_details().await?;
        self.fill(DraftField::Age, details.age, filled);
        self.fill(DraftField::Race, details.race, filled);
        self.fill(DraftField::Profession, details.profession, filled);
        self.fill(DraftField::Bio, details.bio, filled);
        self.fill(DraftField::FirstMessage, details.first_message, filled);
        Ok(())
    }

    fn fill(&mut self, field: DraftField, value: String, filled: &mut Vec<DraftField>) {
        if self.draft.fill(field, value) {
            filled.push(field);
        }
    }

    async fn generate_identity(&self) -> Result<CharacterIdentity, WizardError> {
        Ok(self
            .text
            .generate::<CharacterIdentity>(prompt::IDENTITY_SYSTEM, prompt::IDENTITY_USER)
            .await?)
    }

    async fn generate_image_prompt(&self) -> Result<String, WizardError> {
        let output = self
            .text
            .generate::<ImagePromptOutput>(
                prompt::IMAGE_PROMPT_SYSTEM,
                &prompt::image_prompt_user(&self.draft),
            )
            .await?;
        Ok(output.image_prompt)
    }

    async fn generate_image(&self) -> Result<String, WizardError> {
        let rendered = prompt::render_prompt(&self.settings.prompt_prefix, &self.draft.image_prompt);
        Ok(self
            .image
            .generate_image(&rendered, &self.settings.negative_prompt, &self.settings.sampling)
            .await?)
    }

    async fn generate_details(&self) -> Result<CharacterDetails, WizardError> {
        Ok(self
            .text
            .generate::<CharacterDetails>(prompt::DETAILS_SYSTEM, &prompt::details_user(&self.draft))
            .await?)
    }

    fn require_stage(&self, stage: Stage, action: &'static str) -> Result<(), WizardError> {
        if self.stage() == stage {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            stage: self.stage(),
            action,
        }
    }
}
