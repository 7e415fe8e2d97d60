//! Application state wiring the services together.
//!
//! Pins the core ports to the infra implementations: OpenAI for text,
//! Civitai for images, the EVM registry for the chain.

use std::sync::Arc;

use anyhow::Context;

use agentmint_core::chain::provider::BoxAgentChain;
use agentmint_core::chain::registrar::Registrar;
use agentmint_core::chat::session::ChatSession;
use agentmint_core::image::client::ImageClient;
use agentmint_core::image::provider::BoxImageGenerator;
use agentmint_core::llm::box_provider::BoxTextGenerator;
use agentmint_core::wizard::machine::{PersonaWizard, WizardSettings};
use agentmint_infra::chain::client::EthersAgentChain;
use agentmint_infra::config::{load_config, resolve_config_dir};
use agentmint_infra::credentials::Credentials;
use agentmint_infra::image::civitai::CivitaiImageGenerator;
use agentmint_infra::llm::openai::OpenAiTextGenerator;
use agentmint_types::agent::AgentRecord;
use agentmint_types::config::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    pub text: Arc<BoxTextGenerator>,
    pub image: Arc<ImageClient>,
    pub registrar: Arc<Registrar>,
    /// Whether a signing key is configured; without one minting fails.
    pub can_sign: bool,
}

impl AppState {
    /// Load config and credentials, then build the service clients.
    pub async fn init() -> anyhow::Result<Self> {
        let config_dir = resolve_config_dir();
        let config = load_config(&config_dir).await;
        let credentials = Credentials::from_env().context("missing credentials")?;

        let text = OpenAiTextGenerator::new(&credentials.openai_api_key, &config.text)
            .context("failed to create OpenAI client")?;

        let image = CivitaiImageGenerator::new(credentials.civitai_api_token, config.image.base_url.clone())
            .context("failed to create Civitai client")?;

        let chain = EthersAgentChain::new(
            &credentials.rpc_url,
            &credentials.contract_address,
            credentials.private_key.as_ref(),
            config.chain.chain_id,
        )
        .context("failed to create registry client")?;
        let can_sign = chain.signer_address().is_some();

        tracing::debug!(
            config_dir = %config_dir.display(),
            contract = %chain.contract(),
            can_sign,
            "services initialized"
        );

        Ok(Self {
            text: Arc::new(BoxTextGenerator::new(text)),
            image: Arc::new(ImageClient::new(
                BoxImageGenerator::new(image),
                config.image.model.clone(),
                config.image.poll,
            )),
            registrar: Arc::new(Registrar::new(
                BoxAgentChain::new(chain),
                config.chain.receipt_poll,
            )),
            can_sign,
            config,
        })
    }

    /// A fresh wizard. `assisted` forces assisted mode on; config can too.
    pub fn wizard(&self, assisted: bool) -> PersonaWizard {
        let mut settings = WizardSettings::from_config(&self.config);
        settings.assisted |= assisted;
        PersonaWizard::new(
            Arc::clone(&self.text),
            Arc::clone(&self.image),
            Arc::clone(&self.registrar),
            settings,
        )
    }

    pub fn chat(&self, agent: AgentRecord) -> ChatSession {
        ChatSession::new(agent, Arc::clone(&self.text))
    }
}
