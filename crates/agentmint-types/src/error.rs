use thiserror::Error;

use crate::draft::{DraftField, Stage};

/// Errors from the text generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("model refused: {0}")]
    Refusal(String),

    #[error("response does not match schema: {0}")]
    SchemaParse(String),

    #[error("model returned an empty reply")]
    EmptyReply,
}

impl GenerationError {
    /// Whether the failure happened before a model response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport(_)
                | GenerationError::AuthenticationFailed
                | GenerationError::RateLimited
        )
    }
}

/// Errors from the image job backend.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("image job carries no nested jobs")]
    NoNestedJobs,

    #[error("no nested job has an available asset")]
    AssetUnavailable,

    #[error("image job still scheduled but no token to poll with")]
    MissingToken,

    #[error("image job not finished after {attempts} polls")]
    Timeout { attempts: u32 },
}

/// Errors from the chain client.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Transport(String),

    #[error("no signing key configured")]
    NoSigner,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("invalid address: '{0}'")]
    InvalidAddress(String),

    #[error("abi error: {0}")]
    Abi(String),

    #[error("log does not decode as AgentCreated: {0}")]
    Decode(String),
}

/// Errors from registering or reading agents.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("age '{0}' is not a whole number")]
    InvalidAge(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("transaction {tx_hash} failed")]
    TransactionFailed { tx_hash: String },

    #[error("transaction {tx_hash} not mined after {attempts} polls")]
    ConfirmationTimeout { tx_hash: String, attempts: u32 },

    #[error("no AgentCreated event in receipt of {tx_hash}")]
    DeployedAddressNotFound { tx_hash: String },

    #[error("agent not found: {0}")]
    NotFound(String),
}

/// Errors from wizard operations.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("cannot leave {stage} stage, missing: {}", join_fields(fields))]
    MissingFields {
        stage: Stage,
        fields: Vec<DraftField>,
    },

    #[error("cannot {action} from {stage} stage")]
    InvalidTransition { stage: Stage, action: &'static str },

    #[error("agent already committed")]
    AlreadyCommitted,

    #[error("image prompt is empty")]
    MissingImagePrompt,

    #[error("text generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("image generation failed: {0}")]
    Image(#[from] ImageError),

    #[error("registration failed: {0}")]
    Registrar(#[from] RegistrarError),
}

/// Errors from a chat session.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a reply is already pending")]
    Busy,

    #[error("reply failed: {0}")]
    Generation(#[from] GenerationError),
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
