//! Credentials and endpoints read from the environment.
//!
//! None of these are ever written to `config.toml`. Secret values are wrapped
//! in [`SecretString`] as soon as they are read.

use secrecy::SecretString;
use thiserror::Error;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const CIVITAI_API_TOKEN: &str = "CIVITAI_API_TOKEN";
pub const RPC_URL: &str = "AGENTMINT_RPC_URL";
pub const CONTRACT_ADDRESS: &str = "AGENTMINT_CONTRACT_ADDRESS";
pub const PRIVATE_KEY: &str = "AGENTMINT_PRIVATE_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

/// Everything the services need that does not belong in a config file.
///
/// `private_key` is optional: without it the registry is read-only.
#[derive(Debug)]
pub struct Credentials {
    pub openai_api_key: SecretString,
    pub civitai_api_token: SecretString,
    pub rpc_url: String,
    pub contract_address: String,
    pub private_key: Option<SecretString>,
}

impl Credentials {
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve every variable through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(CredentialError::Missing(name));

        Ok(Self {
            openai_api_key: SecretString::from(require(OPENAI_API_KEY)?),
            civitai_api_token: SecretString::from(require(CIVITAI_API_TOKEN)?),
            rpc_url: require(RPC_URL)?,
            contract_address: require(CONTRACT_ADDRESS)?,
            private_key: get(PRIVATE_KEY).map(SecretString::from),
        })
    }
}
