//! On-chain agent records and the transaction shapes around them.

use serde::{Deserialize, Serialize};

/// A committed agent as known to the registry contract.
///
/// `description` and `image_prompt` are not stored on chain. They are carried
/// over from the draft when the record comes from a fresh registration and are
/// empty when the record is read back from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_prompt: String,
    pub image: String,
    pub age: u32,
    pub race: String,
    pub profession: String,
    pub bio: String,
    pub first_message: String,
    /// Deployed agent address, the record's unique identifier.
    pub token_address: String,
    pub creator: String,
}

/// Arguments of the `createAgent` contract call, in ABI order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgentArgs {
    pub name: String,
    pub age: u32,
    pub race: String,
    pub profession: String,
    pub bio: String,
    pub first_message: String,
    pub image: String,
}

/// Decoded `AgentCreated` event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCreatedEvent {
    pub name: String,
    pub age: u32,
    pub race: String,
    pub profession: String,
    pub bio: String,
    pub first_message: String,
    pub image: String,
    pub token_address: String,
    pub creator: String,
}

impl AgentCreatedEvent {
    /// Build the full record, attaching the off-chain draft fields.
    pub fn into_record(self, description: String, image_prompt: String) -> AgentRecord {
        AgentRecord {
            name: self.name,
            description,
            image_prompt,
            image: self.image,
            age: self.age,
            race: self.race,
            profession: self.profession,
            bio: self.bio,
            first_message: self.first_message,
            token_address: self.token_address,
            creator: self.creator,
        }
    }
}

/// A raw event log, hex-encoded as returned by JSON-RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// A mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    /// `false` when the transaction reverted.
    pub succeeded: bool,
    pub block_number: Option<u64>,
    pub logs: Vec<TxLog>,
}
