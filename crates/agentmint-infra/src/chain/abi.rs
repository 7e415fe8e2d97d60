//! AgentRegistry ABI: calldata encoding, return value and event decoding.

use std::str::FromStr;

use ethers::abi::{Abi, Event, Function, RawLog, Token};
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;

use agentmint_types::agent::{AgentCreatedEvent, AgentRecord, CreateAgentArgs, TxLog};
use agentmint_types::error::ChainError;

const REGISTRY_ABI: &str = include_str!("../../abi/AgentRegistry.json");

/// Parsed registry ABI.
#[derive(Debug, Clone)]
pub struct RegistryAbi {
    abi: Abi,
}

impl RegistryAbi {
    pub fn load() -> Result<Self, ChainError> {
        let abi: Abi = serde_json::from_str(REGISTRY_ABI)
            .map_err(|e| ChainError::Abi(format!("invalid registry ABI: {e}")))?;
        Ok(Self { abi })
    }

    fn function(&self, name: &str) -> Result<&Function, ChainError> {
        self.abi
            .function(name)
            .map_err(|e| ChainError::Abi(format!("{name}: {e}")))
    }

    fn agent_created(&self) -> Result<&Event, ChainError> {
        self.abi
            .event("AgentCreated")
            .map_err(|e| ChainError::Abi(format!("AgentCreated: {e}")))
    }

    pub fn encode_create_agent(&self, args: &CreateAgentArgs) -> Result<Vec<u8>, ChainError> {
        self.function("createAgent")?
            .encode_input(&[
                Token::String(args.name.clone()),
                Token::Uint(U256::from(args.age)),
                Token::String(args.race.clone()),
                Token::String(args.profession.clone()),
                Token::String(args.bio.clone()),
                Token::String(args.first_message.clone()),
                Token::String(args.image.clone()),
            ])
            .map_err(|e| ChainError::Abi(format!("createAgent: {e}")))
    }

    pub fn encode_list_all(&self) -> Result<Vec<u8>, ChainError> {
        self.function("listAll")?
            .encode_input(&[])
            .map_err(|e| ChainError::Abi(format!("listAll: {e}")))
    }

    pub fn encode_get_by_address(&self, address: Address) -> Result<Vec<u8>, ChainError> {
        self.function("getByAddress")?
            .encode_input(&[Token::Address(address)])
            .map_err(|e| ChainError::Abi(format!("getByAddress: {e}")))
    }

    pub fn decode_list_all(&self, output: &[u8]) -> Result<Vec<AgentRecord>, ChainError> {
        let mut tokens = self
            .function("listAll")?
            .decode_output(output)
            .map_err(|e| ChainError::Decode(format!("listAll output: {e}")))?;

        let Some(Token::Array(items)) = tokens.pop() else {
            return Err(ChainError::Decode("listAll did not return an array".to_string()));
        };

        items
            .into_iter()
            .map(|item| match item {
                Token::Tuple(fields) => agent_from_tokens(fields).map(into_chain_record),
                other => Err(ChainError::Decode(format!("expected Agent tuple, got {other:?}"))),
            })
            .collect()
    }

    /// `None` when the contract returns the zero agent for an unknown address.
    pub fn decode_get_by_address(&self, output: &[u8]) -> Result<Option<AgentRecord>, ChainError> {
        let mut tokens = self
            .function("getByAddress")?
            .decode_output(output)
            .map_err(|e| ChainError::Decode(format!("getByAddress output: {e}")))?;

        let Some(Token::Tuple(fields)) = tokens.pop() else {
            return Err(ChainError::Decode("getByAddress did not return a tuple".to_string()));
        };

        let event = agent_from_tokens(fields)?;
        if event.token_address == format_address(Address::zero()) {
            return Ok(None);
        }
        Ok(Some(into_chain_record(event)))
    }

    /// Decode one receipt log. Fails for logs of any other event.
    pub fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError> {
        let topics = log
            .topics
            .iter()
            .map(|t| H256::from_str(t).map_err(|e| ChainError::Decode(format!("topic '{t}': {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        let data = hex::decode(log.data.trim_start_matches("0x"))
            .map_err(|e| ChainError::Decode(format!("log data: {e}")))?;

        let parsed = self
            .agent_created()?
            .parse_log(RawLog { topics, data })
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        agent_from_tokens(parsed.params.into_iter().map(|p| p.value).collect())
    }
}

/// Parse a `0x`-prefixed hex address.
pub fn parse_address(address: &str) -> Result<Address, ChainError> {
    Address::from_str(address.trim()).map_err(|_| ChainError::InvalidAddress(address.to_string()))
}

/// EIP-55 checksummed form.
pub fn format_address(address: Address) -> String {
    to_checksum(&address, None)
}

/// Agent fields in ABI order:
/// name, age, race, profession, bio, firstMessage, image, tokenAddress, creator.
fn agent_from_tokens(tokens: Vec<Token>) -> Result<AgentCreatedEvent, ChainError> {
    let [name, age, race, profession, bio, first_message, image, token_address, creator]: [Token; 9] =
        tokens
            .try_into()
            .map_err(|t: Vec<Token>| ChainError::Decode(format!("expected 9 agent fields, got {}", t.len())))?;

    Ok(AgentCreatedEvent {
        name: string_token(name, "name")?,
        age: age_token(age)?,
        race: string_token(race, "race")?,
        profession: string_token(profession, "profession")?,
        bio: string_token(bio, "bio")?,
        first_message: string_token(first_message, "firstMessage")?,
        image: string_token(image, "image")?,
        token_address: address_token(token_address, "tokenAddress")?,
        creator: address_token(creator, "creator")?,
    })
}

fn into_chain_record(event: AgentCreatedEvent) -> AgentRecord {
    event.into_record(String::new(), String::new())
}

fn string_token(token: Token, field: &str) -> Result<String, ChainError> {
    token
        .into_string()
        .ok_or_else(|| ChainError::Decode(format!("{field} is not a string")))
}

fn address_token(token: Token, field: &str) -> Result<String, ChainError> {
    token
        .into_address()
        .map(format_address)
        .ok_or_else(|| ChainError::Decode(format!("{field} is not an address")))
}

fn age_token(token: Token) -> Result<u32, ChainError> {
    let age = token
        .into_uint()
        .ok_or_else(|| ChainError::Decode("age is not a uint".to_string()))?;
    if age > U256::from(u32::MAX) {
        return Err(ChainError::Decode(format!("age {age} out of range")));
    }
    Ok(age.as_u32())
}
