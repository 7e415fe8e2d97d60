//! AgentChain trait: the registry contract as seen by the registrar.

use std::future::Future;
use std::pin::Pin;

use agentmint_types::agent::{AgentCreatedEvent, AgentRecord, CreateAgentArgs, TxLog, TxReceipt};
use agentmint_types::error::ChainError;

/// Access to the agent registry contract.
///
/// Implementations live in agentmint-infra (`EthersAgentChain`).
pub trait AgentChain: Send + Sync {
    fn name(&self) -> &str;

    /// Sign and broadcast `createAgent`. Returns the transaction hash.
    fn submit_create_agent(
        &self,
        args: &CreateAgentArgs,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;

    /// The receipt of `tx_hash`, or `None` while it is not yet mined.
    fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> impl Future<Output = Result<Option<TxReceipt>, ChainError>> + Send;

    /// Decode one log as an `AgentCreated` event.
    fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError>;

    /// Every registered agent.
    fn list_agents(&self) -> impl Future<Output = Result<Vec<AgentRecord>, ChainError>> + Send;

    /// The agent deployed at `address`, if any.
    fn agent_by_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<AgentRecord>, ChainError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`AgentChain`] with boxed futures.
pub trait AgentChainDyn: Send + Sync {
    fn name(&self) -> &str;

    fn submit_create_agent_boxed<'a>(
        &'a self,
        args: &'a CreateAgentArgs,
    ) -> BoxFuture<'a, Result<String, ChainError>>;

    fn transaction_receipt_boxed<'a>(
        &'a self,
        tx_hash: &'a str,
    ) -> BoxFuture<'a, Result<Option<TxReceipt>, ChainError>>;

    fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError>;

    fn list_agents_boxed(&self) -> BoxFuture<'_, Result<Vec<AgentRecord>, ChainError>>;

    fn agent_by_address_boxed<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Option<AgentRecord>, ChainError>>;
}

impl<T: AgentChain> AgentChainDyn for T {
    fn name(&self) -> &str {
        AgentChain::name(self)
    }

    fn submit_create_agent_boxed<'a>(
        &'a self,
        args: &'a CreateAgentArgs,
    ) -> BoxFuture<'a, Result<String, ChainError>> {
        Box::pin(self.submit_create_agent(args))
    }

    fn transaction_receipt_boxed<'a>(
        &'a self,
        tx_hash: &'a str,
    ) -> BoxFuture<'a, Result<Option<TxReceipt>, ChainError>> {
        Box::pin(self.transaction_receipt(tx_hash))
    }

    fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError> {
        AgentChain::decode_agent_created(self, log)
    }

    fn list_agents_boxed(&self) -> BoxFuture<'_, Result<Vec<AgentRecord>, ChainError>> {
        Box::pin(self.list_agents())
    }

    fn agent_by_address_boxed<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Option<AgentRecord>, ChainError>> {
        Box::pin(self.agent_by_address(address))
    }
}

/// Type-erased chain client.
pub struct BoxAgentChain {
    inner: Box<dyn AgentChainDyn + Send + Sync>,
}

impl BoxAgentChain {
    pub fn new<T: AgentChain + 'static>(chain: T) -> Self {
        Self {
            inner: Box::new(chain),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn submit_create_agent(&self, args: &CreateAgentArgs) -> Result<String, ChainError> {
        self.inner.submit_create_agent_boxed(args).await
    }

    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainError> {
        self.inner.transaction_receipt_boxed(tx_hash).await
    }

    pub fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError> {
        self.inner.decode_agent_created(log)
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>, ChainError> {
        self.inner.list_agents_boxed().await
    }

    pub async fn agent_by_address(&self, address: &str) -> Result<Option<AgentRecord>, ChainError> {
        self.inner.agent_by_address_boxed(address).await
    }
}
