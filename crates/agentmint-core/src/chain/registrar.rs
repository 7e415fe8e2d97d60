//! Registrar: commit a draft on chain and read agents back.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use agentmint_types::agent::{AgentCreatedEvent, AgentRecord, CreateAgentArgs, TxLog, TxReceipt};
use agentmint_types::config::PollPolicy;
use agentmint_types::draft::{Draft, normalize_age};
use agentmint_types::error::RegistrarError;

use super::provider::BoxAgentChain;

pub struct Registrar {
    chain: BoxAgentChain,
    receipt_poll: PollPolicy,
    /// Submitted but not yet confirmed `createAgent`, kept across a timeout.
    pending: Mutex<Option<PendingCreate>>,
}

struct PendingCreate {
    args: CreateAgentArgs,
    tx_hash: String,
}

impl Registrar {
    pub fn new(chain: BoxAgentChain, receipt_poll: PollPolicy) -> Self {
        Self {
            chain,
            receipt_poll,
            pending: Mutex::new(None),
        }
    }

    /// Submit `createAgent` for `draft`, wait for it to be mined, and return
    /// the record built from its `AgentCreated` event.
    ///
    /// The draft is only read. If the receipt does not show up within the
    /// poll bound, the transaction hash is kept: calling again with the same
    /// draft resumes polling that hash instead of sending a second
    /// `createAgent`. A different draft is submitted and replaces it.
    pub async fn register(&self, draft: &Draft) -> Result<AgentRecord, RegistrarError> {
        let args = create_args(draft)?;
        let mut pending = self.pending.lock().await;

        let tx_hash = match pending.as_ref() {
            Some(p) if p.args == args => {
                info!(tx_hash = %p.tx_hash, name = %args.name, "resuming pending createAgent");
                p.tx_hash.clone()
            }
            _ => {
                let tx_hash = self.chain.submit_create_agent(&args).await?;
                info!(chain = self.chain.name(), tx_hash = %tx_hash, name = %args.name, "createAgent submitted");
                *pending = Some(PendingCreate {
                    args: args.clone(),
                    tx_hash: tx_hash.clone(),
                });
                tx_hash
            }
        };

        // Still pending on timeout or a transport error while polling.
        let receipt = self.wait_for_receipt(&tx_hash).await?;
        *pending = None;

        if !receipt.succeeded {
            warn!(tx_hash = %tx_hash, "createAgent reverted");
            return Err(RegistrarError::TransactionFailed { tx_hash });
        }

        let event = self
            .find_agent_created(&receipt.logs)
            .ok_or_else(|| RegistrarError::DeployedAddressNotFound {
                tx_hash: tx_hash.clone(),
            })?;

        info!(tx_hash = %tx_hash, token_address = %event.token_address, "agent registered");
        Ok(event.into_record(draft.description.clone(), draft.image_prompt.clone()))
    }

    /// Hash of a submitted `createAgent` whose receipt has not been seen yet.
    pub async fn pending_transaction(&self) -> Option<String> {
        self.pending.lock().await.as_ref().map(|p| p.tx_hash.clone())
    }

    /// Every agent in the registry.
    pub async fn list_all(&self) -> Result<Vec<AgentRecord>, RegistrarError> {
        Ok(self.chain.list_agents().await?)
    }

    /// The agent deployed at `address`.
    pub async fn get_by_address(&self, address: &str) -> Result<AgentRecord, RegistrarError> {
        self.chain
            .agent_by_address(address)
            .await?
            .ok_or_else(|| RegistrarError::NotFound(address.to_string()))
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, RegistrarError> {
        let attempts = self.receipt_poll.max_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(receipt) = self.chain.transaction_receipt(tx_hash).await? {
                debug!(tx_hash, attempt, "receipt found");
                return Ok(receipt);
            }
            debug!(tx_hash, attempt, "waiting for receipt");
            if attempt < attempts {
                tokio::time::sleep(self.receipt_poll.interval()).await;
            }
        }
        Err(RegistrarError::ConfirmationTimeout {
            tx_hash: tx_hash.to_string(),
            attempts,
        })
    }

    /// First log that decodes as `AgentCreated`. Logs that fail to decode are skipped.
    fn find_agent_created(&self, logs: &[TxLog]) -> Option<AgentCreatedEvent> {
        logs.iter()
            .find_map(|log| match self.chain.decode_agent_created(log) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(address = %log.address, "skipping log: {e}");
                    None
                }
            })
    }
}

fn create_args(draft: &Draft) -> Result<CreateAgentArgs, RegistrarError> {
    let age = normalize_age(&draft.age).ok_or_else(|| RegistrarError::InvalidAge(draft.age.clone()))?;
    Ok(CreateAgentArgs {
        name: draft.name.clone(),
        age,
        race: draft.race.clone(),
        profession: draft.profession.clone(),
        bio: draft.bio.clone(),
        first_message: draft.first_message.clone(),
        image: draft.image.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChain, agent_created_log, complete_draft, unrelated_log};
    use agentmint_types::error::ChainError;

    fn registrar(chain: FakeChain, max_attempts: u32) -> Registrar {
        Registrar::new(
            BoxAgentChain::new(chain),
            PollPolicy {
                interval_ms: 2_000,
                max_attempts,
            },
        )
    }

    fn receipt(succeeded: bool, logs: Vec<TxLog>) -> TxReceipt {
        TxReceipt {
            tx_hash: "0xfeed".to_string(),
            succeeded,
            block_number: Some(7),
            logs,
        }
    }

    #[tokio::test]
    async fn agent_created_found_after_unrelated_log() {
        let chain = FakeChain::default().with_receipts(vec![Some(receipt(
            true,
            vec![unrelated_log(), agent_created_log("0xABC")],
        ))]);
        let submitted = chain.submitted();

        let record = registrar(chain, 5).register(&complete_draft()).await.unwrap();

        assert_eq!(record.token_address, "0xABC");
        assert_eq!(record.name, "Nyra");
        assert_eq!(record.description, "a wandering bard");
        assert_eq!(record.image_prompt, "1girl, bard");
        let submitted = submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].age, 27);
    }

    #[tokio::test]
    async fn first_matching_event_wins() {
        let chain = FakeChain::default().with_receipts(vec![Some(receipt(
            true,
            vec![agent_created_log("0x111"), unrelated_log(), agent_created_log("0x222")],
        ))]);
        let record = registrar(chain, 5).register(&complete_draft()).await.unwrap();
        assert_eq!(record.token_address, "0x111");
    }

    #[tokio::test]
    async fn no_matching_log_is_deployed_address_not_found() {
        let chain = FakeChain::default()
            .with_receipts(vec![Some(receipt(true, vec![unrelated_log(), unrelated_log()]))]);
        let err = registrar(chain, 5).register(&complete_draft()).await.unwrap_err();
        assert!(matches!(err, RegistrarError::DeployedAddressNotFound { .. }));
    }

    #[tokio::test]
    async fn reverted_receipt_is_transaction_failed() {
        let chain = FakeChain::default()
            .with_receipts(vec![Some(receipt(false, vec![agent_created_log("0xABC")]))]);
        let err = registrar(chain, 5).register(&complete_draft()).await.unwrap_err();
        assert!(matches!(err, RegistrarError::TransactionFailed { tx_hash } if tx_hash == "0xfeed"));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_mined() {
        let chain = FakeChain::default().with_receipts(vec![
            None,
            None,
            Some(receipt(true, vec![agent_created_log("0xABC")])),
        ]);
        let queries = chain.receipt_queries();
        let record = registrar(chain, 5).register(&complete_draft()).await.unwrap();
        assert_eq!(record.token_address, "0xABC");
        assert_eq!(*queries.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unmined_after_bound_is_timeout() {
        let chain = FakeChain::default().with_receipts(vec![None; 10]);
        let queries = chain.receipt_queries();
        let err = registrar(chain, 4).register(&complete_draft()).await.unwrap_err();
        assert!(matches!(err, RegistrarError::ConfirmationTimeout { attempts: 4, .. }));
        assert_eq!(*queries.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_timeout_resumes_same_transaction() {
        let chain = FakeChain::default().with_receipts(vec![
            None,
            None,
            Some(receipt(true, vec![agent_created_log("0xABC")])),
        ]);
        let submitted = chain.submitted();
        let registrar = registrar(chain, 2);
        let draft = complete_draft();

        let err = registrar.register(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            RegistrarError::ConfirmationTimeout { ref tx_hash, attempts: 2 } if tx_hash == "0xfeed"
        ));
        assert_eq!(registrar.pending_transaction().await.as_deref(), Some("0xfeed"));

        let record = registrar.register(&draft).await.unwrap();
        assert_eq!(record.token_address, "0xABC");
        assert_eq!(submitted.lock().unwrap().len(), 1);
        assert!(registrar.pending_transaction().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn edited_draft_after_timeout_submits_again() {
        let chain = FakeChain::default().with_receipts(vec![
            None,
            Some(receipt(true, vec![agent_created_log("0xABC")])),
        ]);
        let submitted = chain.submitted();
        let registrar = registrar(chain, 1);
        let mut draft = complete_draft();

        assert!(registrar.register(&draft).await.is_err());
        draft.bio = "Now sings for free.".to_string();
        registrar.register(&draft).await.unwrap();

        let submitted = submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[1].bio, "Now sings for free.");
    }

    #[tokio::test]
    async fn zero_attempts_still_polls_once() {
        let chain = FakeChain::default()
            .with_receipts(vec![Some(receipt(true, vec![agent_created_log("0xABC")]))]);
        let queries = chain.receipt_queries();
        let record = registrar(chain, 0).register(&complete_draft()).await.unwrap();
        assert_eq!(record.token_address, "0xABC");
        assert_eq!(*queries.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn reverted_receipt_clears_pending() {
        let chain = FakeChain::default().with_receipts(vec![Some(receipt(false, vec![]))]);
        let registrar = registrar(chain, 3);
        assert!(registrar.register(&complete_draft()).await.is_err());
        assert!(registrar.pending_transaction().await.is_none());
    }

    #[tokio::test]
    async fn non_numeric_age_fails_before_submit() {
        let chain = FakeChain::default();
        let submitted = chain.submitted();
        let mut draft = complete_draft();
        draft.age = "timeless".to_string();
        let err = registrar(chain, 5).register(&draft).await.unwrap_err();
        assert!(matches!(err, RegistrarError::InvalidAge(a) if a == "timeless"));
        assert!(submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_error_propagates_as_chain_error() {
        let chain = FakeChain::default().failing_submit();
        let err = registrar(chain, 5).register(&complete_draft()).await.unwrap_err();
        assert!(matches!(err, RegistrarError::Chain(ChainError::Transport(_))));
    }

    #[tokio::test]
    async fn get_by_address_unknown_is_not_found() {
        let chain = FakeChain::default();
        let err = registrar(chain, 5).get_by_address("0xDEAD").await.unwrap_err();
        assert!(matches!(err, RegistrarError::NotFound(a) if a == "0xDEAD"));
    }

    #[tokio::test]
    async fn list_all_and_get_by_address_read_registry() {
        let chain = FakeChain::default().with_agents(vec![
            crate::testing::record("0x1", "Nyra"),
            crate::testing::record("0x2", "Tavin"),
        ]);
        let registrar = registrar(chain, 5);
        assert_eq!(registrar.list_all().await.unwrap().len(), 2);
        assert_eq!(registrar.get_by_address("0x2").await.unwrap().name, "Tavin");
    }
}
