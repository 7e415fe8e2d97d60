//! Queue-backed fakes for the three ports, shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agentmint_types::agent::{AgentCreatedEvent, AgentRecord, CreateAgentArgs, TxLog, TxReceipt};
use agentmint_types::draft::{Draft, Stage};
use agentmint_types::error::{ChainError, GenerationError, ImageError};
use agentmint_types::image::{
    ImageJob, ImageJobRequest, ImageJobResponse, ImageJobResult, NestedImageJob, NestedJobResult,
};
use agentmint_types::llm::{CompletionRequest, CompletionResponse, MessageRole};

use crate::chain::provider::AgentChain;
use crate::image::provider::ImageGenerator;
use crate::llm::provider::TextGenerator;

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Returns scripted responses in order and records every request.
pub struct ScriptedTextGenerator {
    responses: Mutex<VecDeque<Result<CompletionResponse, GenerationError>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedTextGenerator {
    pub fn new(responses: Vec<Result<CompletionResponse, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl TextGenerator for ScriptedTextGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".to_string())))
    }
}

/// Replies `echo: <last user message>`, optionally after a delay.
#[derive(Default)]
pub struct EchoTextGenerator {
    delay: Option<Duration>,
    request_sizes: Arc<Mutex<Vec<usize>>>,
}

impl EchoTextGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn request_sizes(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.request_sizes)
    }
}

impl TextGenerator for EchoTextGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, GenerationError> {
        self.request_sizes.lock().unwrap().push(request.messages.len());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse::text(format!("echo: {last_user}")))
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Answers every submit with the same response and polls from a script.
pub struct ScriptedImageGenerator {
    on_submit: ImageJobResponse,
    polls: Mutex<VecDeque<Result<ImageJobResponse, ImageError>>>,
    poll_count: Arc<Mutex<u32>>,
    submitted: Arc<Mutex<Vec<ImageJobRequest>>>,
}

impl ScriptedImageGenerator {
    pub fn new(
        on_submit: ImageJobResponse,
        polls: Vec<Result<ImageJobResponse, ImageError>>,
    ) -> Self {
        Self {
            on_submit,
            polls: Mutex::new(polls.into()),
            poll_count: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn polls(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.poll_count)
    }

    pub fn submitted(&self) -> Arc<Mutex<Vec<ImageJobRequest>>> {
        Arc::clone(&self.submitted)
    }
}

impl ImageGenerator for ScriptedImageGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit(&self, request: &ImageJobRequest) -> Result<ImageJobResponse, ImageError> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok(self.on_submit.clone())
    }

    async fn status(&self, _token: &str) -> Result<ImageJobResponse, ImageError> {
        *self.poll_count.lock().unwrap() += 1;
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ImageError::Transport("script exhausted".to_string())))
    }
}

pub fn finished_image(url: &str) -> ImageJobResponse {
    ImageJobResponse {
        token: Some("tok".to_string()),
        jobs: Some(vec![ImageJob {
            job_id: Some("job-1".to_string()),
            scheduled: false,
            result: Some(ImageJobResult {
                jobs: Some(vec![NestedImageJob {
                    result: Some(NestedJobResult {
                        available: true,
                        blob_url: Some(url.to_string()),
                    }),
                }]),
            }),
        }]),
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

const AGENT_CREATED_TOPIC: &str = "AgentCreated";

/// In-memory registry. Logs whose first topic is `AgentCreated` decode to an
/// event for the last submitted agent, deployed at the address in topic 1.
#[derive(Default)]
pub struct FakeChain {
    receipts: Mutex<VecDeque<Option<TxReceipt>>>,
    agents: Vec<AgentRecord>,
    fail_submit: bool,
    submitted: Arc<Mutex<Vec<CreateAgentArgs>>>,
    receipt_queries: Arc<Mutex<u32>>,
}

impl FakeChain {
    pub fn with_receipts(mut self, receipts: Vec<Option<TxReceipt>>) -> Self {
        self.receipts = Mutex::new(receipts.into());
        self
    }

    pub fn with_agents(mut self, agents: Vec<AgentRecord>) -> Self {
        self.agents = agents;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn submitted(&self) -> Arc<Mutex<Vec<CreateAgentArgs>>> {
        Arc::clone(&self.submitted)
    }

    pub fn receipt_queries(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.receipt_queries)
    }
}

impl AgentChain for FakeChain {
    fn name(&self) -> &str {
        "fake"
    }

    async fn submit_create_agent(&self, args: &CreateAgentArgs) -> Result<String, ChainError> {
        if self.fail_submit {
            return Err(ChainError::Transport("nonce too low".to_string()));
        }
        self.submitted.lock().unwrap().push(args.clone());
        Ok("0xfeed".to_string())
    }

    async fn transaction_receipt(&self, _tx_hash: &str) -> Result<Option<TxReceipt>, ChainError> {
        *self.receipt_queries.lock().unwrap() += 1;
        Ok(self.receipts.lock().unwrap().pop_front().flatten())
    }

    fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError> {
        if log.topics.first().map(String::as_str) != Some(AGENT_CREATED_TOPIC) {
            return Err(ChainError::Decode("topic mismatch".to_string()));
        }
        let token_address = log
            .topics
            .get(1)
            .cloned()
            .ok_or_else(|| ChainError::Decode("missing address topic".to_string()))?;
        let args = self
            .submitted
            .lock()
            .unwrap()
            .last()
            .cloned()
            .ok_or_else(|| ChainError::Decode("nothing submitted".to_string()))?;
        Ok(AgentCreatedEvent {
            name: args.name,
            age: args.age,
            race: args.race,
            profession: args.profession,
            bio: args.bio,
            first_message: args.first_message,
            image: args.image,
            token_address,
            creator: "0xcreator".to_string(),
        })
    }

    async fn list_agents(&self) -> Result<Vec<AgentRecord>, ChainError> {
        Ok(self.agents.clone())
    }

    async fn agent_by_address(&self, address: &str) -> Result<Option<AgentRecord>, ChainError> {
        Ok(self
            .agents
            .iter()
            .find(|a| a.token_address.eq_ignore_ascii_case(address))
            .cloned())
    }
}

pub fn agent_created_log(token_address: &str) -> TxLog {
    TxLog {
        address: "0xregistry".to_string(),
        topics: vec![AGENT_CREATED_TOPIC.to_string(), token_address.to_string()],
        data: "0x".to_string(),
    }
}

pub fn unrelated_log() -> TxLog {
    TxLog {
        address: "0xtoken".to_string(),
        topics: vec!["Transfer".to_string()],
        data: "0x".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A record as read back from chain: no description or image prompt.
pub fn record(token_address: &str, name: &str) -> AgentRecord {
    AgentRecord {
        name: name.to_string(),
        description: String::new(),
        image_prompt: String::new(),
        image: "https://img/agent.png".to_string(),
        age: 27,
        race: "half-elf".to_string(),
        profession: "bard".to_string(),
        bio: "Sings for coin.".to_string(),
        first_message: "Well met, traveler.".to_string(),
        token_address: token_address.to_string(),
        creator: "0xcreator".to_string(),
    }
}

pub fn complete_draft() -> Draft {
    Draft {
        name: "Nyra".to_string(),
        description: "a wandering bard".to_string(),
        image_prompt: "1girl, bard".to_string(),
        image: "https://img/nyra.png".to_string(),
        age: "27 years".to_string(),
        race: "half-elf".to_string(),
        profession: "bard".to_string(),
        bio: "Sings for coin.".to_string(),
        first_message: "Well met, traveler.".to_string(),
        stage: Stage::Details,
    }
}
