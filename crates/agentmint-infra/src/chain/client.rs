//! EthersAgentChain -- [`AgentChain`] over an EVM JSON-RPC endpoint.
//!
//! Reads go through a plain `Provider<Http>`. Writes need a signing key and
//! go through a `SignerMiddleware` that fills nonce, gas and EIP-1559 fees.

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip1559::Eip1559TransactionRequest;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, H256, TransactionReceipt};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use agentmint_core::chain::provider::AgentChain;
use agentmint_types::agent::{AgentCreatedEvent, AgentRecord, CreateAgentArgs, TxLog, TxReceipt};
use agentmint_types::error::ChainError;

use super::abi::{RegistryAbi, format_address, parse_address};

type SigningClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Registry contract client.
///
/// Does NOT derive Debug: it may hold the signing key.
pub struct EthersAgentChain {
    provider: Provider<Http>,
    signer: Option<SigningClient>,
    contract: Address,
    abi: RegistryAbi,
}

impl EthersAgentChain {
    /// Connect to `rpc_url`. Without `private_key` the client is read-only and
    /// `submit_create_agent` fails with [`ChainError::NoSigner`].
    pub fn new(
        rpc_url: &str,
        contract: &str,
        private_key: Option<&SecretString>,
        chain_id: u64,
    ) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::Transport(format!("invalid RPC URL '{rpc_url}': {e}")))?;
        let contract = parse_address(contract)?;

        let signer = private_key
            .map(|key| {
                let wallet = key
                    .expose_secret()
                    .trim()
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|e| ChainError::InvalidKey(e.to_string()))?
                    .with_chain_id(chain_id);
                debug!(signer = %format_address(wallet.address()), "signing key loaded");
                Ok::<_, ChainError>(SignerMiddleware::new(provider.clone(), wallet))
            })
            .transpose()?;

        Ok(Self {
            provider,
            signer,
            contract,
            abi: RegistryAbi::load()?,
        })
    }

    pub fn contract(&self) -> String {
        format_address(self.contract)
    }

    /// Address of the signing account, if a key is configured.
    pub fn signer_address(&self) -> Option<String> {
        self.signer
            .as_ref()
            .map(|client| format_address(client.signer().address()))
    }

    async fn read(&self, calldata: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .to(self.contract)
            .data(calldata)
            .into();

        self.provider
            .call(&tx, None)
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| ChainError::Transport(e.to_string()))
    }
}

impl AgentChain for EthersAgentChain {
    fn name(&self) -> &str {
        "evm"
    }

    async fn submit_create_agent(&self, args: &CreateAgentArgs) -> Result<String, ChainError> {
        let client = self.signer.as_ref().ok_or(ChainError::NoSigner)?;
        let calldata = self.abi.encode_create_agent(args)?;

        let tx = Eip1559TransactionRequest::new()
            .from(client.signer().address())
            .to(self.contract)
            .data(calldata);

        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::Transport(format!("createAgent failed: {e}")))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(%tx_hash, agent = %args.name, "createAgent broadcast");
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainError> {
        let hash: H256 = tx_hash
            .parse()
            .map_err(|e| ChainError::Decode(format!("transaction hash '{tx_hash}': {e}")))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(receipt.map(|r| to_tx_receipt(tx_hash, r)))
    }

    fn decode_agent_created(&self, log: &TxLog) -> Result<AgentCreatedEvent, ChainError> {
        self.abi.decode_agent_created(log)
    }

    async fn list_agents(&self) -> Result<Vec<AgentRecord>, ChainError> {
        let output = self.read(self.abi.encode_list_all()?).await?;
        self.abi.decode_list_all(&output)
    }

    async fn agent_by_address(&self, address: &str) -> Result<Option<AgentRecord>, ChainError> {
        let address = parse_address(address)?;
        match self.read(self.abi.encode_get_by_address(address)?).await {
            Ok(output) => self.abi.decode_get_by_address(&output),
            Err(ChainError::Transport(message)) if message.contains("revert") => {
                debug!(%message, "getByAddress reverted");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn to_tx_receipt(tx_hash: &str, receipt: TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: tx_hash.to_string(),
        succeeded: receipt.status.is_some_and(|status| status.as_u64() == 1),
        block_number: receipt.block_number.map(|n| n.as_u64()),
        logs: receipt
            .logs
            .into_iter()
            .map(|log| TxLog {
                address: format!("{:?}", log.address),
                topics: log.topics.iter().map(|t| format!("{t:?}")).collect(),
                data: format!("0x{}", hex::encode(&log.data)),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Bytes, Log, U64};

    const CONTRACT: &str = "0x2222222222222222222222222222222222222222";
    // Well-known development key (anvil account 0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn read_only_without_key() {
        let chain = EthersAgentChain::new("http://127.0.0.1:8545", CONTRACT, None, 84_532).unwrap();
        assert_eq!(chain.signer_address(), None);
        assert_eq!(chain.contract(), CONTRACT);
        assert_eq!(chain.name(), "evm");
    }

    #[test]
    fn signing_key_derives_address() {
        let key = SecretString::from(DEV_KEY);
        let chain =
            EthersAgentChain::new("http://127.0.0.1:8545", CONTRACT, Some(&key), 84_532).unwrap();
        assert_eq!(
            chain.signer_address().unwrap(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            EthersAgentChain::new("http://127.0.0.1:8545", "0xABC", None, 1),
            Err(ChainError::InvalidAddress(_))
        ));

        let bad_key = SecretString::from("not-a-key");
        assert!(matches!(
            EthersAgentChain::new("http://127.0.0.1:8545", CONTRACT, Some(&bad_key), 1),
            Err(ChainError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn submit_without_signer_fails_before_rpc() {
        let chain = EthersAgentChain::new("http://127.0.0.1:9", CONTRACT, None, 1).unwrap();
        let args = CreateAgentArgs {
            name: "Nyra".to_string(),
            age: 27,
            race: "half-elf".to_string(),
            profession: "bard".to_string(),
            bio: String::new(),
            first_message: String::new(),
            image: String::new(),
        };
        assert!(matches!(
            chain.submit_create_agent(&args).await,
            Err(ChainError::NoSigner)
        ));
    }

    #[test]
    fn receipt_conversion() {
        let topic = H256::repeat_byte(0x11);
        let receipt = TransactionReceipt {
            status: Some(U64::from(1)),
            block_number: Some(U64::from(42)),
            logs: vec![Log {
                address: parse_address(CONTRACT).unwrap(),
                topics: vec![topic],
                data: Bytes::from(vec![0xde, 0xad]),
                ..Default::default()
            }],
            ..Default::default()
        };

        let converted = to_tx_receipt("0xabc", receipt);
        assert!(converted.succeeded);
        assert_eq!(converted.block_number, Some(42));
        assert_eq!(converted.logs[0].address, CONTRACT);
        assert_eq!(converted.logs[0].topics[0], format!("{topic:?}"));
        assert_eq!(converted.logs[0].data, "0xdead");

        let reverted = TransactionReceipt {
            status: Some(U64::zero()),
            ..Default::default()
        };
        assert!(!to_tx_receipt("0xabc", reverted).succeeded);
    }
}
