use {
    async_trait::async_trait,
    num_bigint::BigUint,
    serde::{de::DeserializeOwned, Deserialize, Deserializer},
    serde_json::json,
};

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    Rpc { code: i64, message: String },
    BadResponse(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            ClientError::BadResponse(msg) => write!(f, "Bad RPC response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// A single value transfer (or contract interaction) within a block.
///
/// `to` is absent for contract-creation transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: Option<String>,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub value: BigUint,
}

/// A block with its full transaction bodies. Fields the scanner does not
/// use are ignored on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Remote ledger collaborator.
///
/// The pipeline only ever talks to this trait, so tests can drive it with
/// an in-memory ledger instead of a network client.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolve the current chain head. Failure here is fatal to the run:
    /// no window can be framed without it.
    async fn latest_block_number(&self) -> Result<BigUint, ClientError>;

    /// Fetch one block including transaction bodies. Failure here is
    /// recoverable at the per-block level.
    async fn block_with_transactions(&self, number: u64) -> Result<Block, ClientError>;
}

/// JSON-RPC client for the GetBlock.io Ethereum endpoint.
pub struct GetBlockClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GetBlockClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("https://go.getblock.io/{}/", api_key),
        }
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ClientError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::BadResponse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| ClientError::BadResponse(format!("{}: empty result", method)))
    }
}

#[async_trait]
impl LedgerClient for GetBlockClient {
    async fn latest_block_number(&self) -> Result<BigUint, ClientError> {
        let raw: String = self.rpc_call("eth_blockNumber", json!([])).await?;
        parse_quantity(&raw)
            .ok_or_else(|| ClientError::BadResponse(format!("bad block number '{}'", raw)))
    }

    async fn block_with_transactions(&self, number: u64) -> Result<Block, ClientError> {
        // Second param requests full transaction bodies, not just hashes.
        let params = json!([format!("{:#x}", number), true]);
        let block: Option<Block> = self.rpc_call("eth_getBlockByNumber", params).await?;
        block.ok_or_else(|| ClientError::BadResponse(format!("block {} not found", number)))
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Parse a JSON-RPC hex quantity ("0x1b4") into a BigUint.
fn parse_quantity(raw: &str) -> Option<BigUint> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_quantity(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid hex quantity '{}'", raw)))
}
