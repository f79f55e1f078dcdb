/*!
 * Etherscanner RPC
 *
 * Cliente JSON-RPC para nodes Ethereum: traces de chamadas, transações,
 * recibos, blocos, saldos e código de contratos.
 */

use async_trait::async_trait;
use ethereum_types::{Address, U256};
use etherscanner_core::{error::Result, traits::RpcProvider, types::*, Error};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use web3::{
    transports::{Http, WebSocket},
    types::{BlockId, BlockNumber, TransactionId, H160, H256 as Web3H256, U64},
    Transport, Web3,
};

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    /// Timeout de cada requisição HTTP
    pub timeout: Duration,
    pub use_cache: bool,
    pub cache_ttl: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            timeout: Duration::from_secs(60),
            use_cache: true,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

impl RpcConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Enum para diferentes tipos de transporte
pub enum TransportType {
    Http(Web3<Http>),
    WebSocket(Web3<WebSocket>),
}

/// Executa a mesma chamada em qualquer transporte e converte o erro
macro_rules! dispatch {
    ($transport:expr, |$web3:ident| $call:expr, $context:literal) => {
        match $transport {
            TransportType::Http($web3) => $call.await,
            TransportType::WebSocket($web3) => $call.await,
        }
        .map_err(|e| Error::RpcError(format!(concat!($context, ": {}"), e)))
    };
}

/// Cache de respostas imutáveis (recibos, blocos) com TTL
#[derive(Default)]
struct ResponseCache {
    entries: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl ResponseCache {
    fn get(&self, key: &str, ttl: Duration) -> Option<Vec<u8>> {
        use std::sync::atomic::Ordering;

        let entries = self.entries.read();
        match entries.get(key) {
            Some((data, stored_at)) if stored_at.elapsed() < ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(data.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: String, data: &[u8]) {
        self.entries.write().insert(key, (data.to_vec(), Instant::now()));
    }
}

/// Cliente RPC para Ethereum
pub struct EtherscannerRpcClient {
    transport: TransportType,
    config: RpcConfig,
    cache: ResponseCache,
}

impl EtherscannerRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub async fn new_http(config: RpcConfig) -> Result<Self> {
        let url = config
            .endpoint
            .parse::<reqwest::Url>()
            .map_err(|e| Error::ValidationError(format!("Endpoint inválido '{}': {}", config.endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::RpcError(format!("Falha ao criar cliente HTTP: {}", e)))?;

        let web3 = Web3::new(Http::with_client(client, url));
        Self::connect(TransportType::Http(web3), config).await
    }

    /// Cria um novo cliente RPC WebSocket
    pub async fn new_websocket(config: RpcConfig) -> Result<Self> {
        let transport = WebSocket::new(&config.endpoint)
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via WebSocket: {}", e)))?;

        Self::connect(TransportType::WebSocket(Web3::new(transport)), config).await
    }

    /// Cria um novo cliente baseado na URL
    pub async fn new(config: RpcConfig) -> Result<Self> {
        if config.endpoint.starts_with("ws") {
            Self::new_websocket(config).await
        } else {
            Self::new_http(config).await
        }
    }

    async fn connect(transport: TransportType, config: RpcConfig) -> Result<Self> {
        // Verifica a conexão
        let head = dispatch!(&transport, |web3| web3.eth().block_number(), "Falha ao conectar ao node Ethereum")?;
        tracing::debug!(endpoint = %config.endpoint, head = head.as_u64(), "Conectado ao node");

        Ok(Self {
            transport,
            config,
            cache: ResponseCache::default(),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn cached(&self, key: &str) -> Option<Vec<u8>> {
        if !self.config.use_cache {
            return None;
        }
        self.cache.get(key, self.config.cache_ttl)
    }

    fn store(&self, key: String, data: &[u8]) {
        if self.config.use_cache {
            self.cache.put(key, data);
        }
    }

    /// Limpa o cache
    pub fn clear_cache(&self) {
        self.cache.entries.write().clear();
    }

    /// Obtém estatísticas do cache
    pub fn cache_stats(&self) -> CacheStats {
        use std::sync::atomic::Ordering;

        let entries = self.cache.entries.read();
        let expired = entries
            .values()
            .filter(|(_, stored_at)| stored_at.elapsed() >= self.config.cache_ttl)
            .count();
        let hits = self.cache.hits.load(Ordering::Relaxed);
        let misses = self.cache.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            cache_hit_ratio: if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 },
        }
    }
}

fn to_bytes<T: serde::Serialize>(value: &T, what: &str) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::EncodeError(format!("Falha ao serializar {}: {}", what, e)))
}

fn block_at(block_number: u64) -> Option<BlockNumber> {
    Some(BlockNumber::Number(U64::from(block_number)))
}

#[async_trait]
impl RpcProvider for EtherscannerRpcClient {
    async fn get_transaction_trace(&self, tx_hash: TransactionHash, options: TraceOptions) -> Result<Vec<u8>> {
        let params = vec![
            serde_json::Value::String(format!("{:?}", tx_hash)),
            serde_json::to_value(&options)
                .map_err(|e| Error::EncodeError(format!("Falha ao serializar opções do trace: {}", e)))?,
        ];

        tracing::debug!(tx = ?tx_hash, reexec = options.reexec, "debug_traceTransaction");
        let result = dispatch!(
            &self.transport,
            |web3| web3.transport().execute("debug_traceTransaction", params),
            "Falha ao obter trace da transação"
        )?;

        to_bytes(&result, "trace")
    }

    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Vec<u8>> {
        let id = TransactionId::Hash(Web3H256::from_slice(tx_hash.as_bytes()));
        let transaction = dispatch!(&self.transport, |web3| web3.eth().transaction(id), "Falha ao obter transação")?;

        let transaction = transaction.ok_or_else(|| Error::NotFound(format!("Transação {:?} não encontrada", tx_hash)))?;
        to_bytes(&transaction, "transação")
    }

    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Vec<u8>> {
        let cache_key = format!("receipt_{:x}", tx_hash);
        if let Some(data) = self.cached(&cache_key) {
            return Ok(data);
        }

        let hash = Web3H256::from_slice(tx_hash.as_bytes());
        let receipt = dispatch!(
            &self.transport,
            |web3| web3.eth().transaction_receipt(hash),
            "Falha ao obter recibo da transação"
        )?;

        let receipt = receipt.ok_or_else(|| Error::NotFound("Recibo da transação não encontrado".to_string()))?;
        let bytes = to_bytes(&receipt, "recibo")?;
        self.store(cache_key, &bytes);

        Ok(bytes)
    }

    async fn get_block(&self, block_number: u64) -> Result<Vec<u8>> {
        let cache_key = format!("block_{}", block_number);
        if let Some(data) = self.cached(&cache_key) {
            return Ok(data);
        }

        let id = BlockId::Number(BlockNumber::Number(U64::from(block_number)));
        let block = dispatch!(&self.transport, |web3| web3.eth().block(id), "Falha ao obter bloco")?;

        let block = block.ok_or_else(|| Error::NotFound(format!("Bloco {} não encontrado", block_number)))?;
        let bytes = to_bytes(&block, "bloco")?;
        self.store(cache_key, &bytes);

        Ok(bytes)
    }

    async fn get_balance(&self, address: Address, block_number: u64) -> Result<U256> {
        let address = H160::from_slice(address.as_bytes());
        dispatch!(
            &self.transport,
            |web3| web3.eth().balance(address, block_at(block_number)),
            "Falha ao obter saldo"
        )
    }

    async fn get_code(&self, address: Address, block_number: u64) -> Result<Vec<u8>> {
        let address = H160::from_slice(address.as_bytes());
        let code = dispatch!(
            &self.transport,
            |web3| web3.eth().code(address, block_at(block_number)),
            "Falha ao obter código do contrato"
        )?;

        Ok(code.0)
    }

    async fn get_block_number(&self) -> Result<u64> {
        let block_number = dispatch!(&self.transport, |web3| web3.eth().block_number(), "Falha ao obter número do bloco")?;
        Ok(block_number.as_u64())
    }
}

/// Estatísticas do cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub cache_hit_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RpcConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8545");
        assert!(config.use_cache);
    }

    #[test]
    fn test_response_cache_ttl() {
        let cache = ResponseCache::default();
        cache.put("block_1".into(), b"{}");

        assert_eq!(cache.get("block_1", Duration::from_secs(60)), Some(b"{}".to_vec()));
        assert_eq!(cache.get("block_1", Duration::ZERO), None);
        assert_eq!(cache.get("block_2", Duration::from_secs(60)), None);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_rejected() {
        let result = EtherscannerRpcClient::new_http(RpcConfig::with_endpoint("not a url")).await;
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }
}
