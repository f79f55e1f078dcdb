use crate::config::TraceConfig;
use crate::trace::CallNode;
use ethereum_types::H256;
use etherscanner_core::{error::Result, traits::RpcProvider, Error, TransactionContext};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Busca a árvore de chamadas de uma transação via `debug_traceTransaction`
pub struct TraceSource {
    rpc_client: Arc<dyn RpcProvider>,
    config: TraceConfig,
}

impl TraceSource {
    pub fn new(rpc_client: Arc<dyn RpcProvider>, config: Option<TraceConfig>) -> Self {
        Self {
            rpc_client,
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Obtém a árvore da transação.
    ///
    /// Nunca falha: erro de transporte, erro do node, timeout, resultado
    /// `null` ou árvore ilegível viram `None`, registrado em log.
    pub async fn fetch(&self, tx: &TransactionContext) -> Option<CallNode> {
        let outcome = match tokio::time::timeout(self.config.client_timeout(), self.try_fetch(tx)).await {
            Ok(result) => result,
            Err(_) => Err(Error::TimeoutError(format!("trace excedeu {} ms", self.config.timeout_ms))),
        };

        match outcome {
            Ok(Some(node)) => Some(node),
            Ok(None) => {
                warn!(tx = %tx.hash, "Node devolveu trace nulo");
                None
            }
            Err(e) => {
                warn!(tx = %tx.hash, error = %e, "Falha ao obter trace");
                None
            }
        }
    }

    async fn try_fetch(&self, tx: &TransactionContext) -> Result<Option<CallNode>> {
        let hash = parse_hash(&tx.hash)?;
        let head = self.rpc_client.get_block_number().await?;
        let options = self.config.options_for(head, tx.block_number);
        debug!(tx = %tx.hash, head, reexec = options.reexec, "Solicitando trace");

        let bytes = self.rpc_client.get_transaction_trace(hash, options).await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::DecodeError(format!("Falha ao deserializar trace: {}", e)))
    }
}

/// Converte o hash textual da transação
pub fn parse_hash(hash: &str) -> Result<H256> {
    let digits = hash.trim_start_matches("0x");
    H256::from_str(digits).map_err(|e| Error::DecodeError(format!("Hash inválido '{}': {}", hash, e)))
}
