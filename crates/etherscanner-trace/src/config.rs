use etherscanner_core::{TraceOptions, CALL_TRACER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuração da coleta de traces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Tracer do node
    pub tracer: String,
    /// Timeout repassado ao node, ex.: `"30s"`
    pub node_timeout: String,
    /// Blocos somados à distância até o head no cálculo do `reexec`
    pub reexec_margin: u64,
    /// Timeout do lado do cliente em milissegundos
    pub timeout_ms: u64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            tracer: CALL_TRACER.to_string(),
            node_timeout: "30s".to_string(),
            reexec_margin: 20,
            timeout_ms: 35000, // 35 segundos
        }
    }
}

impl TraceConfig {
    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Monta as opções do `debug_traceTransaction` para uma transação
    /// minerada em `tx_block`, com o node em `head`
    pub fn options_for(&self, head: u64, tx_block: Option<u64>) -> TraceOptions {
        let distance = tx_block.map(|block| head.saturating_sub(block)).unwrap_or(0);
        TraceOptions {
            tracer: self.tracer.clone(),
            timeout: self.node_timeout.clone(),
            reexec: distance.saturating_add(self.reexec_margin),
        }
    }
}
