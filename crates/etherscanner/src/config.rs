use etherscanner_core::{error::Result, Error};
use etherscanner_rpc::RpcConfig;
use etherscanner_trace::TraceConfig;
use std::time::Duration;

/// Transações processadas em paralelo por bloco
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Folga do timeout do cliente sobre o timeout do node
const CLIENT_TIMEOUT_SLACK_MS: u64 = 5_000;

pub const ENV_RPC_URL: &str = "ETHERSCANNER_RPC_URL";
pub const ENV_CONCURRENCY: &str = "ETHERSCANNER_CONCURRENCY";
/// Timeout do trace em segundos
pub const ENV_TRACE_TIMEOUT: &str = "ETHERSCANNER_TRACE_TIMEOUT";

/// Configuração do scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub rpc: RpcConfig,
    pub trace: TraceConfig,
    pub concurrency: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            trace: TraceConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScannerConfig {
    /// Cria um builder para a configuração
    pub fn builder() -> ScannerConfigBuilder {
        ScannerConfigBuilder::default()
    }

    /// Carrega a configuração das variáveis de ambiente
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Carrega a configuração a partir de uma função de consulta
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_RPC_URL)
            .ok_or_else(|| Error::ValidationError(format!("{} é obrigatório", ENV_RPC_URL)))?;
        let mut builder = Self::builder().endpoint(endpoint);

        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            let concurrency = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::ValidationError(format!("{} inválido '{}': {}", ENV_CONCURRENCY, raw, e)))?;
            builder = builder.concurrency(concurrency);
        }

        if let Some(raw) = lookup(ENV_TRACE_TIMEOUT) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::ValidationError(format!("{} inválido '{}': {}", ENV_TRACE_TIMEOUT, raw, e)))?;
            builder = builder.trace_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

/// Builder para configuração do scanner
#[derive(Debug, Default)]
pub struct ScannerConfigBuilder {
    endpoint: Option<String>,
    rpc_timeout: Option<Duration>,
    use_cache: Option<bool>,
    cache_ttl: Option<Duration>,
    tracer: Option<String>,
    trace_timeout: Option<Duration>,
    reexec_margin: Option<u64>,
    concurrency: Option<usize>,
}

impl ScannerConfigBuilder {
    /// Define o endpoint do node (http(s) ou ws(s))
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Define o timeout das requisições RPC
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    /// Habilita ou desabilita o cache de recibos e blocos
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Define o tracer do node
    pub fn tracer<S: Into<String>>(mut self, tracer: S) -> Self {
        self.tracer = Some(tracer.into());
        self
    }

    /// Define o timeout do trace, aplicado no node e no cliente
    pub fn trace_timeout(mut self, timeout: Duration) -> Self {
        self.trace_timeout = Some(timeout);
        self
    }

    pub fn reexec_margin(mut self, margin: u64) -> Self {
        self.reexec_margin = Some(margin);
        self
    }

    /// Define quantas transações são processadas em paralelo
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Constrói a configuração
    pub fn build(self) -> Result<ScannerConfig> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::ValidationError("endpoint é obrigatório".to_string()))?;
        let scheme_ok = ["http://", "https://", "ws://", "wss://"]
            .iter()
            .any(|scheme| endpoint.starts_with(scheme));
        if !scheme_ok {
            return Err(Error::ValidationError(format!("endpoint sem esquema suportado: {}", endpoint)));
        }

        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(Error::ValidationError("concurrency deve ser maior que zero".to_string()));
        }

        let mut rpc = RpcConfig::with_endpoint(endpoint);
        if let Some(timeout) = self.rpc_timeout {
            rpc.timeout = timeout;
        }
        if let Some(use_cache) = self.use_cache {
            rpc.use_cache = use_cache;
        }
        if let Some(ttl) = self.cache_ttl {
            rpc.cache_ttl = ttl;
        }

        let mut trace = TraceConfig::default();
        if let Some(tracer) = self.tracer {
            trace.tracer = tracer;
        }
        if let Some(margin) = self.reexec_margin {
            trace.reexec_margin = margin;
        }
        if let Some(timeout) = self.trace_timeout {
            if timeout.is_zero() {
                return Err(Error::ValidationError("trace_timeout deve ser maior que zero".to_string()));
            }
            trace.node_timeout = format!("{}s", timeout.as_secs().max(1));
            trace.timeout_ms = u64::try_from(timeout.as_millis())
                .unwrap_or(u64::MAX)
                .saturating_add(CLIENT_TIMEOUT_SLACK_MS);
            // a requisição HTTP não pode expirar antes do trace
            rpc.timeout = rpc.timeout.max(trace.client_timeout());
        }

        Ok(ScannerConfig { rpc, trace, concurrency })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_builder_defaults() {
        let config = ScannerConfig::builder().endpoint("http://node:8545").build().unwrap();
        assert_eq!(config.rpc.endpoint, "http://node:8545");
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.trace.tracer, "callTracer");
        assert_eq!(config.trace.node_timeout, "30s");
        assert_eq!(config.trace.reexec_margin, 20);
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(ScannerConfig::builder().build(), Err(Error::ValidationError(_))));
        assert!(matches!(
            ScannerConfig::builder().endpoint("node:8545").build(),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            ScannerConfig::builder().endpoint("ws://node").concurrency(0).build(),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            ScannerConfig::builder().endpoint("ws://node").trace_timeout(Duration::ZERO).build(),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_trace_timeout_applies_to_node_and_client() {
        let config = ScannerConfig::builder()
            .endpoint("https://node")
            .rpc_timeout(Duration::from_secs(10))
            .trace_timeout(Duration::from_secs(90))
            .build()
            .unwrap();
        assert_eq!(config.trace.node_timeout, "90s");
        assert_eq!(config.trace.timeout_ms, 95_000);
        assert_eq!(config.rpc.timeout, Duration::from_secs(95));
    }

    #[test]
    fn test_from_lookup() {
        let config = ScannerConfig::from_lookup(env(&[
            (ENV_RPC_URL, "http://localhost:8545"),
            (ENV_CONCURRENCY, "4"),
            (ENV_TRACE_TIMEOUT, "45"),
        ]))
        .unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.trace.node_timeout, "45s");

        assert!(matches!(ScannerConfig::from_lookup(env(&[])), Err(Error::ValidationError(_))));
        assert!(matches!(
            ScannerConfig::from_lookup(env(&[(ENV_RPC_URL, "http://x"), (ENV_CONCURRENCY, "many")])),
            Err(Error::ValidationError(_))
        ));
    }
}
