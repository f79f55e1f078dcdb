use crate::config::ScannerConfig;
use crate::node::{self, NodeBlock, NodeReceipt, NodeTransaction};
use crate::report::{AccountSnapshot, BlockScan, TransactionReport, TransactionScan};
use etherscanner_core::{error::Result, traits::RpcProvider, AddressCodec, Error, TransactionContext, TransactionHash};
use etherscanner_rpc::EtherscannerRpcClient;
use etherscanner_trace::{parse_hash, CallDecoder, Flattened, TraceFlattener, TraceSource};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orquestra a varredura de blocos e transações
pub struct EtherScanner {
    rpc_client: Arc<dyn RpcProvider>,
    source: TraceSource,
    flattener: TraceFlattener,
    config: ScannerConfig,
}

impl EtherScanner {
    /// Cria um scanner sobre um provider já existente
    pub fn new(rpc_client: Arc<dyn RpcProvider>, config: Option<ScannerConfig>) -> Self {
        let mut config = config.unwrap_or_default();
        if config.concurrency == 0 {
            warn!("Concorrência zero, usando 1");
            config.concurrency = 1;
        }
        let source = TraceSource::new(rpc_client.clone(), Some(config.trace.clone()));

        Self {
            rpc_client,
            source,
            flattener: TraceFlattener::new(),
            config,
        }
    }

    /// Conecta ao node configurado e cria o scanner
    pub async fn connect(config: ScannerConfig) -> Result<Self> {
        let client = EtherscannerRpcClient::new(config.rpc.clone()).await?;
        info!(endpoint = %config.rpc.endpoint, "Scanner conectado");
        Ok(Self::new(Arc::new(client), Some(config)))
    }

    /// Usa o decodificador informado para os eventos `Token`
    pub fn with_decoder(mut self, decoder: Arc<dyn CallDecoder>) -> Self {
        self.flattener = TraceFlattener::with_decoder(decoder);
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Varre todas as transações de um bloco.
    ///
    /// Bloco inexistente produz um resultado vazio. Falhas de uma transação
    /// são registradas em log e listadas em `failed`; as demais continuam.
    pub async fn scan_block(&self, number: u64) -> Result<BlockScan> {
        let raw: serde_json::Value = match self.rpc_client.get_block(number).await {
            Ok(bytes) => node::parse(&bytes, "bloco")?,
            Err(Error::NotFound(_)) => serde_json::Value::Null,
            Err(e) => return Err(e),
        };
        if raw.is_null() {
            info!(block = number, "Bloco não encontrado");
            return Ok(BlockScan::empty(number));
        }

        let block: NodeBlock = serde_json::from_value(raw.clone())
            .map_err(|e| Error::DecodeError(format!("Falha ao deserializar bloco: {}", e)))?;
        let timestamp = block.timestamp();
        info!(block = number, transactions = block.transactions.len(), "Varrendo bloco");

        let results: Vec<(String, Result<TransactionScan>)> = stream::iter(block.transactions.iter().cloned())
            .map(|hash| {
                let block = &block;
                async move {
                    let result = self.scan_block_transaction(&hash, number, block.hash.as_deref(), timestamp).await;
                    (hash, result)
                }
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut scan = BlockScan {
            number,
            block: raw,
            ..Default::default()
        };
        for (hash, result) in results {
            match result {
                Ok(tx) => scan.transactions.push(tx),
                Err(e) => {
                    warn!(block = number, tx = %hash, error = %e, "Falha ao processar transação");
                    scan.failed.push(hash);
                }
            }
        }

        info!(
            block = number,
            processed = scan.transactions.len(),
            failed = scan.failed.len(),
            "Bloco varrido"
        );
        Ok(scan)
    }

    async fn scan_block_transaction(
        &self,
        hash: &str,
        block_number: u64,
        block_hash: Option<&str>,
        timestamp: u64,
    ) -> Result<TransactionScan> {
        let tx_hash = parse_hash(hash)?;
        let (raw_tx, tx) = self.fetch_transaction(tx_hash, hash).await?;

        let mut ctx = tx.context();
        ctx.block_number = Some(block_number);
        if ctx.block_hash.is_none() {
            ctx.block_hash = block_hash.map(str::to_string);
        }

        let (flattened, receipt) = futures::join!(self.scan_transaction_details(&ctx), self.fetch_receipt(tx_hash));
        let (raw_receipt, receipt) = receipt?;

        let to = AddressCodec::normalize(&ctx.to);
        let from = AddressCodec::normalize(&ctx.from);
        let to_balance = self.balance_of(to.as_deref(), block_number).await?;
        let from_balance = self.balance_of(from.as_deref(), block_number).await?;
        let is_contract = receipt.created_contract() || self.has_code(to.as_deref(), block_number).await?;

        let is_internal = flattened.has_internal();
        Ok(TransactionScan {
            hash: hash.to_string(),
            transaction: raw_tx,
            scan: flattened.events,
            issues: flattened.issues,
            receipt: raw_receipt,
            is_internal,
            to_account: AccountSnapshot::new(block_number, to, to_balance, timestamp).with_contract_flag(is_contract),
            from_account: AccountSnapshot::new(block_number, from, from_balance, timestamp),
        })
    }

    /// Eventos de uma transação confirmada.
    ///
    /// Falha com `NotFound` se o node não conhece o hash e com
    /// `UnconfirmedTransaction` se ela ainda não foi minerada.
    pub async fn scan_transaction(&self, hash: &str) -> Result<Flattened> {
        let tx_hash = parse_hash(hash)?;
        let (_, tx) = self.fetch_transaction(tx_hash, hash).await?;

        let ctx = tx.context();
        if !ctx.is_confirmed() {
            return Err(Error::UnconfirmedTransaction(hash.to_string()));
        }
        Ok(self.scan_transaction_details(&ctx).await)
    }

    /// Busca o trace e achata. Nunca falha: trace indisponível produz lista vazia.
    pub async fn scan_transaction_details(&self, tx: &TransactionContext) -> Flattened {
        let tree = self.source.fetch(tx).await;
        let flattened = self.flattener.flatten(tx, tree.as_ref());
        debug!(
            tx = %tx.hash,
            events = flattened.events.len(),
            issues = flattened.issues.len(),
            "Transação achatada"
        );
        flattened
    }

    /// Transação, eventos e recibo, sem os saldos das contas
    pub async fn process_transaction(&self, hash: &str) -> Result<TransactionReport> {
        let tx_hash = parse_hash(hash)?;
        let (raw_tx, tx) = self.fetch_transaction(tx_hash, hash).await?;

        let flattened = self.scan_transaction_details(&tx.context()).await;
        let (raw_receipt, _) = self.fetch_receipt(tx_hash).await?;

        Ok(TransactionReport::new(hash.to_string(), raw_tx, flattened, raw_receipt))
    }

    async fn fetch_transaction(&self, tx_hash: TransactionHash, hash: &str) -> Result<(serde_json::Value, NodeTransaction)> {
        let raw: serde_json::Value = node::parse(&self.rpc_client.get_transaction(tx_hash).await?, "transação")?;
        if raw.is_null() {
            return Err(Error::NotFound(format!("Transação não encontrada: {}", hash)));
        }
        let tx = serde_json::from_value(raw.clone())
            .map_err(|e| Error::DecodeError(format!("Falha ao deserializar transação: {}", e)))?;
        Ok((raw, tx))
    }

    async fn fetch_receipt(&self, tx_hash: TransactionHash) -> Result<(serde_json::Value, NodeReceipt)> {
        let raw: serde_json::Value = node::parse(&self.rpc_client.get_transaction_receipt(tx_hash).await?, "recibo")?;
        if raw.is_null() {
            return Err(Error::NotFound(format!("Recibo não encontrado: {:?}", tx_hash)));
        }
        let receipt = serde_json::from_value(raw.clone())
            .map_err(|e| Error::DecodeError(format!("Falha ao deserializar recibo: {}", e)))?;
        Ok((raw, receipt))
    }

    /// Saldo em decimal; conta ausente vale zero
    async fn balance_of(&self, address: Option<&str>, block_number: u64) -> Result<String> {
        match address {
            Some(address) => {
                let balance = self.rpc_client.get_balance(node::parse_address(address)?, block_number).await?;
                Ok(balance.to_string())
            }
            None => Ok("0".to_string()),
        }
    }

    async fn has_code(&self, address: Option<&str>, block_number: u64) -> Result<bool> {
        match address {
            Some(address) => {
                let code = self.rpc_client.get_code(node::parse_address(address)?, block_number).await?;
                Ok(!code.is_empty())
            }
            None => Ok(false),
        }
    }
}
