use chrono::{DateTime, TimeZone, Utc};
use etherscanner_core::TransferEvent;
use etherscanner_trace::{DecodeIssue, Flattened};
use serde::Serialize;

/// Valor usado em `address` quando a transação não tem destinatário
pub const NO_ADDRESS: &str = "none";

/// Estado de uma conta na altura do bloco da transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub block_number: u64,
    pub address: String,
    /// Saldo em wei, decimal
    pub balance: String,
    /// Timestamp do bloco em segundos
    pub timestamp: u64,
    pub datetime: Option<DateTime<Utc>>,
    /// Só informado para o destinatário
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_contract: Option<bool>,
}

impl AccountSnapshot {
    pub fn new(block_number: u64, address: Option<String>, balance: String, timestamp: u64) -> Self {
        Self {
            block_number,
            address: address.unwrap_or_else(|| NO_ADDRESS.to_string()),
            balance,
            timestamp,
            datetime: i64::try_from(timestamp)
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            is_contract: None,
        }
    }

    pub fn with_contract_flag(mut self, is_contract: bool) -> Self {
        self.is_contract = Some(is_contract);
        self
    }
}

/// Resultado completo do processamento de uma transação dentro de um bloco
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionScan {
    pub hash: String,
    /// Objeto da transação como devolvido pelo node
    pub transaction: serde_json::Value,
    pub scan: Vec<TransferEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DecodeIssue>,
    pub receipt: serde_json::Value,
    /// Verdadeiro se algum evento é interno
    pub is_internal: bool,
    pub to_account: AccountSnapshot,
    pub from_account: AccountSnapshot,
}

/// Resultado de uma transação sem os saldos das contas
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    pub hash: String,
    pub transaction: serde_json::Value,
    pub transfers: Vec<TransferEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DecodeIssue>,
    pub receipt: serde_json::Value,
    pub is_internal: bool,
}

impl TransactionReport {
    pub fn new(hash: String, transaction: serde_json::Value, flattened: Flattened, receipt: serde_json::Value) -> Self {
        let is_internal = flattened.has_internal();
        Self {
            hash,
            transaction,
            transfers: flattened.events,
            issues: flattened.issues,
            receipt,
            is_internal,
        }
    }
}

/// Resultado da varredura de um bloco
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockScan {
    pub number: u64,
    /// Objeto do bloco como devolvido pelo node; `null` se o bloco não existe
    pub block: serde_json::Value,
    /// Na mesma ordem das transações do bloco
    pub transactions: Vec<TransactionScan>,
    /// Hashes cujo processamento falhou
    pub failed: Vec<String>,
}

impl BlockScan {
    pub fn empty(number: u64) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Todos os eventos do bloco, na ordem das transações
    pub fn events(&self) -> impl Iterator<Item = &TransferEvent> {
        self.transactions.iter().flat_map(|tx| tx.scan.iter())
    }
}
