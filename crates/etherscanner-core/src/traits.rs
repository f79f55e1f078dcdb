/*!
 * Etherscanner Traits
 *
 * Traits comuns usados em toda a workspace Etherscanner
 */

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{TraceOptions, TransactionHash};
use ethereum_types::{Address, U256};

/// Trait para provedores RPC
///
/// Os métodos que devolvem `Vec<u8>` entregam o JSON bruto do node; cada
/// consumidor desserializa no tipo que precisa.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Obtém o trace de uma transação (`debug_traceTransaction`)
    async fn get_transaction_trace(&self, tx_hash: TransactionHash, options: TraceOptions) -> Result<Vec<u8>>;

    /// Obtém uma transação pelo hash
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Vec<u8>>;

    /// Obtém o recibo de uma transação
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Vec<u8>>;

    /// Obtém um bloco com apenas os hashes das transações
    async fn get_block(&self, block_number: u64) -> Result<Vec<u8>>;

    /// Obtém o saldo de um endereço na altura indicada
    async fn get_balance(&self, address: Address, block_number: u64) -> Result<U256>;

    /// Obtém o código de um contrato na altura indicada
    async fn get_code(&self, address: Address, block_number: u64) -> Result<Vec<u8>>;

    /// Obtém o número do bloco atual
    async fn get_block_number(&self) -> Result<u64>;
}
