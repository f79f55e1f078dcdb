/*!
 * Etherscanner
 *
 * Varredura de blocos e transações Ethereum. Para cada transação reconstrói,
 * a partir do call trace do node, a transferência principal e todas as
 * transferências internas, junto com recibo e saldos das contas envolvidas.
 */

mod config;
mod node;
mod report;
mod scanner;

pub use config::{
    ScannerConfig, ScannerConfigBuilder, DEFAULT_CONCURRENCY, ENV_CONCURRENCY, ENV_RPC_URL, ENV_TRACE_TIMEOUT,
};
pub use report::{AccountSnapshot, BlockScan, TransactionReport, TransactionScan, NO_ADDRESS};
pub use scanner::EtherScanner;

pub use etherscanner_core::{error::Result, Error, TransactionContext, TransferEvent};
pub use etherscanner_rpc::{EtherscannerRpcClient, RpcConfig};
pub use etherscanner_trace::{CallDecoder, DecodeIssue, DecodedCall, Flattened, TraceConfig};
