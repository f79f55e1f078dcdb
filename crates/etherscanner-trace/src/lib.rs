/*!
 * Etherscanner Trace
 *
 * Reconstrução das movimentações de valor de uma transação a partir do
 * call trace do node: a transferência principal e todas as transferências
 * internas disparadas pela execução de contratos.
 */

mod config;
mod decoder;
mod flatten;
mod source;
mod trace;

pub use config::TraceConfig;
pub use decoder::{CallDecoder, DecodedCall};
pub use flatten::{DecodeIssue, Flattened, TraceFlattener, MIN_TOKEN_INPUT_LEN, ROOT_TRACE_ADDRESS};
pub use source::{parse_hash, TraceSource};
pub use trace::{CallNode, CallType};
