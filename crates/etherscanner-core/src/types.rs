/*!
 * Etherscanner Types
 *
 * Tipos comuns usados em toda a workspace Etherscanner
 */

use crate::codec::AddressLike;
use ethereum_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Classificação literal dos eventos de token
pub const TOKEN_EVENT_TYPE: &str = "Token";

/// Tracer padrão do node para árvores de chamadas
pub const CALL_TRACER: &str = "callTracer";

/// Dados da transação usados pelo flattener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionContext {
    pub hash: String,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    #[serde(default)]
    pub from: AddressLike,
    #[serde(default)]
    pub to: AddressLike,
    #[serde(default)]
    pub input: String,
}

impl TransactionContext {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ..Default::default()
        }
    }

    /// Define o bloco da transação
    pub fn with_block(mut self, number: u64, hash: impl Into<String>) -> Self {
        self.block_number = Some(number);
        self.block_hash = Some(hash.into());
        self
    }

    /// Define remetente, destinatário e input
    pub fn with_call(mut self, from: impl Into<AddressLike>, to: impl Into<AddressLike>, input: impl Into<String>) -> Self {
        self.from = from.into();
        self.to = to.into();
        self.input = input.into();
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.block_number.is_some()
    }
}

/// Estado da decodificação de um evento de token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStatus {
    /// Nenhum decodificador configurado, campos ficam nulos
    Undecoded,
    Decoded,
    /// O decodificador falhou para este input
    Failed,
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStatus::Undecoded => write!(f, "undecoded"),
            DecodeStatus::Decoded => write!(f, "decoded"),
            DecodeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Campos presentes apenas em eventos classificados como `Token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCall {
    pub contract: Option<String>,
    pub method: Option<String>,
    pub input: String,
    pub input_decoded: Option<serde_json::Value>,
    pub decode_status: DecodeStatus,
}

/// Movimentação de valor reconstruída a partir do trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    pub hash: String,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Decimal sem perda de precisão. Sempre presente em eventos nativos;
    /// em eventos de token só existe quando o decodificador o informa.
    pub value: Option<String>,
    /// Tipo nativo da chamada (`CALL`, `SELFDESTRUCT`, ...) ou `Token`
    #[serde(rename = "type")]
    pub event_type: String,
    pub is_suicide: bool,
    pub is_internal: bool,
    pub trace_address: i64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenCall>,
}

impl TransferEvent {
    pub fn is_token(&self) -> bool {
        self.event_type == TOKEN_EVENT_TYPE
    }
}

/// Opções enviadas ao `debug_traceTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceOptions {
    pub tracer: String,
    /// Timeout do lado do node, ex.: `"30s"`
    pub timeout: String,
    /// Profundidade de reexecução para traces históricos
    pub reexec: u64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tracer: CALL_TRACER.to_string(),
            timeout: "30s".to_string(),
            reexec: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn native_event() -> TransferEvent {
        TransferEvent {
            hash: "0xabc".into(),
            block_number: Some(10),
            block_hash: Some("0xdef".into()),
            from: Some("0x0000000000000000000000000000000000000001".into()),
            to: Some("0x0000000000000000000000000000000000000002".into()),
            value: Some("1000".into()),
            event_type: "CALL".into(),
            is_suicide: false,
            is_internal: false,
            trace_address: -1,
            token: None,
        }
    }

    #[test]
    fn test_native_event_shape() {
        let value = serde_json::to_value(native_event()).unwrap();
        assert_eq!(value["type"], "CALL");
        assert_eq!(value["isInternal"], false);
        assert_eq!(value["traceAddress"], -1);
        assert_eq!(value["blockNumber"], 10);
        assert!(value.get("contract").is_none());
        assert!(value.get("inputDecoded").is_none());
    }

    #[test]
    fn test_token_event_shape() {
        let mut event = native_event();
        event.event_type = TOKEN_EVENT_TYPE.into();
        event.value = None;
        event.is_internal = true;
        event.token = Some(TokenCall {
            contract: Some("0x0000000000000000000000000000000000000003".into()),
            method: None,
            input: "0xa9059cbb".into(),
            input_decoded: None,
            decode_status: DecodeStatus::Undecoded,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "Token");
        assert_eq!(value["contract"], "0x0000000000000000000000000000000000000003");
        assert_eq!(value["method"], serde_json::Value::Null);
        assert_eq!(value["decodeStatus"], "undecoded");
        assert!(event.is_token());

        let back: TransferEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_trace_options_serialization() {
        let options = TraceOptions { reexec: 42, ..Default::default() };
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            json!({"tracer": "callTracer", "timeout": "30s", "reexec": 42})
        );
    }

    #[test]
    fn test_transaction_context_builder() {
        let tx = TransactionContext::new("0x01")
            .with_block(7, "0x02")
            .with_call("0xaa", None::<String>, "0x");
        assert!(tx.is_confirmed());
        assert_eq!(tx.block_number, Some(7));
        assert_eq!(tx.to, AddressLike::Absent);
    }
}
