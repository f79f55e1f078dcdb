//! Visões mínimas dos objetos JSON devolvidos pelo node.
//!
//! Só os campos usados pelo scanner são lidos; o objeto completo segue
//! intacto como `serde_json::Value` nos resultados.

use ethereum_types::Address;
use etherscanner_core::{error::Result, AddressLike, AmountCodec, Error, TransactionContext};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransaction {
    pub hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub from: AddressLike,
    #[serde(default)]
    pub to: AddressLike,
    #[serde(default)]
    pub input: Option<String>,
}

impl NodeTransaction {
    pub fn block_number(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(AmountCodec::to_integer)
    }

    pub fn context(&self) -> TransactionContext {
        TransactionContext {
            hash: self.hash.clone(),
            block_number: self.block_number(),
            block_hash: self.block_hash.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            input: self.input.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReceipt {
    #[serde(default)]
    pub contract_address: Option<String>,
}

impl NodeReceipt {
    pub fn created_contract(&self) -> bool {
        self.contract_address.as_deref().is_some_and(|addr| !addr.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeBlock {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub transactions: Vec<String>,
}

impl NodeBlock {
    pub fn timestamp(&self) -> u64 {
        self.timestamp.as_deref().and_then(AmountCodec::to_integer).unwrap_or_default()
    }
}

/// Desserializa a resposta bruta do provider
pub fn parse<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::DecodeError(format!("Falha ao deserializar {}: {}", what, e)))
}

/// Converte um endereço normalizado para consulta RPC
pub fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address.trim_start_matches("0x"))
        .map_err(|e| Error::DecodeError(format!("Endereço inválido '{}': {}", address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_context() {
        let raw = json!({
            "hash": "0xabc",
            "blockNumber": "0x10",
            "blockHash": "0xdef",
            "from": "0x0000000000000000000000000000000000000001",
            "to": null,
            "input": "0x60806040",
            "gas": "0x5208"
        });
        let tx: NodeTransaction = serde_json::from_value(raw).unwrap();
        let ctx = tx.context();

        assert_eq!(ctx.block_number, Some(16));
        assert!(ctx.to.is_absent());
        assert_eq!(ctx.input, "0x60806040");
    }

    #[test]
    fn test_pending_transaction_has_no_block() {
        let tx: NodeTransaction = serde_json::from_value(json!({"hash": "0x1", "blockNumber": null})).unwrap();
        assert_eq!(tx.block_number(), None);
        assert!(!tx.context().is_confirmed());
    }

    #[test]
    fn test_receipt_contract_creation() {
        let receipt: NodeReceipt = serde_json::from_value(json!({"contractAddress": null})).unwrap();
        assert!(!receipt.created_contract());
        let receipt: NodeReceipt =
            serde_json::from_value(json!({"contractAddress": "0x0000000000000000000000000000000000000009"})).unwrap();
        assert!(receipt.created_contract());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(
            parse_address("0x0000000000000000000000000000000000000001").unwrap(),
            Address::from_low_u64_be(1)
        );
        assert!(parse_address("0x01").is_err());
    }
}
