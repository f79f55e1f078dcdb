use serde::{Deserialize, Serialize};

/// Resultado da decodificação do input de uma chamada de token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Nome do método, ex.: `transfer`
    pub method: String,
    /// Parâmetros decodificados
    pub params: serde_json::Value,
    /// Destinatário extraído dos parâmetros, quando houver
    pub to: Option<String>,
    /// Quantidade em decimal, quando houver
    pub value: Option<String>,
}

/// Capacidade de decodificação de chamadas de contrato
///
/// Construída uma única vez pelo chamador (com o registro de ABIs que
/// precisar) e compartilhada como `Arc<dyn CallDecoder>`.
pub trait CallDecoder: Send + Sync {
    /// `Ok(None)` quando o contrato não é conhecido pelo decodificador.
    fn decode(&self, contract: &str, input: &str) -> Result<Option<DecodedCall>, String>;
}
