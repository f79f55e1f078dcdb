use thiserror::Error;

/// Falhas de varredura e de acesso ao node
///
/// Trace indisponível não aparece aqui: vira árvore ausente em `TraceSource`.
#[derive(Error, Debug)]
pub enum Error {
    /// Transporte ou resposta de erro do node
    #[error("Erro de RPC: {0}")]
    RpcError(String),

    /// JSON do node ilegível ou hash malformado
    #[error("Erro de decodificação: {0}")]
    DecodeError(String),

    /// Parâmetros ou respostas que não puderam ser serializados
    #[error("Erro de codificação: {0}")]
    EncodeError(String),

    /// Configuração ou endpoint inválido
    #[error("Erro de validação: {0}")]
    ValidationError(String),

    /// Busca de trace acima do limite do cliente
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Bloco, transação ou recibo desconhecido pelo node
    #[error("Não encontrado: {0}")]
    NotFound(String),

    /// Transação ainda sem bloco, não existe trace possível
    #[error("Transação não confirmada: {0}")]
    UnconfirmedTransaction(String),
}

impl Error {
    /// Verdadeiro para erros que dizem respeito à transação pedida, e não
    /// ao node ou à configuração
    pub fn is_transaction_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::UnconfirmedTransaction(_))
    }
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnconfirmedTransaction("0xabc".into());
        assert_eq!(err.to_string(), "Transação não confirmada: 0xabc");

        let err = Error::RpcError("connection refused".into());
        assert_eq!(err.to_string(), "Erro de RPC: connection refused");
    }

    #[test]
    fn test_transaction_errors() {
        assert!(Error::NotFound("0x01".into()).is_transaction_error());
        assert!(Error::UnconfirmedTransaction("0x01".into()).is_transaction_error());
        assert!(!Error::TimeoutError("35000 ms".into()).is_transaction_error());
        assert!(!Error::ValidationError("endpoint".into()).is_transaction_error());
    }
}
