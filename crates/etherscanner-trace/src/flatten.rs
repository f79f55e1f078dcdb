/*!
 * Achatamento da árvore de chamadas
 *
 * Percorre a árvore do `callTracer` em profundidade e produz a lista plana de
 * eventos de transferência. Cada nó passa pela política abaixo, em ordem:
 *
 * 1. valor positivo: evento nativo com os dados do próprio nó
 * 2. senão, nó com subchamadas: um evento `Token` por filho direto com input
 *    longo (chamadas em lote)
 * 3. senão, `STATICCALL` não gera nada; qualquer outro tipo gera um evento
 *    `Token` a partir do próprio nó
 *
 * Depois disso os filhos são visitados recursivamente. O contador de
 * `traceAddress` começa em -1 na raiz, avança uma vez por filho examinado no
 * passo 2 e uma vez por filho visitado, e é passado por valor: cresce ao longo
 * de um caminho mas não é único entre ramos.
 */

use crate::decoder::CallDecoder;
use crate::trace::{CallNode, CallType};
use etherscanner_core::{
    AddressCodec, AddressLike, AmountCodec, DecodeStatus, TokenCall, TransactionContext, TransferEvent,
    TOKEN_EVENT_TYPE,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Comprimento mínimo do input (com `0x`) para um filho de chamada em lote
/// virar evento `Token`
pub const MIN_TOKEN_INPUT_LEN: usize = 140;

/// `traceAddress` da chamada raiz
pub const ROOT_TRACE_ADDRESS: i64 = -1;

/// Problema encontrado ao montar um evento
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecodeIssue {
    /// Chamada de token sem endereço de contrato; o evento é descartado
    #[error("Chamada de token sem endereço de contrato (traceAddress {trace_address})")]
    MissingContract {
        #[serde(rename = "traceAddress")]
        trace_address: i64,
    },
    /// O decodificador falhou; o evento é mantido com status `failed`
    #[error("Falha ao decodificar chamada para {contract} (traceAddress {trace_address}): {reason}")]
    Decoder {
        contract: String,
        #[serde(rename = "traceAddress")]
        trace_address: i64,
        reason: String,
    },
}

/// Eventos de uma transação e os problemas encontrados ao gerá-los
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flattened {
    pub events: Vec<TransferEvent>,
    pub issues: Vec<DecodeIssue>,
}

impl Flattened {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Verdadeiro se algum evento é interno
    pub fn has_internal(&self) -> bool {
        self.events.iter().any(|event| event.is_internal)
    }
}

/// Converte árvores de chamadas em eventos de transferência
#[derive(Clone, Default)]
pub struct TraceFlattener {
    decoder: Option<Arc<dyn CallDecoder>>,
}

impl TraceFlattener {
    /// Flattener sem decodificação: eventos `Token` saem com status `undecoded`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder(decoder: Arc<dyn CallDecoder>) -> Self {
        Self { decoder: Some(decoder) }
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Achata a árvore de uma transação. Árvore ausente produz lista vazia.
    pub fn flatten(&self, tx: &TransactionContext, root: Option<&CallNode>) -> Flattened {
        let mut out = Flattened::default();
        match root {
            Some(node) => self.visit(tx, node, ROOT_TRACE_ADDRESS, false, &mut out),
            None => debug!(tx = %tx.hash, "Trace ausente, nenhum evento gerado"),
        }
        out
    }

    fn visit(&self, tx: &TransactionContext, node: &CallNode, mut counter: i64, is_internal: bool, out: &mut Flattened) {
        if AmountCodec::is_positive(&node.value) {
            out.events.push(self.value_event(tx, node, counter, is_internal));
        } else if let Some(children) = &node.calls {
            debug!(tx = %tx.hash, children = children.len(), "Chamada em lote");
            for child in children {
                let built = self.batch_event(tx, node, child, counter);
                self.record(tx, built, out);
                counter += 1;
            }
        } else {
            let built = self.single_event(tx, node, counter);
            self.record(tx, built, out);
        }

        for child in node.calls.iter().flatten() {
            counter += 1;
            self.visit(tx, child, counter, true, out);
        }
    }

    fn value_event(&self, tx: &TransactionContext, node: &CallNode, trace_address: i64, is_internal: bool) -> TransferEvent {
        TransferEvent {
            hash: tx.hash.clone(),
            block_number: tx.block_number,
            block_hash: tx.block_hash.clone(),
            from: AddressCodec::normalize(&node.from),
            to: AddressCodec::normalize(&node.to),
            value: Some(AmountCodec::parse_quantity(node.value.as_str()).to_string()),
            event_type: node.type_name().to_string(),
            is_suicide: node.kind() == CallType::SelfDestruct,
            is_internal,
            trace_address,
            token: None,
        }
    }

    fn batch_event(
        &self,
        tx: &TransactionContext,
        parent: &CallNode,
        child: &CallNode,
        counter: i64,
    ) -> Result<Option<TransferEvent>, DecodeIssue> {
        if child.input.len() < MIN_TOKEN_INPUT_LEN {
            return Ok(None);
        }
        let is_suicide = child.kind() == CallType::SelfDestruct;
        self.token_event(tx, &parent.to, &child.to, &child.input, counter.abs(), is_suicide).map(Some)
    }

    fn single_event(&self, tx: &TransactionContext, node: &CallNode, counter: i64) -> Result<Option<TransferEvent>, DecodeIssue> {
        if node.kind() == CallType::StaticCall {
            return Ok(None);
        }

        // Trace vazio: usa os dados da própria transação
        let (from, contract, input) = if node.is_empty() {
            (&tx.from, &tx.to, tx.input.as_str())
        } else {
            (&node.from, &node.to, node.input.as_str())
        };
        let is_suicide = node.kind() == CallType::SelfDestruct;
        self.token_event(tx, from, contract, input, counter.abs(), is_suicide).map(Some)
    }

    fn token_event(
        &self,
        tx: &TransactionContext,
        from: &AddressLike,
        contract: &AddressLike,
        input: &str,
        trace_address: i64,
        is_suicide: bool,
    ) -> Result<TransferEvent, DecodeIssue> {
        let contract = AddressCodec::normalize(contract).ok_or(DecodeIssue::MissingContract { trace_address })?;

        Ok(TransferEvent {
            hash: tx.hash.clone(),
            block_number: tx.block_number,
            block_hash: tx.block_hash.clone(),
            from: AddressCodec::normalize(from),
            to: None,
            value: None,
            event_type: TOKEN_EVENT_TYPE.to_string(),
            is_suicide,
            is_internal: true,
            trace_address,
            token: Some(TokenCall {
                contract: Some(contract),
                method: None,
                input: input.to_string(),
                input_decoded: None,
                decode_status: DecodeStatus::Undecoded,
            }),
        })
    }

    fn record(&self, tx: &TransactionContext, built: Result<Option<TransferEvent>, DecodeIssue>, out: &mut Flattened) {
        match built {
            Ok(Some(mut event)) => {
                if let Some(issue) = self.decode(&mut event) {
                    warn!(tx = %tx.hash, %issue, "Evento de token sem decodificação");
                    out.issues.push(issue);
                }
                out.events.push(event);
            }
            Ok(None) => {}
            Err(issue) => {
                warn!(tx = %tx.hash, %issue, "Evento de token descartado");
                out.issues.push(issue);
            }
        }
    }

    /// Preenche os campos decodificados de um evento `Token`
    fn decode(&self, event: &mut TransferEvent) -> Option<DecodeIssue> {
        let decoder = self.decoder.as_ref()?;
        let trace_address = event.trace_address;
        let token = event.token.as_mut()?;
        let contract = token.contract.clone()?;

        match decoder.decode(&contract, &token.input) {
            Ok(Some(decoded)) => {
                token.method = Some(decoded.method);
                token.input_decoded = Some(decoded.params);
                token.decode_status = DecodeStatus::Decoded;
                event.to = decoded.to.and_then(|to| AddressCodec::normalize(&AddressLike::Raw(to)));
                event.value = decoded.value;
                None
            }
            Ok(None) => None,
            Err(reason) => {
                token.decode_status = DecodeStatus::Failed;
                Some(DecodeIssue::Decoder {
                    contract,
                    trace_address,
                    reason,
                })
            }
        }
    }
}
