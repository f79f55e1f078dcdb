use etherscanner_core::{AddressLike, HexAmount};
use serde::{Deserialize, Deserializer, Serialize};

/// Nó da árvore devolvida pelo `callTracer`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNode {
    #[serde(rename = "type", default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub from: AddressLike,
    #[serde(default)]
    pub to: AddressLike,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: HexAmount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Subchamadas em ordem; `None` indica folha
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<CallNode>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CallNode {
    pub fn kind(&self) -> CallType {
        self.call_type.as_deref().map(CallType::from).unwrap_or(CallType::Unknown)
    }

    /// Nome do tipo como veio do node
    pub fn type_name(&self) -> &str {
        self.call_type.as_deref().unwrap_or(CallType::Unknown.as_str())
    }

    /// Nó sem nenhum dado útil (trace vazio devolvido pelo node)
    pub fn is_empty(&self) -> bool {
        self.call_type.is_none()
            && self.from.is_absent()
            && self.to.is_absent()
            && self.value.is_empty()
            && self.input.is_empty()
            && self.calls.is_none()
    }

    /// Quantidade de nós na subárvore, incluindo este
    pub fn node_count(&self) -> usize {
        1 + self
            .calls
            .iter()
            .flatten()
            .map(CallNode::node_count)
            .sum::<usize>()
    }
}

/// Tipo de chamada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Call,
    StaticCall,
    DelegateCall,
    CallCode,
    Create,
    Create2,
    SelfDestruct,
    Unknown,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Call => "CALL",
            CallType::StaticCall => "STATICCALL",
            CallType::DelegateCall => "DELEGATECALL",
            CallType::CallCode => "CALLCODE",
            CallType::Create => "CREATE",
            CallType::Create2 => "CREATE2",
            CallType::SelfDestruct => "SELFDESTRUCT",
            CallType::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for CallType {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CALL" => CallType::Call,
            "STATICCALL" => CallType::StaticCall,
            "DELEGATECALL" => CallType::DelegateCall,
            "CALLCODE" => CallType::CallCode,
            "CREATE" => CallType::Create,
            "CREATE2" => CallType::Create2,
            "SELFDESTRUCT" => CallType::SelfDestruct,
            _ => CallType::Unknown,
        }
    }
}
