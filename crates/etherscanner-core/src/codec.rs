/*!
 * Etherscanner Codecs
 *
 * Normalização de endereços e quantidades hexadecimais devolvidas pelo node.
 * Os campos de trace chegam com formatos inconsistentes (booleanos no lugar de
 * endereços, hex truncado, endereços sem padding) e nenhuma das rotinas abaixo
 * falha: o pior caso é um sentinela ou um valor com padding de melhor esforço.
 */

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Tamanho de um endereço completo com prefixo `0x` (20 bytes)
pub const ADDRESS_LENGTH: usize = 42;

/// Sentinela usado quando o campo de endereço traz `true`
pub const FLAG_TRUE_ADDRESS: &str = "0x01";

/// Sentinela usado quando o campo de endereço traz `false`
pub const FLAG_FALSE_ADDRESS: &str = "0x00";

/// Valor de endereço como recebido do node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressLike {
    /// Campo que codifica uma flag em vez de um endereço
    Flag(bool),
    /// Texto hexadecimal em qualquer formato
    Raw(String),
    /// Sem destinatário (ex.: criação de contrato)
    #[default]
    Absent,
}

impl AddressLike {
    pub fn is_absent(&self) -> bool {
        matches!(self, AddressLike::Absent)
    }

    /// Atalho para [`AddressCodec::normalize`]
    pub fn normalize(&self) -> Option<String> {
        AddressCodec::normalize(self)
    }
}

impl From<&str> for AddressLike {
    fn from(s: &str) -> Self {
        AddressLike::Raw(s.to_string())
    }
}

impl From<String> for AddressLike {
    fn from(s: String) -> Self {
        AddressLike::Raw(s)
    }
}

impl From<bool> for AddressLike {
    fn from(b: bool) -> Self {
        AddressLike::Flag(b)
    }
}

impl<T: Into<AddressLike>> From<Option<T>> for AddressLike {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Quantidade hexadecimal como recebida do node, possivelmente malformada
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexAmount(pub String);

impl HexAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for HexAmount {
    fn from(s: &str) -> Self {
        HexAmount(s.to_string())
    }
}

impl From<String> for HexAmount {
    fn from(s: String) -> Self {
        HexAmount(s)
    }
}

/// Verifica se o texto já tem forma de endereço: `0x` seguido de 40 caracteres alfanuméricos.
/// A verificação é de prefixo, caracteres extras depois dos 40 são aceitos.
pub fn looks_like_address(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= ADDRESS_LENGTH
        && value.starts_with("0x")
        && bytes[2..ADDRESS_LENGTH].iter().all(u8::is_ascii_alphanumeric)
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Canonicalização de endereços
pub struct AddressCodec;

impl AddressCodec {
    /// Normaliza um valor de endereço.
    ///
    /// - ausente (ou texto vazio) continua ausente
    /// - endereço bem formado é devolvido sem alteração
    /// - booleano vira `0x01` / `0x00`
    /// - qualquer outro texto é tratado como escalar hex: minúsculas, sem prefixo,
    ///   com zeros à esquerda até 42 caracteres. Nunca trunca.
    pub fn normalize(value: &AddressLike) -> Option<String> {
        match value {
            AddressLike::Absent => None,
            AddressLike::Flag(true) => Some(FLAG_TRUE_ADDRESS.to_string()),
            AddressLike::Flag(false) => Some(FLAG_FALSE_ADDRESS.to_string()),
            AddressLike::Raw(raw) if raw.is_empty() => None,
            AddressLike::Raw(raw) if looks_like_address(raw) => Some(raw.clone()),
            AddressLike::Raw(raw) => Some(Self::pad(raw)),
        }
    }

    fn pad(raw: &str) -> String {
        let lower = raw.to_lowercase();
        let digits = strip_hex_prefix(&lower);
        format!("0x{:0>width$}", digits, width = ADDRESS_LENGTH - 2)
    }
}

/// Conversão de quantidades hex para inteiros de precisão arbitrária
pub struct AmountCodec;

impl AmountCodec {
    /// Interpreta uma quantidade hex de forma permissiva.
    ///
    /// Usa a maior sequência inicial de dígitos hex após o prefixo; o restante é
    /// ignorado. Sequência vazia vale zero.
    pub fn parse_quantity(value: &str) -> BigUint {
        let digits = strip_hex_prefix(value.trim());
        let end = digits
            .bytes()
            .position(|b| !b.is_ascii_hexdigit())
            .unwrap_or(digits.len());

        // Um nibble zero na frente garante entrada não vazia
        let mut padded = Vec::with_capacity(end + 1);
        padded.push(b'0');
        padded.extend_from_slice(&digits.as_bytes()[..end]);

        BigUint::parse_bytes(&padded, 16).unwrap_or_default()
    }

    /// Converte para decimal sem perda de precisão.
    ///
    /// Texto vazio devolve `None`. Um valor com forma de endereço é devolvido sem
    /// alteração, proteção contra troca de campos no trace.
    pub fn to_decimal(value: &HexAmount) -> Option<String> {
        if value.is_empty() {
            return None;
        }
        if looks_like_address(value.as_str()) {
            return Some(value.as_str().to_string());
        }
        Some(Self::parse_quantity(value.as_str()).to_string())
    }

    /// Converte para um inteiro nativo (números de bloco, offsets).
    /// `None` para texto vazio, forma de endereço ou valor que não cabe em `u64`.
    pub fn to_integer(value: &str) -> Option<u64> {
        if value.trim().is_empty() || looks_like_address(value) {
            return None;
        }
        u64::try_from(&Self::parse_quantity(value)).ok()
    }

    /// Verdadeiro quando a quantidade é estritamente positiva
    pub fn is_positive(value: &HexAmount) -> bool {
        Self::parse_quantity(value.as_str()).bits() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_flags() {
        assert_eq!(AddressCodec::normalize(&true.into()).as_deref(), Some("0x01"));
        assert_eq!(AddressCodec::normalize(&false.into()).as_deref(), Some("0x00"));
    }

    #[test]
    fn test_normalize_well_formed_unchanged() {
        let addr = format!("0x{}", "a".repeat(40));
        assert_eq!(AddressCodec::normalize(&addr.as_str().into()), Some(addr.clone()));

        let mixed = "0xF977814e90dA44bFA03b6295A0616a897441aceC";
        assert_eq!(AddressCodec::normalize(&mixed.into()).as_deref(), Some(mixed));
    }

    #[test]
    fn test_normalize_pads_short_values() {
        let out = AddressCodec::normalize(&"abc".into()).unwrap();
        assert_eq!(out.len(), ADDRESS_LENGTH);
        assert!(out.starts_with("0x"));
        assert!(out.ends_with("abc"));
        assert_eq!(&out[2..39], "0".repeat(37));

        let out = AddressCodec::normalize(&"0X1F".into()).unwrap();
        assert_eq!(out, format!("0x{}1f", "0".repeat(38)));
    }

    #[test]
    fn test_normalize_absent_and_empty() {
        assert_eq!(AddressCodec::normalize(&AddressLike::Absent), None);
        assert_eq!(AddressCodec::normalize(&"".into()), None);
        assert_eq!(AddressCodec::normalize(&AddressLike::from(None::<String>)), None);
    }

    #[test]
    fn test_normalize_never_truncates() {
        let long = "1".repeat(45);
        let out = AddressCodec::normalize(&long.as_str().into()).unwrap();
        assert_eq!(out, format!("0x{}", long));
    }

    #[test]
    fn test_address_like_deserialization() {
        let v: AddressLike = serde_json::from_str("true").unwrap();
        assert_eq!(v, AddressLike::Flag(true));
        let v: AddressLike = serde_json::from_str("\"0x1\"").unwrap();
        assert_eq!(v, AddressLike::Raw("0x1".into()));
        let v: AddressLike = serde_json::from_str("null").unwrap();
        assert_eq!(v, AddressLike::Absent);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(AmountCodec::to_decimal(&"0x0".into()).as_deref(), Some("0"));
        assert_eq!(
            AmountCodec::to_decimal(&"0x2386f26fc10000".into()).as_deref(),
            Some("10000000000000000")
        );
        assert_eq!(AmountCodec::to_decimal(&"".into()), None);
    }

    #[test]
    fn test_to_decimal_beyond_256_bits() {
        // 2^260
        let hex = format!("0x1{}", "0".repeat(65));
        let expected = "1852673427797059126777135760139006525652319754650249024631321344126610074238976";
        assert_eq!(AmountCodec::to_decimal(&hex.as_str().into()).as_deref(), Some(expected));
    }

    #[test]
    fn test_to_decimal_address_shaped_is_returned_as_is() {
        let addr = "0x0000000000000000000000000000000000000abc";
        assert_eq!(AmountCodec::to_decimal(&addr.into()).as_deref(), Some(addr));
    }

    #[test]
    fn test_parse_quantity_malformed() {
        assert_eq!(AmountCodec::parse_quantity("0x1fzz").to_string(), "31");
        assert_eq!(AmountCodec::parse_quantity("0x").to_string(), "0");
        assert_eq!(AmountCodec::parse_quantity("zz").to_string(), "0");
        assert_eq!(AmountCodec::parse_quantity("ff").to_string(), "255");
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(AmountCodec::to_integer("0x10"), Some(16));
        assert_eq!(AmountCodec::to_integer(""), None);
        assert_eq!(AmountCodec::to_integer(&format!("0x{}", "f".repeat(20))), None);
        assert_eq!(AmountCodec::to_integer(&format!("0x{}", "1".repeat(40))), None);
    }

    #[test]
    fn test_is_positive() {
        assert!(AmountCodec::is_positive(&"0x1".into()));
        assert!(!AmountCodec::is_positive(&"0x0".into()));
        assert!(!AmountCodec::is_positive(&"".into()));
        assert!(!AmountCodec::is_positive(&"garbage".into()));
    }
}
