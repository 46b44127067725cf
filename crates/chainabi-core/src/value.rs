//! The argument / result value tree.
//!
//! Encoding is lenient about how a value is spelled: an `address` parameter
//! accepts an [`AbiValue::Address`] or a hex [`AbiValue::String`], a tuple
//! parameter accepts a positional [`AbiValue::Tuple`]/[`AbiValue::Array`] or a
//! named [`AbiValue::Struct`]. Decoding always produces the precise variant.

use alloy_primitives::{Address, Bytes, FixedBytes, B256, I256, U256};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::CodecError;

/// A runtime ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    /// `bytesN`: the word holds the value left-aligned, `usize` is N.
    FixedBytes(B256, usize),
    /// External function pointer: 20-byte address followed by a 4-byte selector.
    Function(FixedBytes<24>),
    Bytes(Bytes),
    String(String),
    Array(Vec<AbiValue>),
    /// Positional tuple
    Tuple(Vec<AbiValue>),
    /// Tuple with named components, in declaration order
    Struct(IndexMap<String, AbiValue>),
}

impl AbiValue {
    /// Build a `bytesN` value from a slice of at most 32 bytes.
    pub fn fixed_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 32 {
            return None;
        }
        let mut word = B256::ZERO;
        word[..bytes.len()].copy_from_slice(bytes);
        Some(AbiValue::FixedBytes(word, bytes.len()))
    }

    /// Short, human-readable name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(..) => "fixed bytes",
            AbiValue::Function(_) => "function",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
            AbiValue::Struct(_) => "struct",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a `bytes`, `bytesN` or `function` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) => Some(b),
            AbiValue::FixedBytes(word, size) => Some(&word[..*size]),
            AbiValue::Function(f) => Some(f.as_slice()),
            _ => None,
        }
    }

    /// Elements of an array or positional tuple.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&IndexMap<String, AbiValue>> {
        match self {
            AbiValue::Struct(m) => Some(m),
            _ => None,
        }
    }

    /// Convert to JSON. Integers become decimal strings, byte values
    /// `0x`-prefixed hex, addresses EIP-55 checksummed strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            AbiValue::Bool(b) => JsonValue::Bool(*b),
            AbiValue::Uint(v) => JsonValue::String(v.to_string()),
            AbiValue::Int(v) => JsonValue::String(v.to_string()),
            AbiValue::Address(a) => JsonValue::String(a.to_checksum(None)),
            AbiValue::FixedBytes(..) | AbiValue::Function(_) | AbiValue::Bytes(_) => {
                JsonValue::String(format!("0x{}", hex::encode(self.as_bytes().unwrap_or_default())))
            }
            AbiValue::String(s) => JsonValue::String(s.clone()),
            AbiValue::Array(v) | AbiValue::Tuple(v) => {
                JsonValue::Array(v.iter().map(AbiValue::to_json).collect())
            }
            AbiValue::Struct(m) => JsonValue::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Build a loose value tree from JSON.
    ///
    /// Strings stay strings (the codec interprets them against the target
    /// type), non-negative integers become `Uint`, negative ones `Int`,
    /// arrays become `Array` and objects `Struct`. Floats and `null` are
    /// rejected.
    pub fn from_json(value: &JsonValue) -> Result<Self, CodecError> {
        match value {
            JsonValue::Bool(b) => Ok(AbiValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(AbiValue::Uint(U256::from(v)))
                } else if let Some(v) = n.as_i64() {
                    Ok(AbiValue::Int(i256_from_i64(v)))
                } else {
                    Err(CodecError::InvalidValue {
                        ty: "number".into(),
                        value: n.to_string(),
                    })
                }
            }
            JsonValue::String(s) => Ok(AbiValue::String(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(AbiValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Array),
            JsonValue::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), AbiValue::from_json(v)?)))
                .collect::<Result<IndexMap<_, _>, CodecError>>()
                .map(AbiValue::Struct),
            JsonValue::Null => Err(CodecError::InvalidValue {
                ty: "value".into(),
                value: "null".into(),
            }),
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            AbiValue::FixedBytes(..) | AbiValue::Function(_) | AbiValue::Bytes(_) => {
                write!(f, "0x{}", hex::encode(self.as_bytes().unwrap_or_default()))
            }
            AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            AbiValue::Struct(m) => {
                let parts: Vec<_> = m.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }
}

impl From<u128> for AbiValue {
    fn from(v: u128) -> Self {
        AbiValue::Uint(U256::from(v))
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<i64> for AbiValue {
    fn from(v: i64) -> Self {
        AbiValue::Int(i256_from_i64(v))
    }
}

/// Sign-extend an `i64` into a 256-bit two's-complement integer.
pub(crate) fn i256_from_i64(v: i64) -> I256 {
    let raw = if v < 0 {
        !U256::from(!(v as u64))
    } else {
        U256::from(v as u64)
    };
    I256::from_raw(raw)
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<Bytes> for AbiValue {
    fn from(v: Bytes) -> Self {
        AbiValue::Bytes(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(v: Vec<AbiValue>) -> Self {
        AbiValue::Array(v)
    }
}
