//! The ABI type model.
//!
//! Solidity ABI types form a small, closed, recursively nested set: a handful
//! of elementary types plus tuples and arrays wrapping arbitrary subtypes.
//! They are modelled as a single enum so the codec can be one exhaustive match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SignatureError;
use crate::signature::split_top_level;

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// 20-byte account address
    Address,
    Bool,
    /// UTF-8 string (dynamic)
    String,
    /// Variable-length byte array (dynamic)
    Bytes,
    /// `bytes1` .. `bytes32`. Length in bytes.
    FixedBytes(usize),
    /// `uint8` .. `uint256`. Width in bits.
    Uint(usize),
    /// `int8` .. `int256`. Width in bits.
    Int(usize),
    /// External function pointer: address ++ selector (24 bytes)
    Function,
    /// Tuple / struct, with named or anonymous components
    Tuple(Vec<AbiParameter>),
    /// `T[]` when `len` is `None`, `T[N]` otherwise
    Array {
        element: Box<AbiType>,
        len: Option<usize>,
    },
}

impl AbiType {
    /// Dynamic array `T[]`.
    pub fn array(element: AbiType) -> Self {
        AbiType::Array {
            element: Box::new(element),
            len: None,
        }
    }

    /// Fixed-size array `T[N]`.
    pub fn fixed_array(element: AbiType, len: usize) -> Self {
        AbiType::Array {
            element: Box::new(element),
            len: Some(len),
        }
    }

    /// Returns `true` if the encoded width of this type depends on the value.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::String | AbiType::Bytes => true,
            AbiType::Array { len: None, .. } => true,
            AbiType::Array {
                element,
                len: Some(_),
            } => element.is_dynamic(),
            AbiType::Tuple(components) => components.iter().any(|c| c.ty.is_dynamic()),
            _ => false,
        }
    }

    /// Encoded width of a static type, `None` for dynamic types and for
    /// widths that do not fit in `usize`.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            AbiType::String | AbiType::Bytes | AbiType::Array { len: None, .. } => None,
            AbiType::Array {
                element,
                len: Some(n),
            } => element.static_size().and_then(|s| s.checked_mul(*n)),
            AbiType::Tuple(components) => components
                .iter()
                .try_fold(0usize, |acc, c| acc.checked_add(c.ty.static_size()?)),
            _ => Some(32),
        }
    }

    /// Number of bytes this type occupies in its parent's head section:
    /// the inline width for static types, one offset word for dynamic ones.
    pub fn head_size(&self) -> usize {
        self.static_size().unwrap_or(32)
    }

    /// Tuple components, looking through any array nesting.
    pub fn components(&self) -> Option<&[AbiParameter]> {
        match self {
            AbiType::Tuple(c) => Some(c),
            AbiType::Array { element, .. } => element.components(),
            _ => None,
        }
    }

    /// The innermost non-array type and the array suffix wrapped around it,
    /// e.g. `(uint256,bool)[2][]` → (`(uint256,bool)`, `"[2][]"`).
    pub fn split_array_suffix(&self) -> (&AbiType, String) {
        match self {
            AbiType::Array { element, len } => {
                let (base, mut suffix) = element.split_array_suffix();
                match len {
                    Some(n) => suffix.push_str(&format!("[{n}]")),
                    None => suffix.push_str("[]"),
                }
                (base, suffix)
            }
            other => (other, String::new()),
        }
    }

    /// The `type` string used by Solidity ABI JSON, where tuples are spelled
    /// `tuple` and their shape lives in `components`.
    pub fn json_type(&self) -> String {
        let (base, suffix) = self.split_array_suffix();
        match base {
            AbiType::Tuple(_) => format!("tuple{suffix}"),
            other => format!("{other}{suffix}"),
        }
    }

    /// Build a type from an ABI JSON `type` string plus its `components`.
    pub fn from_json_type(
        ty: &str,
        components: Option<Vec<AbiParameter>>,
    ) -> Result<Self, SignatureError> {
        let ty = ty.trim();
        match ty.strip_prefix("tuple") {
            Some(suffix) if suffix.is_empty() || suffix.starts_with('[') => {
                let components = components.ok_or_else(|| SignatureError::InvalidParameter {
                    param: ty.to_string(),
                    reason: "tuple type without components".into(),
                })?;
                apply_array_suffix(AbiType::Tuple(components), suffix)
            }
            _ => ty.parse(),
        }
    }

    /// Parse an elementary type token (no array suffix, no tuple).
    pub fn elementary(token: &str) -> Result<Self, SignatureError> {
        let unknown = || SignatureError::UnknownType {
            ty: token.to_string(),
        };
        match token {
            "address" => Ok(AbiType::Address),
            "bool" => Ok(AbiType::Bool),
            "string" => Ok(AbiType::String),
            "bytes" => Ok(AbiType::Bytes),
            "function" => Ok(AbiType::Function),
            "byte" => Ok(AbiType::FixedBytes(1)),
            "uint" => Ok(AbiType::Uint(256)),
            "int" => Ok(AbiType::Int(256)),
            _ => {
                if let Some(bits) = token.strip_prefix("uint") {
                    let bits = parse_digits(bits).ok_or_else(unknown)?;
                    check_int_width(bits).ok_or_else(unknown)?;
                    Ok(AbiType::Uint(bits))
                } else if let Some(bits) = token.strip_prefix("int") {
                    let bits = parse_digits(bits).ok_or_else(unknown)?;
                    check_int_width(bits).ok_or_else(unknown)?;
                    Ok(AbiType::Int(bits))
                } else if let Some(size) = token.strip_prefix("bytes") {
                    let size = parse_digits(size).ok_or_else(unknown)?;
                    if (1..=32).contains(&size) {
                        Ok(AbiType::FixedBytes(size))
                    } else {
                        Err(unknown())
                    }
                } else {
                    Err(unknown())
                }
            }
        }
    }
}

fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn check_int_width(bits: usize) -> Option<()> {
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(())
}

/// Wrap `base` in the array dimensions spelled by `suffix` (`"[2][]"`),
/// innermost dimension first.
pub(crate) fn apply_array_suffix(base: AbiType, suffix: &str) -> Result<AbiType, SignatureError> {
    let mut ty = base;
    let mut rest = suffix.trim();
    while !rest.is_empty() {
        let invalid = || SignatureError::UnknownType {
            ty: suffix.to_string(),
        };
        let inner_end = rest.find(']').ok_or_else(invalid)?;
        if !rest.starts_with('[') {
            return Err(invalid());
        }
        let dim = rest[1..inner_end].trim();
        let len = if dim.is_empty() {
            None
        } else {
            Some(parse_digits(dim).ok_or_else(invalid)?)
        };
        ty = AbiType::Array {
            element: Box::new(ty),
            len,
        };
        rest = rest[inner_end + 1..].trim_start();
    }
    Ok(ty)
}

impl FromStr for AbiType {
    type Err = SignatureError;

    /// Parse a canonical or human-readable type string such as `uint`,
    /// `bytes32[]` or `(uint256,(bool,address)[])[2]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.ends_with(']') {
            let open = s.rfind('[').ok_or_else(|| SignatureError::UnknownType { ty: s.into() })?;
            let element: AbiType = s[..open].parse()?;
            return apply_array_suffix(element, &s[open..]);
        }

        let tuple_body = s.strip_prefix("tuple").unwrap_or(s);
        if let Some(inner) = tuple_body
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let components = split_top_level(inner)?
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .map(|part| part.parse().map(AbiParameter::new))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(AbiType::Tuple(components));
        }

        AbiType::elementary(s)
    }
}

/// Canonical spelling, as hashed into selectors and topics.
impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::String => write!(f, "string"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Function => write!(f, "function"),
            AbiType::Tuple(components) => {
                write!(f, "(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", c.ty)?;
                }
                write!(f, ")")
            }
            AbiType::Array { element, len } => match len {
                Some(n) => write!(f, "{element}[{n}]"),
                None => write!(f, "{element}[]"),
            },
        }
    }
}

/// A named (or anonymous) ABI parameter.
///
/// Tuple components live inside [`AbiType::Tuple`], so they are present
/// exactly when the type is a tuple or an array of tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawParameter", into = "RawParameter")]
pub struct AbiParameter {
    pub name: Option<String>,
    pub ty: AbiType,
    /// Event inputs only: is this parameter stored in a topic?
    pub indexed: bool,
    /// Solidity-level type name (`struct Foo`, `contract IERC20`), informational.
    pub internal_type: Option<String>,
}

impl AbiParameter {
    /// Anonymous parameter.
    pub fn new(ty: AbiType) -> Self {
        Self {
            name: None,
            ty,
            indexed: false,
            internal_type: None,
        }
    }

    pub fn named(name: impl Into<String>, ty: AbiType) -> Self {
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
            ..Self::new(ty)
        }
    }

    /// Mark this parameter as an indexed event input.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn components(&self) -> Option<&[AbiParameter]> {
        self.ty.components()
    }
}

// ─── Raw ABI JSON serde types ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameter {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<AbiParameter>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    internal_type: Option<String>,
}

impl TryFrom<RawParameter> for AbiParameter {
    type Error = SignatureError;

    fn try_from(raw: RawParameter) -> Result<Self, Self::Error> {
        let ty = AbiType::from_json_type(&raw.ty, raw.components).map_err(|e| {
            SignatureError::InvalidParameter {
                param: raw.name.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            name: (!raw.name.is_empty()).then_some(raw.name),
            ty,
            indexed: raw.indexed,
            internal_type: raw.internal_type,
        })
    }
}

impl From<AbiParameter> for RawParameter {
    fn from(p: AbiParameter) -> Self {
        Self {
            ty: p.ty.json_type(),
            components: p.ty.components().map(|c| c.to_vec()),
            name: p.name.unwrap_or_default(),
            indexed: p.indexed,
            internal_type: p.internal_type,
        }
    }
}
