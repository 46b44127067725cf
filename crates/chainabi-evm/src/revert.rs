//! Custom errors and revert data.
//!
//! Besides ABI-declared errors, Solidity emits two builtin shapes:
//! `Error(string)` for `require`/`revert` messages and `Panic(uint256)` for
//! compiler-inserted checks.

use std::fmt;

use alloy_primitives::U256;
use chainabi_core::{
    bytes::to_hex, Abi, AbiError, AbiType, AbiValue, CodecError, ErrorItem, ItemKind,
};
use tracing::debug;

use crate::decoder::{decode, decode_single};
use crate::encoder::encode;
use crate::overload::{resolve, ResolveOptions};

/// Selector of the builtin `Error(string)`.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// Selector of the builtin `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Decoded revert data.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRevert {
    /// `Error(string)`
    Reason(String),
    /// `Panic(uint256)`
    Panic(U256),
    /// An error declared in the ABI.
    Custom { error: ErrorItem, args: Vec<AbiValue> },
}

impl fmt::Display for DecodedRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedRevert::Reason(reason) => write!(f, "Error({reason:?})"),
            DecodedRevert::Panic(code) => {
                let hex = format!("{code:x}");
                match panic_reason(*code) {
                    Some(reason) => write!(f, "Panic(0x{hex:0>2}): {reason}"),
                    None => write!(f, "Panic(0x{hex:0>2})"),
                }
            }
            DecodedRevert::Custom { error, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", error.name, args.join(", "))
            }
        }
    }
}

/// Meaning of a Solidity panic code.
pub fn panic_reason(code: U256) -> Option<&'static str> {
    let code: u64 = code.try_into().ok()?;
    Some(match code {
        0x00 => "generic panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic underflow or overflow",
        0x12 => "division or modulo by zero",
        0x21 => "enum conversion out of range",
        0x22 => "invalid encoded storage byte array accessed",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "memory allocation overflow",
        0x51 => "call to a zero-initialized internal function",
        _ => return None,
    })
}

/// Encode `error` with `args`: selector followed by the encoded arguments.
pub fn encode_error(error: &ErrorItem, args: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    let mut out = error.selector().to_vec();
    out.extend(encode(&error.inputs, args)?);
    Ok(out)
}

/// Decode revert data raised by `error`, checking the selector.
pub fn decode_error(error: &ErrorItem, data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    let selector = error.selector();
    if data.len() < 4 || data[..4] != selector[..] {
        return Err(CodecError::SelectorMismatch {
            expected: hex::encode(selector),
            given: hex::encode(&data[..data.len().min(4)]),
        });
    }
    decode(&error.inputs, &data[4..])
}

/// Decode revert data against the builtins and the errors declared in `abi`.
pub fn decode_revert(abi: &Abi, data: &[u8]) -> Result<DecodedRevert, AbiError> {
    if data.is_empty() {
        return Err(CodecError::ZeroData.into());
    }
    if data.len() < 4 {
        return Err(CodecError::DataSizeTooSmall {
            size: data.len(),
            ty: "bytes4".into(),
        }
        .into());
    }
    let (selector, body) = data.split_at(4);

    if selector == ERROR_SELECTOR {
        let reason = decode_single(&AbiType::String, body)?;
        return Ok(DecodedRevert::Reason(reason.as_str().unwrap_or_default().to_string()));
    }
    if selector == PANIC_SELECTOR {
        let code = decode_single(&AbiType::Uint(256), body)?;
        return Ok(DecodedRevert::Panic(code.as_uint().unwrap_or_default()));
    }

    let resolved = resolve(abi, &to_hex(selector), ResolveOptions::default().kind(ItemKind::Error))?;
    let error = resolved
        .item
        .as_error()
        .cloned()
        .ok_or_else(|| CodecError::SelectorMismatch {
            expected: String::new(),
            given: hex::encode(selector),
        })?;
    let args = decode(&error.inputs, body)?;
    debug!(error = %error.signature(), "decoded custom error");
    Ok(DecodedRevert::Custom { error, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainabi_core::{parse_abi_item, selector};

    fn error(text: &str) -> ErrorItem {
        parse_abi_item(text).unwrap().as_error().cloned().unwrap()
    }

    #[test]
    fn builtin_selectors() {
        assert_eq!(selector("Error(string)").unwrap().as_slice(), ERROR_SELECTOR);
        assert_eq!(selector("Panic(uint256)").unwrap().as_slice(), PANIC_SELECTOR);
    }

    #[test]
    fn custom_error_roundtrip() {
        let e = error("error InsufficientBalance(uint256 available, uint256 required)");
        let data = encode_error(&e, &[AbiValue::from(1u64), AbiValue::from(2u64)]).unwrap();
        assert_eq!(decode_error(&e, &data).unwrap(), vec![AbiValue::from(1u64), AbiValue::from(2u64)]);

        let abi = Abi::new(vec![e.clone().into()]);
        let decoded = decode_revert(&abi, &data).unwrap();
        assert_eq!(decoded.to_string(), "InsufficientBalance(1, 2)");
        assert!(matches!(decoded, DecodedRevert::Custom { ref error, .. } if error.name == "InsufficientBalance"));
    }

    #[test]
    fn reason_string() {
        let builtin = error("error Error(string message)");
        let data = encode_error(&builtin, &[AbiValue::from("not owner")]).unwrap();
        assert_eq!(&data[..4], ERROR_SELECTOR);
        let decoded = decode_revert(&Abi::default(), &data).unwrap();
        assert_eq!(decoded, DecodedRevert::Reason("not owner".into()));
        assert_eq!(decoded.to_string(), "Error(\"not owner\")");
    }

    #[test]
    fn panic_codes() {
        let builtin = error("error Panic(uint256 code)");
        let data = encode_error(&builtin, &[AbiValue::from(0x11u64)]).unwrap();
        let decoded = decode_revert(&Abi::default(), &data).unwrap();
        assert_eq!(decoded, DecodedRevert::Panic(U256::from(0x11u8)));
        assert_eq!(decoded.to_string(), "Panic(0x11): arithmetic underflow or overflow");
        assert_eq!(panic_reason(U256::from(0x99u8)), None);
    }

    #[test]
    fn unknown_and_short_data() {
        assert!(matches!(
            decode_revert(&Abi::default(), &[0xde, 0xad, 0xbe, 0xef]),
            Err(AbiError::Resolve(_))
        ));
        assert!(matches!(
            decode_revert(&Abi::default(), &[]),
            Err(AbiError::Codec(CodecError::ZeroData))
        ));
        assert!(matches!(
            decode_revert(&Abi::default(), &[0x08, 0xc3]),
            Err(AbiError::Codec(CodecError::DataSizeTooSmall { .. }))
        ));
    }
}
