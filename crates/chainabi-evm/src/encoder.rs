//! Head/tail ABI encoder.
//!
//! Every parameter list is laid out as a head of fixed-width slots followed
//! by a tail. Static values sit directly in their head slot; dynamic values
//! put a 32-byte offset (relative to the start of the head) there and their
//! payload in the tail. Tuples and arrays recurse with their own head/tail.
//!
//! Values are accepted loosely (see [`AbiValue`]) and validated against the
//! target type: integer ranges, `bytesN` sizes, fixed array lengths and
//! address checksums.

use alloy_primitives::{Address, I256, U256};
use chainabi_core::{
    bytes::{from_hex, is_address_shaped, is_hex, pad_right, padded_len, WORD},
    AbiParameter, AbiType, AbiValue, CodecError,
};

/// One encoded value and whether it belongs in the tail.
struct Encoded {
    dynamic: bool,
    data: Vec<u8>,
}

/// ABI-encode `values` against `params`.
pub fn encode(params: &[AbiParameter], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    if params.len() != values.len() {
        return Err(CodecError::LengthMismatch {
            expected: params.len(),
            given: values.len(),
        });
    }
    let parts = params
        .iter()
        .zip(values)
        .map(|(p, v)| encode_value(&p.ty, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_sequence(parts))
}

/// ABI-encode a single value of `ty` as a one-element parameter list.
pub fn encode_single(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, CodecError> {
    let part = encode_value(ty, value)?;
    Ok(encode_sequence(vec![part]))
}

/// Lay out already-encoded parts as head ++ tail.
fn encode_sequence(parts: Vec<Encoded>) -> Vec<u8> {
    let head_size: usize = parts
        .iter()
        .map(|p| if p.dynamic { WORD } else { p.data.len() })
        .sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for part in parts {
        if part.dynamic {
            head.extend_from_slice(&usize_word(head_size + tail.len()));
            tail.extend_from_slice(&part.data);
        } else {
            head.extend_from_slice(&part.data);
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encode_value(ty: &AbiType, value: &AbiValue) -> Result<Encoded, CodecError> {
    let data = match ty {
        AbiType::Address => address_to_word(&coerce_address(value)?).to_vec(),
        AbiType::Bool => match value {
            AbiValue::Bool(b) => usize_word(*b as usize).to_vec(),
            other => return Err(invalid(ty, other)),
        },
        AbiType::Uint(bits) => coerce_uint(value, *bits, ty)?.to_be_bytes::<32>().to_vec(),
        AbiType::Int(bits) => coerce_int(value, *bits, ty)?
            .into_raw()
            .to_be_bytes::<32>()
            .to_vec(),
        AbiType::FixedBytes(size) => {
            let bytes = coerce_bytes(value, ty)?;
            if bytes.len() != *size {
                return Err(CodecError::BytesSizeMismatch {
                    expected: *size,
                    given: bytes.len(),
                });
            }
            pad_right(&bytes, WORD)?
        }
        AbiType::Function => {
            let bytes = coerce_bytes(value, ty)?;
            if bytes.len() != 24 {
                return Err(CodecError::BytesSizeMismatch {
                    expected: 24,
                    given: bytes.len(),
                });
            }
            pad_right(&bytes, WORD)?
        }
        AbiType::Bytes => length_prefixed(&coerce_bytes(value, ty)?)?,
        AbiType::String => match value {
            AbiValue::String(s) => length_prefixed(s.as_bytes())?,
            other => return Err(invalid(ty, other)),
        },
        AbiType::Array { element, len } => {
            let items = value.as_slice().ok_or_else(|| invalid(ty, value))?;
            if let Some(n) = len {
                if items.len() != *n {
                    return Err(CodecError::ArrayLengthMismatch {
                        ty: ty.to_string(),
                        expected: *n,
                        given: items.len(),
                    });
                }
            }
            let parts = items
                .iter()
                .map(|item| encode_value(element, item))
                .collect::<Result<Vec<_>, _>>()?;
            let body = encode_sequence(parts);
            match len {
                Some(_) => body,
                None => {
                    let mut out = usize_word(items.len()).to_vec();
                    out.extend_from_slice(&body);
                    out
                }
            }
        }
        AbiType::Tuple(components) => {
            let fields = tuple_fields(components, value, ty)?;
            let parts = components
                .iter()
                .zip(fields)
                .map(|(c, v)| encode_value(&c.ty, v))
                .collect::<Result<Vec<_>, _>>()?;
            encode_sequence(parts)
        }
    };

    Ok(Encoded {
        dynamic: ty.is_dynamic(),
        data,
    })
}

/// Tuple field values in component order, from a positional tuple/array
/// or a struct keyed by component name.
fn tuple_fields<'v>(
    components: &[AbiParameter],
    value: &'v AbiValue,
    ty: &AbiType,
) -> Result<Vec<&'v AbiValue>, CodecError> {
    if let Some(items) = value.as_slice() {
        if items.len() != components.len() {
            return Err(CodecError::LengthMismatch {
                expected: components.len(),
                given: items.len(),
            });
        }
        return Ok(items.iter().collect());
    }
    let fields = value.as_struct().ok_or_else(|| invalid(ty, value))?;
    components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let found = match c.name() {
                Some(name) => fields.get(name),
                None => fields.get_index(i).map(|(_, v)| v),
            };
            found.ok_or_else(|| CodecError::InvalidValue {
                ty: ty.to_string(),
                value: format!("missing field `{}`", c.name().unwrap_or("<anonymous>")),
            })
        })
        .collect()
}

fn length_prefixed(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = usize_word(bytes.len()).to_vec();
    out.extend_from_slice(&pad_right(bytes, padded_len(bytes.len()))?);
    Ok(out)
}

fn usize_word(n: usize) -> [u8; 32] {
    U256::from(n).to_be_bytes::<32>()
}

fn address_to_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn invalid(ty: &AbiType, value: &AbiValue) -> CodecError {
    CodecError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

/// Parse an address from a value. Mixed-case strings must carry a valid
/// EIP-55 checksum; all-lower and all-upper strings are accepted as is.
pub fn coerce_address(value: &AbiValue) -> Result<Address, CodecError> {
    match value {
        AbiValue::Address(a) => Ok(*a),
        AbiValue::String(s) => parse_address(s),
        other => Err(CodecError::InvalidAddress {
            address: other.to_string(),
            reason: format!("expected an address, got {}", other.kind()),
        }),
    }
}

pub fn parse_address(s: &str) -> Result<Address, CodecError> {
    let invalid = |reason: &str| CodecError::InvalidAddress {
        address: s.to_string(),
        reason: reason.to_string(),
    };
    if !is_address_shaped(s) {
        return Err(invalid("expected 0x followed by 40 hex characters"));
    }
    let bytes = from_hex(s)?;
    let address = Address::from_slice(&bytes);
    let digits = &s[2..];
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != s {
        return Err(invalid("invalid checksum"));
    }
    Ok(address)
}

fn coerce_bytes(value: &AbiValue, ty: &AbiType) -> Result<Vec<u8>, CodecError> {
    match value {
        AbiValue::String(s) if is_hex(s) => from_hex(s),
        AbiValue::String(s) => Err(CodecError::InvalidHex { value: s.clone() }),
        other => other
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| invalid(ty, other)),
    }
}

fn coerce_uint(value: &AbiValue, bits: usize, ty: &AbiType) -> Result<U256, CodecError> {
    let out_of_range = |v: String| CodecError::IntegerOutOfRange {
        value: v,
        ty: ty.to_string(),
    };
    let v = match value {
        AbiValue::Uint(v) => *v,
        AbiValue::Int(v) if v.is_negative() => return Err(out_of_range(v.to_string())),
        AbiValue::Int(v) => v.into_raw(),
        AbiValue::String(s) => parse_u256(s).ok_or_else(|| invalid(ty, value))?,
        other => return Err(invalid(ty, other)),
    };
    if bits < 256 && (v >> bits) != U256::ZERO {
        return Err(out_of_range(v.to_string()));
    }
    Ok(v)
}

fn coerce_int(value: &AbiValue, bits: usize, ty: &AbiType) -> Result<I256, CodecError> {
    let out_of_range = |v: String| CodecError::IntegerOutOfRange {
        value: v,
        ty: ty.to_string(),
    };
    let v = match value {
        AbiValue::Int(v) => *v,
        AbiValue::Uint(v) if *v > I256::MAX.into_raw() => return Err(out_of_range(v.to_string())),
        AbiValue::Uint(v) => I256::from_raw(*v),
        AbiValue::String(s) => parse_i256(s).ok_or_else(|| invalid(ty, value))?,
        other => return Err(invalid(ty, other)),
    };
    if bits < 256 {
        // Fits iff the top 257 - bits bits are all equal to the sign bit.
        let top = v.into_raw() >> (bits - 1);
        if top != U256::ZERO && top != (U256::MAX >> (bits - 1)) {
            return Err(out_of_range(v.to_string()));
        }
    }
    Ok(v)
}

fn parse_u256(s: &str) -> Option<U256> {
    match s.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None => U256::from_str_radix(s, 10).ok(),
    }
}

fn parse_i256(s: &str) -> Option<I256> {
    if s.starts_with("0x") || s.starts_with("-0x") {
        I256::from_hex_str(s).ok()
    } else {
        I256::from_dec_str(s).ok()
    }
}

/// Encode a static value that occupies exactly one word.
pub(crate) fn encode_word(ty: &AbiType, value: &AbiValue) -> Result<[u8; 32], CodecError> {
    let data = encode_value(ty, value)?.data;
    <[u8; 32]>::try_from(data.as_slice()).map_err(|_| CodecError::SizeOverflow {
        given: data.len(),
        max: WORD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn params(types: &[&str]) -> Vec<AbiParameter> {
        types
            .iter()
            .map(|t| AbiParameter::new(t.parse().unwrap()))
            .collect()
    }

    fn words(hex_words: &[&str]) -> Vec<u8> {
        hex_words
            .iter()
            .flat_map(|w| hex::decode(format!("{w:0>64}")).unwrap())
            .collect()
    }

    #[test]
    fn static_params_inline() {
        let data = encode(
            &params(&["address", "uint256", "bool"]),
            &[
                AbiValue::from("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
                AbiValue::from(1u64),
                AbiValue::Bool(true),
            ],
        )
        .unwrap();
        assert_eq!(
            data,
            words(&["d8da6bf26964af9d7eed9e03e53415d37aa96045", "1", "1"])
        );
    }

    #[test]
    fn dynamic_string_offset_and_padding() {
        let data = encode(
            &params(&["uint256", "string"]),
            &[AbiValue::from(7u64), AbiValue::from("hello")],
        )
        .unwrap();
        assert_eq!(
            data,
            words(&[
                "7",
                "40",
                "5",
                "68656c6c6f000000000000000000000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn dynamic_array_of_dynamic_elements() {
        // string[] ["a", "b"]: count, then an inner offset table relative to
        // the element head.
        let data = encode(
            &params(&["string[]"]),
            &[AbiValue::Array(vec![AbiValue::from("a"), AbiValue::from("b")])],
        )
        .unwrap();
        assert_eq!(
            data,
            words(&[
                "20",
                "2",
                "40",
                "80",
                "1",
                "6100000000000000000000000000000000000000000000000000000000000000",
                "1",
                "6200000000000000000000000000000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn static_tuple_is_inlined() {
        let p = params(&["(uint8,bool)", "uint256"]);
        let data = encode(
            &p,
            &[
                AbiValue::Tuple(vec![AbiValue::from(3u64), AbiValue::Bool(false)]),
                AbiValue::from(9u64),
            ],
        )
        .unwrap();
        assert_eq!(data, words(&["3", "0", "9"]));
    }

    #[test]
    fn struct_values_match_by_name() {
        let ty: AbiType = AbiType::Tuple(vec![
            AbiParameter::named("a", AbiType::Uint(256)),
            AbiParameter::named("b", AbiType::Bool),
        ]);
        let mut fields = IndexMap::new();
        fields.insert("b".to_string(), AbiValue::Bool(true));
        fields.insert("a".to_string(), AbiValue::from(2u64));
        let data = encode_single(&ty, &AbiValue::Struct(fields)).unwrap();
        assert_eq!(data, words(&["2", "1"]));
    }

    #[test]
    fn integer_ranges() {
        let u8_ty = params(&["uint8"]);
        assert!(encode(&u8_ty, &[AbiValue::from(255u64)]).is_ok());
        assert!(matches!(
            encode(&u8_ty, &[AbiValue::from(256u64)]),
            Err(CodecError::IntegerOutOfRange { .. })
        ));

        let i8_ty = params(&["int8"]);
        assert!(encode(&i8_ty, &[AbiValue::from(-128i64)]).is_ok());
        assert!(encode(&i8_ty, &[AbiValue::from(127i64)]).is_ok());
        assert!(encode(&i8_ty, &[AbiValue::from(128i64)]).is_err());
        assert!(encode(&i8_ty, &[AbiValue::from(-129i64)]).is_err());

        let neg = encode(&i8_ty, &[AbiValue::from(-1i64)]).unwrap();
        assert_eq!(neg, vec![0xff; 32]);

        assert!(matches!(
            encode(&params(&["uint256"]), &[AbiValue::from(-1i64)]),
            Err(CodecError::IntegerOutOfRange { .. })
        ));
    }

    #[test]
    fn integer_strings() {
        let data = encode(
            &params(&["uint256", "uint256", "int256"]),
            &[AbiValue::from("1000"), AbiValue::from("0xff"), AbiValue::from("-2")],
        )
        .unwrap();
        let mut expected = words(&["3e8", "ff"]);
        expected.extend_from_slice(&[0xff; 31]);
        expected.push(0xfe);
        assert_eq!(data, expected);
    }

    #[test]
    fn fixed_bytes_size_must_match() {
        let p = params(&["bytes4"]);
        assert!(encode(&p, &[AbiValue::from("0xdeadbeef")]).is_ok());
        assert!(matches!(
            encode(&p, &[AbiValue::from("0xdead")]),
            Err(CodecError::BytesSizeMismatch { expected: 4, given: 2 })
        ));
    }

    #[test]
    fn fixed_array_length_must_match() {
        let p = params(&["uint256[2]"]);
        assert!(matches!(
            encode(&p, &[AbiValue::Array(vec![AbiValue::from(1u64)])]),
            Err(CodecError::ArrayLengthMismatch { expected: 2, given: 1, .. })
        ));
    }

    #[test]
    fn address_checksum() {
        assert!(parse_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_ok());
        assert!(parse_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").is_ok());
        assert!(matches!(
            parse_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96046"),
            Err(CodecError::InvalidAddress { .. })
        ));
        assert!(parse_address("0xd8da6bf26964af9d7eed9e03e53415d37aa960").is_err());
    }

    #[test]
    fn value_count_mismatch() {
        assert!(matches!(
            encode(&params(&["uint256", "bool"]), &[AbiValue::from(1u64)]),
            Err(CodecError::LengthMismatch { expected: 2, given: 1 })
        ));
    }
}
