//! Head/tail ABI decoder.
//!
//! The exact inverse of [`crate::encoder`]. Every offset and length read
//! from the input is bounds-checked before it is followed or allocated for,
//! so malformed data yields a [`CodecError`] rather than a panic.
//!
//! Integers are not range-checked against their declared width: the full
//! 32-byte word is taken as is.

use alloy_primitives::{Address, FixedBytes, I256, U256};
use chainabi_core::{
    bytes::{slice, WORD},
    AbiParameter, AbiType, AbiValue, CodecError,
};
use indexmap::IndexMap;

/// Decode `data` against `params`.
///
/// Fails with [`CodecError::ZeroData`] when `data` is empty but parameters
/// are expected, and [`CodecError::DataSizeTooSmall`] when it is shorter
/// than one word.
pub fn decode(params: &[AbiParameter], data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    if params.is_empty() {
        return Ok(Vec::new());
    }
    if data.len() < WORD {
        if data.is_empty() {
            return Err(CodecError::ZeroData);
        }
        let types: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
        return Err(CodecError::DataSizeTooSmall {
            size: data.len(),
            ty: types.join(","),
        });
    }
    let types: Vec<&AbiType> = params.iter().map(|p| &p.ty).collect();
    decode_sequence(&types, data, 0)
}

/// Decode a single value of `ty` encoded as a one-element parameter list.
pub fn decode_single(ty: &AbiType, data: &[u8]) -> Result<AbiValue, CodecError> {
    let mut values = decode(&[AbiParameter::new(ty.clone())], data)?;
    values.pop().ok_or(CodecError::ZeroData)
}

/// Decode a head/tail sequence whose head starts at `base`.
///
/// Dynamic offsets must land at or past the end of the head section.
fn decode_sequence(types: &[&AbiType], data: &[u8], base: usize) -> Result<Vec<AbiValue>, CodecError> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = base;
    let head_len = types
        .iter()
        .fold(0usize, |acc, ty| acc.saturating_add(ty.head_size()));

    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            let target = base.checked_add(offset).ok_or(CodecError::SizeOverflow {
                given: offset,
                max: data.len(),
            })?;
            if offset < head_len {
                return Err(CodecError::SliceOffsetOutOfBounds {
                    offset: target,
                    position: "start",
                    size: data.len(),
                });
            }
            values.push(decode_value(ty, data, target)?);
            cursor += WORD;
        } else {
            values.push(decode_value(ty, data, cursor)?);
            cursor += ty.head_size();
        }
    }
    Ok(values)
}

/// Decode one value whose encoding starts at `at`.
fn decode_value(ty: &AbiType, data: &[u8], at: usize) -> Result<AbiValue, CodecError> {
    match ty {
        AbiType::Address => {
            let word = read_word(data, at)?;
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            let word = read_word(data, at)?;
            let v = U256::from_be_slice(word);
            if v > U256::from(1u8) {
                return Err(CodecError::InvalidBytesBoolean {
                    word: hex::encode(word),
                });
            }
            Ok(AbiValue::Bool(v == U256::from(1u8)))
        }
        AbiType::Uint(_) => Ok(AbiValue::Uint(U256::from_be_slice(read_word(data, at)?))),
        AbiType::Int(_) => Ok(AbiValue::Int(I256::from_raw(U256::from_be_slice(
            read_word(data, at)?,
        )))),
        AbiType::FixedBytes(size) => {
            let word = read_word(data, at)?;
            AbiValue::fixed_bytes(&word[..*size]).ok_or(CodecError::SizeOverflow {
                given: *size,
                max: WORD,
            })
        }
        AbiType::Function => {
            let word = read_word(data, at)?;
            Ok(AbiValue::Function(FixedBytes::<24>::from_slice(&word[..24])))
        }
        AbiType::Bytes => Ok(AbiValue::Bytes(read_length_prefixed(data, at)?.to_vec().into())),
        AbiType::String => Ok(AbiValue::String(
            String::from_utf8_lossy(read_length_prefixed(data, at)?).into_owned(),
        )),
        AbiType::Array { element, len } => {
            let (count, head) = match len {
                Some(n) => (*n, at),
                None => (read_usize(data, at)?, at + WORD),
            };
            // Each element needs at least its head slot in the input.
            let remaining = data.len().saturating_sub(head);
            let fits = count
                .checked_mul(element.head_size().max(1))
                .is_some_and(|need| need <= remaining);
            if !fits {
                return Err(CodecError::SliceOffsetOutOfBounds {
                    offset: head,
                    position: "end",
                    size: data.len(),
                });
            }
            let types = vec![element.as_ref(); count];
            decode_sequence(&types, data, head).map(AbiValue::Array)
        }
        AbiType::Tuple(components) => {
            let types: Vec<&AbiType> = components.iter().map(|c| &c.ty).collect();
            let values = decode_sequence(&types, data, at)?;
            Ok(tuple_value(components, values))
        }
    }
}

/// A decoded tuple becomes a `Struct` when every component is named,
/// otherwise a positional `Tuple`.
pub(crate) fn tuple_value(components: &[AbiParameter], values: Vec<AbiValue>) -> AbiValue {
    let all_named = !components.is_empty() && components.iter().all(|c| c.name().is_some());
    if !all_named {
        return AbiValue::Tuple(values);
    }
    let fields: IndexMap<String, AbiValue> = components
        .iter()
        .filter_map(|c| c.name().map(String::from))
        .zip(values)
        .collect();
    AbiValue::Struct(fields)
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], CodecError> {
    let end = at.checked_add(WORD).ok_or(CodecError::SizeOverflow {
        given: at,
        max: data.len(),
    })?;
    slice(data, at, Some(end))
}

/// Read a word holding an offset or length. Values that cannot index into
/// `data` are rejected immediately.
fn read_usize(data: &[u8], at: usize) -> Result<usize, CodecError> {
    let v = U256::from_be_slice(read_word(data, at)?);
    let n = usize::try_from(v).map_err(|_| CodecError::SizeOverflow {
        given: usize::MAX,
        max: data.len(),
    })?;
    if n > data.len() {
        return Err(CodecError::SliceOffsetOutOfBounds {
            offset: n,
            position: "start",
            size: data.len(),
        });
    }
    Ok(n)
}

fn read_length_prefixed(data: &[u8], at: usize) -> Result<&[u8], CodecError> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    let end = start.checked_add(len).ok_or(CodecError::SizeOverflow {
        given: len,
        max: data.len(),
    })?;
    slice(data, start, Some(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn params(types: &[&str]) -> Vec<AbiParameter> {
        types
            .iter()
            .map(|t| AbiParameter::new(t.parse().unwrap()))
            .collect()
    }

    fn word(n: u64) -> Vec<u8> {
        U256::from(n).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn roundtrip_mixed_list() {
        let p = params(&["address", "string", "uint256[]", "(bool,bytes)", "bytes3", "int16"]);
        let values = vec![
            AbiValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap()),
            AbiValue::from("gm"),
            AbiValue::Array(vec![AbiValue::from(1u64), AbiValue::from(2u64)]),
            AbiValue::Tuple(vec![
                AbiValue::Bool(true),
                AbiValue::Bytes(vec![1, 2, 3].into()),
            ]),
            AbiValue::fixed_bytes(&[0xaa, 0xbb, 0xcc]).unwrap(),
            AbiValue::from(-300i64),
        ];
        let data = encode(&p, &values).unwrap();
        assert_eq!(decode(&p, &data).unwrap(), values);
    }

    #[test]
    fn nested_tuple_with_string_two_levels_deep() {
        // ((uint256, (string, bool)), uint8): two chained offsets to reach
        // the string.
        let inner = AbiType::Tuple(vec![
            AbiParameter::named("label", AbiType::String),
            AbiParameter::named("flag", AbiType::Bool),
        ]);
        let outer = AbiType::Tuple(vec![
            AbiParameter::named("id", AbiType::Uint(256)),
            AbiParameter::named("meta", inner),
        ]);
        let p = vec![
            AbiParameter::named("entry", outer),
            AbiParameter::named("tag", AbiType::Uint(8)),
        ];
        let value = AbiValue::Tuple(vec![
            AbiValue::from(5u64),
            AbiValue::Tuple(vec![AbiValue::from("deep string"), AbiValue::Bool(true)]),
        ]);
        let data = encode(&p, &[value, AbiValue::from(9u64)]).unwrap();
        let decoded = decode(&p, &data).unwrap();

        let entry = decoded[0].as_struct().unwrap();
        assert_eq!(entry["id"], AbiValue::from(5u64));
        let meta = entry["meta"].as_struct().unwrap();
        assert_eq!(meta["label"], AbiValue::from("deep string"));
        assert_eq!(meta["flag"], AbiValue::Bool(true));
        assert_eq!(decoded[1], AbiValue::from(9u64));
    }

    #[test]
    fn bool_must_be_zero_or_one() {
        let err = decode(&params(&["bool"]), &word(2)).unwrap_err();
        assert!(matches!(err, CodecError::InvalidBytesBoolean { .. }));
    }

    #[test]
    fn empty_and_short_data() {
        assert!(matches!(
            decode(&params(&["uint256"]), &[]),
            Err(CodecError::ZeroData)
        ));
        assert!(matches!(
            decode(&params(&["uint256"]), &[0u8; 12]),
            Err(CodecError::DataSizeTooSmall { size: 12, .. })
        ));
        assert!(decode(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_offset_is_an_error() {
        let mut data = word(0x1000);
        data.extend(word(0));
        assert!(matches!(
            decode(&params(&["string"]), &data),
            Err(CodecError::SliceOffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn huge_array_length_is_rejected_before_allocating() {
        // offset 0x20, then a length far beyond the available words
        let mut data = word(0x20);
        data.extend(word(60));
        assert!(decode(&params(&["uint256[]"]), &data).is_err());

        let mut data = word(0x20);
        data.extend([0xff; 32]);
        assert!(matches!(
            decode(&params(&["uint256[]"]), &data),
            Err(CodecError::SizeOverflow { .. } | CodecError::SliceOffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn huge_fixed_array_is_rejected_before_allocating() {
        let ty = AbiType::Array {
            element: Box::new(AbiType::Uint(256)),
            len: Some(1 << 62),
        };
        assert!(matches!(
            decode(&[AbiParameter::new(ty)], &[0u8; 64]),
            Err(CodecError::SliceOffsetOutOfBounds { .. })
        ));

        let ty = AbiType::Array {
            element: Box::new(AbiType::Bool),
            len: Some(u32::MAX as usize),
        };
        assert!(decode(&[AbiParameter::new(ty)], &[0u8; 64]).is_err());
    }

    #[test]
    fn offset_into_the_head_is_rejected() {
        // (uint256, string) with the string offset pointing at the uint slot
        let mut data = word(7);
        data.extend(word(0));
        data.extend(word(0));
        assert!(matches!(
            decode(&params(&["uint256", "string"]), &data),
            Err(CodecError::SliceOffsetOutOfBounds { offset: 0, .. })
        ));

        // a tail shared by two empty strings is fine
        let mut data = word(0x40);
        data.extend(word(0x40));
        data.extend(word(0));
        assert_eq!(
            decode(&params(&["string", "string"]), &data).unwrap(),
            vec![AbiValue::from(""), AbiValue::from("")]
        );
    }

    #[test]
    fn truncated_string_body() {
        let mut data = word(0x20);
        data.extend(word(40));
        data.extend([0x61; 32]);
        assert!(matches!(
            decode(&params(&["string"]), &data),
            Err(CodecError::SliceOffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut data = word(0x20);
        data.extend(word(2));
        let mut body = vec![0xff, 0xfe];
        body.resize(32, 0);
        data.extend(body);
        let v = decode_single(&AbiType::String, &data).unwrap();
        assert_eq!(v, AbiValue::from("\u{fffd}\u{fffd}"));
    }

    #[test]
    fn integers_are_not_range_checked_on_decode() {
        let v = decode_single(&AbiType::Uint(8), &word(300)).unwrap();
        assert_eq!(v, AbiValue::from(300u64));
    }
}
