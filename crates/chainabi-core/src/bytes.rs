//! Byte-buffer primitives used by the codec: padding, bounds-checked slicing
//! and hex conversion.

use crate::error::{CodecError, PadDirection};

/// Width of one ABI word.
pub const WORD: usize = 32;

/// Left-pad `value` with zeros to `size` bytes.
pub fn pad_left(value: &[u8], size: usize) -> Result<Vec<u8>, CodecError> {
    pad(value, size, PadDirection::Left)
}

/// Right-pad `value` with zeros to `size` bytes.
pub fn pad_right(value: &[u8], size: usize) -> Result<Vec<u8>, CodecError> {
    pad(value, size, PadDirection::Right)
}

fn pad(value: &[u8], size: usize, direction: PadDirection) -> Result<Vec<u8>, CodecError> {
    if value.len() > size {
        return Err(CodecError::SizeExceedsPaddingSize {
            size: value.len(),
            target_size: size,
            direction,
        });
    }
    let mut out = vec![0u8; size];
    match direction {
        PadDirection::Left => out[size - value.len()..].copy_from_slice(value),
        PadDirection::Right => out[..value.len()].copy_from_slice(value),
    }
    Ok(out)
}

/// `value[start..end]`, failing instead of panicking when out of range.
///
/// `start` must not exceed the buffer; `end` (when given) must lie within it
/// and not before `start`.
pub fn slice(value: &[u8], start: usize, end: Option<usize>) -> Result<&[u8], CodecError> {
    if start > value.len() {
        return Err(CodecError::SliceOffsetOutOfBounds {
            offset: start,
            position: "start",
            size: value.len(),
        });
    }
    let end = end.unwrap_or(value.len());
    if end > value.len() || end < start {
        return Err(CodecError::SliceOffsetOutOfBounds {
            offset: end,
            position: "end",
            size: value.len(),
        });
    }
    Ok(&value[start..end])
}

/// `len` rounded up to a whole number of words.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Whether `s` is a `0x`-prefixed hex string (any even or odd length,
/// including the empty `0x`).
pub fn is_hex(s: &str) -> bool {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `0x` followed by exactly 40 hex digits. Shape only; the EIP-55
/// checksum is not verified.
pub fn is_address_shaped(s: &str) -> bool {
    s.len() == 42 && is_hex(s)
}

/// Decode a hex string with or without the `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits).map_err(|_| CodecError::InvalidHex { value: s.to_string() })
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(pad_left(&[1, 2], 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(pad_right(&[1, 2], 4).unwrap(), vec![1, 2, 0, 0]);
        assert_eq!(pad_left(&[], 2).unwrap(), vec![0, 0]);
        let err = pad_right(&[0u8; 33], WORD).unwrap_err();
        assert!(matches!(
            err,
            CodecError::SizeExceedsPaddingSize {
                size: 33,
                target_size: 32,
                direction: PadDirection::Right
            }
        ));
    }

    #[test]
    fn slicing_bounds() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(slice(&data, 1, Some(3)).unwrap(), &[2, 3]);
        assert_eq!(slice(&data, 4, None).unwrap(), &[] as &[u8]);
        assert!(matches!(
            slice(&data, 5, None),
            Err(CodecError::SliceOffsetOutOfBounds { position: "start", .. })
        ));
        assert!(matches!(
            slice(&data, 0, Some(5)),
            Err(CodecError::SliceOffsetOutOfBounds { position: "end", .. })
        ));
    }

    #[test]
    fn hex_helpers() {
        assert!(is_hex("0x"));
        assert!(is_hex("0xdeadBEEF"));
        assert!(!is_hex("deadbeef"));
        assert!(!is_hex("0xzz"));
        assert_eq!(from_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(from_hex("0102").unwrap(), vec![1, 2]);
        assert!(from_hex("0x123").is_err());
        assert_eq!(to_hex(&[0xab]), "0xab");
        assert!(is_address_shaped("0xA0Cf798816D4b9b9866b5330EEa46a18382f251e"));
        assert!(!is_address_shaped("0xA0Cf798816D4b9b9866b5330EEa46a18382f251eee"));
        assert!(!is_address_shaped("A0Cf798816D4b9b9866b5330EEa46a18382f251e00"));
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 32);
        assert_eq!(padded_len(64), 64);
    }
}
