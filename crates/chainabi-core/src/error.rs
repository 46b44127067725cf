//! Error types for the ChainABI parse / codec / resolve pipeline.

use thiserror::Error;

/// Errors raised while turning text or JSON into the type model.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Unable to normalize signature: `{text}`")]
    InvalidSignature { text: String },

    #[error("Unknown type: `{ty}`")]
    UnknownType { ty: String },

    #[error("Invalid parameter `{param}`: {reason}")]
    InvalidParameter { param: String, reason: String },

    #[error("Unknown struct `{name}`")]
    UnknownStruct { name: String },

    #[error("Circular reference detected in struct `{name}`")]
    CircularStruct { name: String },

    #[error("Invalid ABI item: {reason}")]
    InvalidItem { reason: String },

    #[error("Invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Which end of a byte buffer a padding operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDirection {
    Left,
    Right,
}

impl std::fmt::Display for PadDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PadDirection::Left => write!(f, "left"),
            PadDirection::Right => write!(f, "right"),
        }
    }
}

/// Errors raised by the head/tail encoder and decoder.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Size cannot exceed {max} bytes. Given size: {given} bytes.")]
    SizeOverflow { given: usize, max: usize },

    #[error("Slice {position} at offset {offset} is out-of-bounds (size: {size}).")]
    SliceOffsetOutOfBounds {
        offset: usize,
        position: &'static str,
        size: usize,
    },

    #[error("Size ({size}) exceeds padding size ({target_size}) when padding {direction}.")]
    SizeExceedsPaddingSize {
        size: usize,
        target_size: usize,
        direction: PadDirection,
    },

    #[error("Bytes value `0x{word}` is not a valid boolean. The bytes must encode 0 or 1.")]
    InvalidBytesBoolean { word: String },

    #[error("Number `{value}` is not in safe `{ty}` range.")]
    IntegerOutOfRange { value: String, ty: String },

    #[error("Size of bytes `{given}` does not match expected size `bytes{expected}`.")]
    BytesSizeMismatch { expected: usize, given: usize },

    #[error("Array length mismatch for type `{ty}`: expected {expected}, got {given}.")]
    ArrayLengthMismatch {
        ty: String,
        expected: usize,
        given: usize,
    },

    #[error("ABI encoding parameters/values length mismatch: expected {expected}, got {given}.")]
    LengthMismatch { expected: usize, given: usize },

    #[error("Address `{address}` is invalid: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Value `{value}` is not a valid hex string")]
    InvalidHex { value: String },

    #[error("Value `{value}` cannot be encoded as `{ty}`")]
    InvalidValue { ty: String, value: String },

    #[error("Cannot decode zero data (\"0x\") with ABI parameters.")]
    ZeroData,

    #[error("Data size of {size} bytes is too small for given parameters `({ty})`.")]
    DataSizeTooSmall { size: usize, ty: String },

    #[error("Selector mismatch: expected 0x{expected}, got 0x{given}")]
    SelectorMismatch { expected: String, given: String },

    #[error("Topics mismatch: {reason}")]
    TopicsMismatch { reason: String },

    #[error("Filter type `{ty}` is not supported for indexed topics.")]
    FilterTypeNotSupported { ty: String },

    #[error("Deploy data does not start with the given bytecode.")]
    BytecodeMismatch,
}

/// Errors from overload resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("ABI item with name \"{name}\" not found. Available: [{}]", available.join(", "))]
    NotFound { name: String, available: Vec<String> },

    #[error(
        "Found ambiguous types in overloaded ABI items.\n\n\
         `{type_a}` in `{signature_a}`, and\n\
         `{type_b}` in `{signature_b}`\n\n\
         These types encode differently and cannot be distinguished at runtime. \
         Remove one of the ambiguous items in the ABI."
    )]
    Ambiguity {
        type_a: String,
        signature_a: String,
        type_b: String,
        signature_b: String,
    },
}

/// Umbrella error returned by the high-level call-data APIs.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
