//! # chainabi-core
//!
//! The ABI type model and everything that works on it without touching the
//! binary layout: the value tree, signature normalization, human-readable
//! parsing and formatting, selector / topic hashing and typed errors.
//! The head/tail codec and overload resolver live in `chainabi-evm`.

pub mod abi;
pub mod bytes;
pub mod error;
pub mod format;
pub mod hash;
pub mod human;
pub mod item;
pub mod signature;
pub mod types;
pub mod value;

pub use abi::{Abi, ParseOptions};
pub use error::{AbiError, CodecError, PadDirection, ResolveError, SignatureError};
pub use hash::{keccak256, selector, signature_hash};
pub use human::{parse_abi_item, parse_abi_items};
pub use item::{
    AbiItem, ConstructorItem, ErrorItem, EventItem, FallbackItem, FunctionItem, ItemKind,
    ReceiveItem, StateMutability,
};
pub use signature::normalize_signature;
pub use types::{AbiParameter, AbiType};
pub use value::AbiValue;
