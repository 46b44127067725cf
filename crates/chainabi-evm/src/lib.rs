//! # chainabi-evm
//!
//! Ethereum ABI binary codec and overload resolver.
//!
//! ## Implementation notes
//! - Head/tail encoding is hand-rolled over `alloy-primitives` words
//! - Offsets are relative to the start of the enclosing head
//! - Function / error call data = 4-byte selector ++ encoded inputs
//! - Logs: topics[0] = event topic hash, topics[1..] = indexed inputs,
//!   `data` = the non-indexed inputs
//! - Overloads are picked by argument shape; wire-level collisions between
//!   surviving candidates are reported, never guessed

pub mod batch;
pub mod constructor;
pub mod decoder;
pub mod encoder;
pub mod event;
pub mod function;
pub mod overload;
pub mod revert;

pub use batch::{decode_logs, BatchDecodeError, BatchDecodeResult, ErrorMode, RawLog};
pub use constructor::{decode_deploy, encode_deploy};
pub use decoder::{decode, decode_single};
pub use encoder::{encode, encode_single};
pub use event::{decode_event_log, decode_log, encode_topics, DecodedLog};
pub use function::{
    decode_data, decode_function_data, decode_result, encode_data, encode_function_call,
    encode_result, DecodedCall, ResultShape,
};
pub use overload::{is_arg_of_type, resolve, resolve_in, ResolveOptions, Resolved};
pub use revert::{decode_error, decode_revert, encode_error, panic_reason, DecodedRevert};
