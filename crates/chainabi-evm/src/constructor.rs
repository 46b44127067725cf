//! Deployment data: creation bytecode followed by the encoded constructor
//! arguments. There is no selector.

use chainabi_core::{AbiValue, CodecError, ConstructorItem};

use crate::decoder::decode;
use crate::encoder::encode;

pub fn encode_deploy(
    constructor: &ConstructorItem,
    bytecode: &[u8],
    args: &[AbiValue],
) -> Result<Vec<u8>, CodecError> {
    let mut out = bytecode.to_vec();
    out.extend(encode(&constructor.inputs, args)?);
    Ok(out)
}

/// Strip `bytecode` from the front of `data` and decode the rest.
pub fn decode_deploy(
    constructor: &ConstructorItem,
    bytecode: &[u8],
    data: &[u8],
) -> Result<Vec<AbiValue>, CodecError> {
    let args = data.strip_prefix(bytecode).ok_or(CodecError::BytecodeMismatch)?;
    decode(&constructor.inputs, args)
}
