//! Function call data: `selector ++ encode(inputs)` and result payloads.

use chainabi_core::{
    bytes::to_hex, Abi, AbiError, AbiParameter, AbiValue, CodecError, FunctionItem, ItemKind,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::decoder::decode;
use crate::encoder::encode;
use crate::overload::{resolve, ResolveOptions};

/// How a multi-output result is shaped on decode (and read on encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// Positional `Tuple`.
    #[default]
    Array,
    /// `Struct` keyed by output name; anonymous outputs use their index.
    Object,
}

/// Result of decoding call data against an ABI.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    pub function: FunctionItem,
    /// Decoded inputs in declaration order
    pub args: Vec<AbiValue>,
}

impl DecodedCall {
    /// Inputs paired with their parameter names (index for anonymous ones).
    pub fn named_args(&self) -> Vec<(String, &AbiValue)> {
        self.function
            .inputs
            .iter()
            .zip(&self.args)
            .enumerate()
            .map(|(i, (p, v))| (param_key(p, i), v))
            .collect()
    }

    /// Look up a decoded input by name
    pub fn arg(&self, name: &str) -> Option<&AbiValue> {
        self.function
            .inputs
            .iter()
            .position(|p| p.name() == Some(name))
            .and_then(|i| self.args.get(i))
    }
}

/// Encode a call to `function`: the 4-byte selector followed by the
/// encoded arguments.
pub fn encode_data(function: &FunctionItem, args: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    let mut out = function.selector().to_vec();
    out.extend(encode(&function.inputs, args)?);
    Ok(out)
}

/// Decode call data produced by [`encode_data`], checking the selector.
pub fn decode_data(function: &FunctionItem, data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    let selector = function.selector();
    if data.len() < 4 || data[..4] != selector[..] {
        return Err(CodecError::SelectorMismatch {
            expected: hex::encode(selector),
            given: hex::encode(&data[..data.len().min(4)]),
        });
    }
    decode(&function.inputs, &data[4..])
}

/// Encode return data for `function`.
///
/// A single-output function takes the bare value. Otherwise `output` is a
/// positional `Tuple`/`Array`, or with [`ResultShape::Object`] a `Struct`
/// keyed like [`decode_result`] produces.
pub fn encode_result(
    function: &FunctionItem,
    output: &AbiValue,
    shape: ResultShape,
) -> Result<Vec<u8>, CodecError> {
    let outputs = &function.outputs;
    if outputs.len() == 1 {
        return encode(outputs, std::slice::from_ref(output));
    }
    if let Some(values) = output.as_slice() {
        return encode(outputs, values);
    }
    match (shape, output) {
        (ResultShape::Object, AbiValue::Struct(fields)) => {
            let values = outputs
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let key = param_key(p, i);
                    fields.get(&key).cloned().ok_or(CodecError::InvalidValue {
                        ty: p.ty.to_string(),
                        value: format!("missing field `{key}`"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            encode(outputs, &values)
        }
        (_, value) => Err(CodecError::InvalidValue {
            ty: format!("({})", type_list(outputs)),
            value: value.to_string(),
        }),
    }
}

/// Decode return data for `function`.
///
/// Returns `None` for a function without outputs and the bare value for a
/// single output.
pub fn decode_result(
    function: &FunctionItem,
    data: &[u8],
    shape: ResultShape,
) -> Result<Option<AbiValue>, CodecError> {
    let outputs = &function.outputs;
    let mut values = decode(outputs, data)?;
    match values.len() {
        0 => Ok(None),
        1 => Ok(values.pop()),
        _ => Ok(Some(match shape {
            ResultShape::Array => AbiValue::Tuple(values),
            ResultShape::Object => AbiValue::Struct(
                outputs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| param_key(p, i))
                    .zip(values)
                    .collect::<IndexMap<_, _>>(),
            ),
        })),
    }
}

/// Resolve the function whose selector leads `data` and decode its inputs.
pub fn decode_function_data(abi: &Abi, data: &[u8]) -> Result<DecodedCall, AbiError> {
    if data.len() < 4 {
        return Err(CodecError::DataSizeTooSmall {
            size: data.len(),
            ty: "bytes4".into(),
        }
        .into());
    }
    let selector = to_hex(&data[..4]);
    let resolved = resolve(abi, &selector, ResolveOptions::default().kind(ItemKind::Function))?;
    let function = resolved
        .item
        .as_function()
        .cloned()
        .ok_or_else(|| CodecError::SelectorMismatch {
            expected: String::new(),
            given: selector[2..].to_string(),
        })?;
    let args = decode_data(&function, data)?;
    debug!(function = %function.signature(), args = args.len(), "decoded call data");
    Ok(DecodedCall { function, args })
}

/// Resolve `name` against `args` and encode the call.
pub fn encode_function_call(abi: &Abi, name: &str, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let resolved = resolve(abi, name, ResolveOptions::with_args(args).kind(ItemKind::Function))?;
    let function = resolved
        .item
        .as_function()
        .ok_or_else(|| CodecError::InvalidValue {
            ty: "function".into(),
            value: name.to_string(),
        })?;
    Ok(encode_data(function, args)?)
}

pub(crate) fn param_key(param: &AbiParameter, index: usize) -> String {
    param.name().map(String::from).unwrap_or_else(|| index.to_string())
}

fn type_list(params: &[AbiParameter]) -> String {
    params
        .iter()
        .map(|p| p.ty.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
