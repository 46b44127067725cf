//! `chainabi decode*`: call data, return data, logs and revert data.

use alloy_primitives::B256;
use anyhow::{anyhow, Context, Result};
use chainabi_core::{Abi, AbiError, AbiValue, ItemKind, ResolveError};
use chainabi_evm::{
    decode_event_log, decode_function_data, decode_result, decode_revert, resolve, DecodedRevert,
    ResolveOptions, ResultShape,
};
use chainabi_observability::CodecMetrics;
use serde_json::{json, Map, Value};
use std::time::Instant;

use crate::parse_hex;

pub fn call(abi: &Abi, calldata: &str, as_json: bool, metrics: &CodecMetrics) -> Result<()> {
    let data = parse_hex("calldata", calldata)?;
    let start = Instant::now();
    let decoded = decode_function_data(abi, &data).map_err(|e| record_failure(metrics, calldata, e))?;
    record_success(metrics, "function", "decode", data.len(), start);

    let named = decoded.named_args();
    if as_json {
        let doc = json!({
            "function": decoded.function.signature(),
            "selector": decoded.function.selector().to_string(),
            "args": named_json(&named),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("Function:  {}", decoded.function.signature());
        println!("Selector:  {}", decoded.function.selector());
        println!("Inputs:");
        for (name, value) in named {
            println!("  {name}: {value}");
        }
    }
    Ok(())
}

pub fn result(
    abi: &Abi,
    function: &str,
    data: &str,
    object: bool,
    as_json: bool,
    metrics: &CodecMetrics,
) -> Result<()> {
    let bytes = parse_hex("return data", data)?;
    let resolved = resolve(abi, function, ResolveOptions::default().kind(ItemKind::Function))
        .map_err(|e| record_failure(metrics, function, AbiError::from(e)))?;
    let item = resolved
        .item
        .as_function()
        .ok_or_else(|| anyhow!("`{function}` is not a function"))?;

    let shape = if object { ResultShape::Object } else { ResultShape::Array };
    let start = Instant::now();
    let value = decode_result(item, &bytes, shape).with_context(|| format!("decode result of {}", item.signature()))?;
    record_success(metrics, "function", "decode-result", bytes.len(), start);

    match value {
        None if as_json => println!("null"),
        None => println!("(no outputs)"),
        Some(v) if as_json => println!("{}", serde_json::to_string_pretty(&v.to_json())?),
        Some(v) => println!("{v}"),
    }
    Ok(())
}

pub fn log(abi: &Abi, topics: &[String], data: &str, as_json: bool, metrics: &CodecMetrics) -> Result<()> {
    let topics = topics
        .iter()
        .map(|t| parse_topic(t))
        .collect::<Result<Vec<B256>>>()?;
    let bytes = parse_hex("data", data)?;

    let start = Instant::now();
    let topic0 = topics.first().map(ToString::to_string).unwrap_or_default();
    let log = decode_event_log(abi, &topics, &bytes).map_err(|e| record_failure(metrics, &topic0, e))?;
    record_success(metrics, "event", "decode-log", bytes.len() + 32 * topics.len(), start);

    let named = log.named_args();
    if as_json {
        let doc = json!({
            "event": log.event.signature(),
            "topic0": log.event.signature_hash().to_string(),
            "args": named_json(&named),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("Event:   {}", log.event.signature());
        println!("Fields:");
        for ((name, value), param) in named.iter().zip(&log.event.inputs) {
            let indexed = if param.indexed { " [indexed]" } else { "" };
            println!("  {name}: {value}{indexed}");
        }
    }
    Ok(())
}

pub fn revert(abi: &Abi, data: &str, as_json: bool, metrics: &CodecMetrics) -> Result<()> {
    let bytes = parse_hex("revert data", data)?;
    let start = Instant::now();
    let decoded = decode_revert(abi, &bytes).map_err(|e| record_failure(metrics, data, e))?;
    record_success(metrics, "error", "decode-error", bytes.len(), start);

    if as_json {
        let doc = match &decoded {
            DecodedRevert::Reason(reason) => json!({ "kind": "Error", "reason": reason }),
            DecodedRevert::Panic(code) => json!({
                "kind": "Panic",
                "code": code.to_string(),
                "reason": chainabi_evm::panic_reason(*code),
            }),
            DecodedRevert::Custom { error, args } => json!({
                "kind": "Custom",
                "error": error.signature(),
                "args": Value::Array(args.iter().map(AbiValue::to_json).collect()),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{decoded}");
    }
    Ok(())
}

fn parse_topic(s: &str) -> Result<B256> {
    let bytes = parse_hex("topic", s)?;
    if bytes.len() != 32 {
        anyhow::bail!("topic '{s}' is {} bytes, expected 32", bytes.len());
    }
    Ok(B256::from_slice(&bytes))
}

fn named_json(named: &[(String, &AbiValue)]) -> Value {
    let map: Map<String, Value> = named.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
    Value::Object(map)
}

fn record_success(metrics: &CodecMetrics, kind: &str, operation: &str, bytes: usize, start: Instant) {
    metrics.record_resolved(kind);
    metrics.record_decoded(operation, bytes);
    metrics.record_latency(operation, start.elapsed().as_secs_f64() * 1e3);
}

/// Count a failed resolution and hand the error back for `?`.
pub(crate) fn record_failure(metrics: &CodecMetrics, name: &str, err: AbiError) -> AbiError {
    match &err {
        AbiError::Resolve(ResolveError::Ambiguity { .. }) => metrics.record_ambiguity(name),
        AbiError::Resolve(ResolveError::NotFound { .. }) => metrics.record_resolve_failure(name),
        _ => {}
    }
    tracing::debug!(name, error = %err, "ABI operation failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_must_be_32_bytes() {
        let t = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
        assert_eq!(parse_topic(t).unwrap().to_string(), t);
        assert!(parse_topic("0xddf252ad").is_err());
    }

    #[test]
    fn named_args_render_in_order() {
        let a = AbiValue::from(1u64);
        let b = AbiValue::Bool(true);
        let doc = named_json(&[("z".to_string(), &a), ("a".to_string(), &b)]);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"z":"1","a":true}"#);
    }
}
