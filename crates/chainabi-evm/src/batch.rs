//! Rayon-powered batch log decoding.
//!
//! Every log is resolved against the ABI by its topic 0 and decoded
//! independently, so a batch parallelises without any shared state.

use alloy_primitives::{Bytes, B256};
use chainabi_core::{Abi, AbiError};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::event::{decode_event_log, DecodedLog};

/// A raw log as returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLog {
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl RawLog {
    pub fn new(topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            topics,
            data: data.into(),
        }
    }
}

/// Controls how a batch reacts to individual decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Silently skip logs that fail to decode.
    #[default]
    Skip,
    /// Collect decode errors alongside successes and return both at the end.
    Collect,
    /// Abort the entire batch on the first error.
    Throw,
}

/// Successful logs plus any collected errors.
#[derive(Debug)]
pub struct BatchDecodeResult {
    pub logs: Vec<DecodedLog>,
    /// Populated only when `ErrorMode::Collect` is used.
    pub errors: Vec<(usize, AbiError)>,
}

#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("log {index} failed to decode: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: AbiError,
    },
}

/// Decode `logs` in parallel. Output order follows input order.
pub fn decode_logs(abi: &Abi, logs: &[RawLog], mode: ErrorMode) -> Result<BatchDecodeResult, BatchDecodeError> {
    let results: Vec<(usize, Result<DecodedLog, AbiError>)> = logs
        .par_iter()
        .enumerate()
        .map(|(idx, raw)| (idx, decode_event_log(abi, &raw.topics, &raw.data)))
        .collect();

    let mut decoded = Vec::with_capacity(logs.len());
    let mut errors = Vec::new();

    for (idx, result) in results {
        match result {
            Ok(log) => decoded.push(log),
            Err(err) => match mode {
                ErrorMode::Skip => {}
                ErrorMode::Collect => errors.push((idx, err)),
                ErrorMode::Throw => {
                    return Err(BatchDecodeError::ItemFailed {
                        index: idx,
                        source: err,
                    });
                }
            },
        }
    }

    debug!(
        total = logs.len(),
        decoded = decoded.len(),
        failed = logs.len() - decoded.len(),
        "batch decode finished"
    );
    Ok(BatchDecodeResult {
        logs: decoded,
        errors,
    })
}
