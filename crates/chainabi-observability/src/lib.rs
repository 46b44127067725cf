//! # chainabi-observability
//!
//! Logging and OpenTelemetry metrics for ChainABI.
//!
//! ## Built-in metrics
//! - `chainabi.items_resolved`: counter, tagged with item kind
//! - `chainabi.ambiguities`: counter, tagged with item name
//! - `chainabi.resolve_failures`: counter, tagged with item name
//! - `chainabi.encoded_bytes`: histogram, tagged with operation
//! - `chainabi.decoded_bytes`: histogram, tagged with operation
//! - `chainabi.codec_latency_ms`: histogram, tagged with operation
//!
//! ## Structured logging
//! Human-readable or JSON logs, with per-component levels.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::CodecMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
