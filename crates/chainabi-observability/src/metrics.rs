//! ChainABI codec metrics.
//!
//! All metrics use OpenTelemetry conventions. Without an installed meter
//! provider every instrument is a no-op.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle for the codec and resolver.
#[derive(Clone)]
pub struct CodecMetrics {
    pub items_resolved: Counter<u64>,
    pub ambiguities: Counter<u64>,
    pub resolve_failures: Counter<u64>,
    pub encoded_bytes: Histogram<u64>,
    pub decoded_bytes: Histogram<u64>,
    pub codec_latency_ms: Histogram<f64>,
}

impl CodecMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            items_resolved: meter
                .u64_counter("chainabi.items_resolved")
                .with_description("ABI items selected by overload resolution")
                .build(),
            ambiguities: meter
                .u64_counter("chainabi.ambiguities")
                .with_description("Resolutions rejected because overloads collide on the wire")
                .build(),
            resolve_failures: meter
                .u64_counter("chainabi.resolve_failures")
                .with_description("Resolutions that found no matching item")
                .build(),
            encoded_bytes: meter
                .u64_histogram("chainabi.encoded_bytes")
                .with_description("Size of produced call data, return data or topics")
                .build(),
            decoded_bytes: meter
                .u64_histogram("chainabi.decoded_bytes")
                .with_description("Size of decoded payloads")
                .build(),
            codec_latency_ms: meter
                .f64_histogram("chainabi.codec_latency_ms")
                .with_description("Time to encode or decode one payload in milliseconds")
                .build(),
        }
    }

    /// Metrics on the global `chainabi` meter.
    pub fn global() -> Self {
        Self::new(&global::meter("chainabi"))
    }

    pub fn record_resolved(&self, kind: &str) {
        self.items_resolved
            .add(1, &[KeyValue::new("kind", kind.to_string())]);
    }

    pub fn record_ambiguity(&self, name: &str) {
        self.ambiguities
            .add(1, &[KeyValue::new("name", name.to_string())]);
    }

    pub fn record_resolve_failure(&self, name: &str) {
        self.resolve_failures
            .add(1, &[KeyValue::new("name", name.to_string())]);
    }

    pub fn record_encoded(&self, operation: &str, bytes: usize) {
        self.encoded_bytes
            .record(bytes as u64, &[KeyValue::new("operation", operation.to_string())]);
    }

    pub fn record_decoded(&self, operation: &str, bytes: usize) {
        self.decoded_bytes
            .record(bytes as u64, &[KeyValue::new("operation", operation.to_string())]);
    }

    pub fn record_latency(&self, operation: &str, ms: f64) {
        self.codec_latency_ms
            .record(ms, &[KeyValue::new("operation", operation.to_string())]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_a_provider_is_a_noop() {
        let metrics = CodecMetrics::global();
        metrics.record_resolved("function");
        metrics.record_ambiguity("foo");
        metrics.record_resolve_failure("bar");
        metrics.record_encoded("encode", 68);
        metrics.record_decoded("decode-log", 96);
        metrics.record_latency("encode", 0.02);
    }
}
