//! Codec and resolver benchmarks.
//!
//! # Running
//! ```bash
//! cargo bench --package chainabi-evm
//! ```

use alloy_primitives::{Bytes, B256};
use chainabi_core::{Abi, AbiValue};
use chainabi_evm::{
    batch::{decode_logs, ErrorMode, RawLog},
    decode, encode, encode_function_call,
    overload::{resolve, ResolveOptions},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ─── ABI setup ────────────────────────────────────────────────────────────────

fn make_abi() -> Abi {
    Abi::parse(&[
        "struct Call { address target; bool allowFailure; bytes callData; }",
        "function transfer(address to, uint256 amount) returns (bool)",
        "function transfer(address to)",
        "function transfer(string memo, uint256 amount)",
        "function aggregate3(Call[] calls) payable returns ((bool success, bytes returnData)[] returnData)",
        "event Transfer(address indexed from, address indexed to, uint256 value)",
    ])
    .expect("parse bench ABI")
}

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

fn aggregate_args(n: usize) -> Vec<AbiValue> {
    let call = AbiValue::Tuple(vec![
        AbiValue::from(VITALIK),
        AbiValue::Bool(false),
        AbiValue::Bytes(Bytes::from(vec![0xab; 68])),
    ]);
    vec![AbiValue::Array(vec![call; n])]
}

// ─── Log factory ──────────────────────────────────────────────────────────────

fn make_transfer_log(i: u64) -> RawLog {
    // vary the payload so every log is distinct
    let sender_byte = (i & 0xFF) as u8;
    let mut from_topic = [0u8; 32];
    from_topic[31] = sender_byte;
    let mut to_topic = [0u8; 32];
    to_topic[31] = sender_byte.wrapping_add(1);

    let mut data = vec![0u8; 32];
    data[24..].copy_from_slice(&i.to_be_bytes());

    RawLog::new(
        vec![
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
                .parse::<B256>()
                .expect("topic0"),
            B256::from(from_topic),
            B256::from(to_topic),
        ],
        data,
    )
}

// ─── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_encode_call(c: &mut Criterion) {
    let abi = make_abi();
    let args = [AbiValue::from(VITALIK), AbiValue::from(1_000u64)];
    c.bench_function("encode_function_call_transfer", |b| {
        b.iter(|| encode_function_call(black_box(&abi), "transfer", black_box(&args)));
    });
}

fn bench_nested_roundtrip(c: &mut Criterion) {
    let abi = make_abi();
    let params = abi.overloads("aggregate3")[0].inputs().to_vec();

    let mut group = c.benchmark_group("aggregate3_roundtrip");
    for n in [1usize, 16, 256] {
        let args = aggregate_args(n);
        let data = encode(&params, &args).expect("encode");
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", n), &args, |b, args| {
            b.iter(|| encode(&params, black_box(args)));
        });
        group.bench_with_input(BenchmarkId::new("decode", n), &data, |b, data| {
            b.iter(|| decode(&params, black_box(data)));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let abi = make_abi();
    let args = [AbiValue::from("gm"), AbiValue::from(1u64)];
    c.bench_function("resolve_overload_by_args", |b| {
        b.iter(|| resolve(&abi, "transfer", ResolveOptions::with_args(black_box(&args))));
    });
    c.bench_function("resolve_by_selector", |b| {
        b.iter(|| resolve(&abi, black_box("0xa9059cbb"), ResolveOptions::default()));
    });
}

fn bench_batch_logs(c: &mut Criterion) {
    let abi = make_abi();
    let mut group = c.benchmark_group("decode_logs_rayon");
    for batch_size in [1_000usize, 10_000, 100_000] {
        let batch: Vec<RawLog> = (0..batch_size as u64).map(make_transfer_log).collect();
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &batch, |b, batch| {
            b.iter(|| decode_logs(&abi, batch, ErrorMode::Skip));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode_call,
    bench_nested_roundtrip,
    bench_resolve,
    bench_batch_logs,
);
criterion_main!(benches);
