//! ChainABI CLI: signatures, selectors and ABI call data from the shell.
//!
//! # Commands
//! ```text
//! chainabi normalize     <signature>
//! chainabi selector      <signature> [--full]
//! chainabi format        --abi <path> [--json]
//! chainabi encode        --abi <path> <name> [--args <json>] [--bytecode <hex>]
//! chainabi decode        --abi <path> <calldata>
//! chainabi decode-result --abi <path> <function> <data> [--object]
//! chainabi decode-log    --abi <path> --topics <...> [--data <hex>]
//! chainabi decode-error  [--abi <path>] <data>
//! chainabi info          [--abi <path>]
//! ```
//!
//! ABI files may be standard Solidity JSON or one human-readable
//! declaration per line (`struct` lines included).

use anyhow::{anyhow, bail, Context, Result};
use chainabi_core::{
    bytes::{from_hex, to_hex},
    normalize_signature, selector, signature_hash, Abi, AbiItem, AbiValue, ItemKind, ParseOptions,
};
use chainabi_observability::{init_tracing, CodecMetrics};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod cmd_decode;
mod config;

use config::Config;

#[derive(Parser)]
#[command(
    name = "chainabi",
    about = "Ethereum ABI toolkit (ChainABI CLI)",
    long_about = "
ChainABI CLI: normalize signatures, compute selectors, encode call data and
decode call data, return data, event logs and revert data.
",
    version
)]
struct Cli {
    /// YAML config file (log settings, hash preparation)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override: trace | debug | info | warn | error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON structured logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical signature of a declaration
    Normalize {
        /// e.g. "function transfer(address to, uint256 amount) returns (bool)"
        signature: String,
    },

    /// Print the 4-byte selector (or full 32-byte hash) of a declaration
    Selector {
        signature: String,
        /// Print the full keccak-256 hash (event topic)
        #[arg(long)]
        full: bool,
    },

    /// Render every item of an ABI as a human-readable declaration
    Format {
        /// Path to the ABI file
        #[arg(long)]
        abi: PathBuf,
        /// Print Solidity ABI JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Encode a function call (or constructor deploy data)
    Encode {
        #[arg(long)]
        abi: PathBuf,
        /// Function name, selector, or "constructor"
        name: String,
        /// JSON array of arguments, e.g. '["0xabc...", "1000000"]'
        #[arg(long, default_value = "[]")]
        args: String,
        /// Creation bytecode prepended to constructor arguments
        #[arg(long, default_value = "0x")]
        bytecode: String,
    },

    /// Decode call data, resolving the function by its selector
    Decode {
        #[arg(long)]
        abi: PathBuf,
        /// Raw call data (0x-prefixed hex)
        calldata: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode the return data of a function
    #[command(name = "decode-result")]
    DecodeResult {
        #[arg(long)]
        abi: PathBuf,
        /// Function name or selector
        function: String,
        /// Raw return data (0x-prefixed hex)
        data: String,
        /// Key multi-value results by output name
        #[arg(long)]
        object: bool,
        #[arg(long)]
        json: bool,
    },

    /// Decode an event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        #[arg(long)]
        abi: PathBuf,
        /// topics[0] = event topic hash, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode revert data (Error(string), Panic(uint256) or a custom error)
    #[command(name = "decode-error")]
    DecodeError {
        /// ABI declaring custom errors (optional)
        #[arg(long)]
        abi: Option<PathBuf>,
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Show build info, or a summary of an ABI
    Info {
        #[arg(long)]
        abi: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.log_level.as_deref(), cli.log_json);
    init_tracing(&config.log);

    let metrics = CodecMetrics::global();
    let options = ParseOptions {
        prepare: config.prepare,
    };

    match cli.command {
        Commands::Normalize { signature } => cmd_normalize(&signature),
        Commands::Selector { signature, full } => cmd_selector(&signature, full),
        Commands::Format { abi, json } => cmd_format(&load_abi(&abi, options)?, json),
        Commands::Encode {
            abi,
            name,
            args,
            bytecode,
        } => cmd_encode(&load_abi(&abi, options)?, &name, &args, &bytecode, &metrics),
        Commands::Decode { abi, calldata, json } => {
            cmd_decode::call(&load_abi(&abi, options)?, &calldata, json, &metrics)
        }
        Commands::DecodeResult {
            abi,
            function,
            data,
            object,
            json,
        } => cmd_decode::result(&load_abi(&abi, options)?, &function, &data, object, json, &metrics),
        Commands::DecodeLog {
            abi,
            topics,
            data,
            json,
        } => cmd_decode::log(&load_abi(&abi, options)?, &topics, &data, json, &metrics),
        Commands::DecodeError { abi, data, json } => {
            let abi = match abi {
                Some(path) => load_abi(&path, options)?,
                None => Abi::default(),
            };
            cmd_decode::revert(&abi, &data, json, &metrics)
        }
        Commands::Info { abi } => match abi {
            Some(path) => cmd_info_abi(&load_abi(&path, options)?),
            None => cmd_info(),
        },
    }
}

// ─── Input helpers ───────────────────────────────────────────────────────────

/// Load an ABI file: a JSON array, or human-readable lines (blank lines and
/// `#` / `//` comments skipped).
fn load_abi(path: &Path, options: ParseOptions) -> Result<Abi> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read ABI file '{}'", path.display()))?;
    parse_abi_text(&text, options).with_context(|| format!("parse ABI file '{}'", path.display()))
}

fn parse_abi_text(text: &str, options: ParseOptions) -> Result<Abi> {
    if text.trim_start().starts_with('[') {
        return Ok(Abi::from_json_with(text, options)?);
    }
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
        .collect();
    Ok(Abi::parse_with(&lines, options)?)
}

pub(crate) fn parse_hex(label: &str, s: &str) -> Result<Vec<u8>> {
    from_hex(s).with_context(|| format!("invalid {label} hex"))
}

fn parse_args(json: &str) -> Result<Vec<AbiValue>> {
    let value: serde_json::Value = serde_json::from_str(json).context("parse args JSON")?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("args must be a JSON array"))?;
    items
        .iter()
        .map(|v| AbiValue::from_json(v).map_err(Into::into))
        .collect()
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_normalize(signature: &str) -> Result<()> {
    println!("{}", normalize_signature(signature)?);
    Ok(())
}

fn cmd_selector(signature: &str, full: bool) -> Result<()> {
    if full {
        println!("{}", signature_hash(signature)?);
    } else {
        println!("{}", selector(signature)?);
    }
    Ok(())
}

fn cmd_format(abi: &Abi, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", abi.to_json()?);
    } else {
        for line in abi.format() {
            println!("{line}");
        }
    }
    Ok(())
}

fn cmd_encode(abi: &Abi, name: &str, args_json: &str, bytecode: &str, metrics: &CodecMetrics) -> Result<()> {
    let args = parse_args(args_json)?;
    let start = Instant::now();

    let data = if name == "constructor" {
        let constructor = abi
            .constructor()
            .ok_or_else(|| anyhow!("ABI has no constructor"))?;
        let bytecode = parse_hex("bytecode", bytecode)?;
        chainabi_evm::encode_deploy(constructor, &bytecode, &args)?
    } else {
        let data = chainabi_evm::encode_function_call(abi, name, &args)
            .map_err(|e| cmd_decode::record_failure(metrics, name, e))?;
        metrics.record_resolved("function");
        data
    };

    metrics.record_latency("encode", start.elapsed().as_secs_f64() * 1e3);
    metrics.record_encoded("encode", data.len());
    println!("{}", to_hex(&data));
    Ok(())
}

fn cmd_info_abi(abi: &Abi) -> Result<()> {
    if abi.is_empty() {
        bail!("ABI has no items");
    }
    for kind in [ItemKind::Function, ItemKind::Event, ItemKind::Error] {
        let items: Vec<&AbiItem> = abi.of_kind(kind).collect();
        if items.is_empty() {
            continue;
        }
        println!("{}s ({}):", kind, items.len());
        for item in items {
            let hash = match kind {
                ItemKind::Event => item.signature_hash().to_string(),
                _ => item.selector().to_string(),
            };
            let overloads = item.name().map_or(0, |n| abi.overloads_of(kind, n).len());
            let marker = if overloads > 1 { "  [overloaded]" } else { "" };
            println!("  {hash}  {}{marker}", item.signature());
        }
    }
    if let Some(constructor) = abi.constructor() {
        println!("constructor: {}", AbiItem::Constructor(constructor.clone()).format());
    }
    if abi.has_fallback() {
        println!("fallback:    yes");
    }
    if abi.has_receive() {
        println!("receive:     yes");
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("ChainABI v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Capabilities:");
    println!("  ✓ Signature normalization    (human-readable + JSON ABI)");
    println!("  ✓ Selector / topic hashing   (keccak-256)");
    println!("  ✓ Head/tail ABI codec        (nested tuples, dynamic arrays)");
    println!("  ✓ Overload resolution        (argument shape + ambiguity detection)");
    println!("  ✓ Event logs                 (topics + data, parallel batch decode)");
    println!("  ✓ Revert data                (Error(string), Panic(uint256), custom errors)");
    println!("  ✓ Constructor deploy data");
    Ok(())
}
