//! Event logs: filter topics and log decoding.
//!
//! Indexed parameters live in topics 1..=3 (topic 0 is the signature hash
//! unless the event is anonymous); everything else is head/tail encoded in
//! the log data. Reference types (`string`, `bytes`, arrays, tuples) are
//! stored as the keccak-256 of their encoding when indexed, so only that
//! hash can be recovered from a topic.

use alloy_primitives::B256;
use chainabi_core::{
    bytes::{from_hex, to_hex},
    keccak256, Abi, AbiError, AbiParameter, AbiType, AbiValue, CodecError, EventItem, ItemKind,
};
use tracing::{debug, trace};

use crate::decoder::{decode, decode_single};
use crate::encoder::encode_word;
use crate::function::param_key;
use crate::overload::{resolve, ResolveOptions};

/// A decoded event log.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub event: EventItem,
    /// Values in declaration order, indexed and non-indexed interleaved as
    /// declared
    pub args: Vec<AbiValue>,
}

impl DecodedLog {
    pub fn named_args(&self) -> Vec<(String, &AbiValue)> {
        self.event
            .inputs
            .iter()
            .zip(&self.args)
            .enumerate()
            .map(|(i, (p, v))| (param_key(p, i), v))
            .collect()
    }

    pub fn arg(&self, name: &str) -> Option<&AbiValue> {
        self.event
            .inputs
            .iter()
            .position(|p| p.name() == Some(name))
            .and_then(|i| self.args.get(i))
    }
}

/// Build the topic list of a log filter for `event`.
///
/// `args` covers the indexed inputs in order; `None` (or a missing trailing
/// entry) leaves that topic as a wildcard.
pub fn encode_topics(event: &EventItem, args: &[Option<AbiValue>]) -> Result<Vec<Option<B256>>, CodecError> {
    let indexed: Vec<&AbiParameter> = event.inputs.iter().filter(|p| p.indexed).collect();
    if args.len() > indexed.len() {
        return Err(CodecError::LengthMismatch {
            expected: indexed.len(),
            given: args.len(),
        });
    }

    let mut topics = Vec::with_capacity(indexed.len() + 1);
    if !event.anonymous {
        topics.push(Some(event.signature_hash()));
    }
    for (param, arg) in indexed.iter().zip(args) {
        topics.push(match arg {
            Some(value) => Some(encode_topic(&param.ty, value)?),
            None => None,
        });
    }
    Ok(topics)
}

fn encode_topic(ty: &AbiType, value: &AbiValue) -> Result<B256, CodecError> {
    match ty {
        AbiType::String => match value {
            AbiValue::String(s) => Ok(keccak256(s.as_bytes())),
            other => Err(CodecError::InvalidValue {
                ty: ty.to_string(),
                value: other.to_string(),
            }),
        },
        AbiType::Bytes => match value {
            AbiValue::String(s) => Ok(keccak256(from_hex(s)?)),
            other => other.as_bytes().map(keccak256).ok_or(CodecError::InvalidValue {
                ty: ty.to_string(),
                value: other.to_string(),
            }),
        },
        AbiType::Tuple(_) | AbiType::Array { .. } => Err(CodecError::FilterTypeNotSupported {
            ty: ty.to_string(),
        }),
        _ => Ok(B256::from(encode_word(ty, value)?)),
    }
}

/// Decode a log emitted by `event`.
pub fn decode_log(event: &EventItem, topics: &[B256], data: &[u8]) -> Result<DecodedLog, CodecError> {
    let topics = if event.anonymous {
        topics
    } else {
        let (first, rest) = topics.split_first().ok_or_else(|| CodecError::TopicsMismatch {
            reason: "missing signature topic".into(),
        })?;
        if *first != event.signature_hash() {
            return Err(CodecError::TopicsMismatch {
                reason: format!(
                    "topic0 {first} does not match `{}` ({})",
                    event.signature(),
                    event.signature_hash()
                ),
            });
        }
        rest
    };

    let indexed_count = event.inputs.iter().filter(|p| p.indexed).count();
    if topics.len() != indexed_count {
        return Err(CodecError::TopicsMismatch {
            reason: format!(
                "`{}` has {indexed_count} indexed inputs, log carries {} topics",
                event.signature(),
                topics.len()
            ),
        });
    }

    let body: Vec<AbiParameter> = event.inputs.iter().filter(|p| !p.indexed).cloned().collect();
    let mut body_values = decode(&body, data)?.into_iter();
    let mut topic_iter = topics.iter();

    let mut args = Vec::with_capacity(event.inputs.len());
    for param in &event.inputs {
        let value = if param.indexed {
            // counts were checked above
            let topic = topic_iter.next().ok_or_else(|| CodecError::TopicsMismatch {
                reason: "topic list exhausted".into(),
            })?;
            decode_topic(&param.ty, topic)?
        } else {
            body_values.next().ok_or(CodecError::ZeroData)?
        };
        args.push(value);
    }

    trace!(event = %event.signature(), args = args.len(), "decoded log");
    Ok(DecodedLog {
        event: event.clone(),
        args,
    })
}

fn decode_topic(ty: &AbiType, topic: &B256) -> Result<AbiValue, CodecError> {
    match ty {
        AbiType::String | AbiType::Bytes | AbiType::Tuple(_) | AbiType::Array { .. } => {
            Ok(AbiValue::FixedBytes(*topic, 32))
        }
        _ => decode_single(ty, topic.as_slice()),
    }
}

/// Resolve the event by topic 0 and decode the log.
pub fn decode_event_log(abi: &Abi, topics: &[B256], data: &[u8]) -> Result<DecodedLog, AbiError> {
    let topic0 = topics.first().ok_or_else(|| CodecError::TopicsMismatch {
        reason: "log has no topics".into(),
    })?;
    let resolved = resolve(abi, &to_hex(topic0.as_slice()), ResolveOptions::default().kind(ItemKind::Event))?;
    let event = resolved.item.as_event().ok_or_else(|| CodecError::TopicsMismatch {
        reason: format!("no event for topic0 {topic0}"),
    })?;
    let log = decode_log(event, topics, data)?;
    debug!(event = %event.name, "decoded event log");
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use alloy_primitives::{Address, U256};
    use chainabi_core::{parse_abi_item, ResolveError};

    fn event(text: &str) -> EventItem {
        parse_abi_item(text).unwrap().as_event().cloned().unwrap()
    }

    fn address_topic(a: Address) -> B256 {
        B256::left_padding_from(a.as_slice())
    }

    const FROM: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    const TO: &str = "0xA0Cf798816D4b9b9866b5330EEa46a18382f251e";

    #[test]
    fn transfer_log_roundtrip() {
        let transfer = event("event Transfer(address indexed from, address indexed to, uint256 value)");
        let from: Address = FROM.parse().unwrap();
        let to: Address = TO.parse().unwrap();

        let topics = encode_topics(&transfer, &[Some(AbiValue::from(FROM)), Some(AbiValue::Address(to))]).unwrap();
        let topics: Vec<B256> = topics.into_iter().map(Option::unwrap).collect();
        assert_eq!(
            to_hex(topics[0].as_slice()),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(topics[1], address_topic(from));

        let data = encode(&transfer.inputs[2..], &[AbiValue::from(1_000u64)]).unwrap();
        let log = decode_log(&transfer, &topics, &data).unwrap();
        assert_eq!(log.arg("from"), Some(&AbiValue::Address(from)));
        assert_eq!(log.arg("to"), Some(&AbiValue::Address(to)));
        assert_eq!(log.arg("value").and_then(AbiValue::as_uint), Some(U256::from(1_000u64)));
    }

    #[test]
    fn wildcards_and_hashed_strings() {
        let e = event("event Named(string indexed label, address indexed owner, bytes indexed blob)");
        let topics = encode_topics(&e, &[Some(AbiValue::from("vitalik")), None]).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[1], Some(keccak256("vitalik")));
        assert_eq!(topics[2], None);

        let topics = encode_topics(&e, &[None, None, Some(AbiValue::from("0x0102"))]).unwrap();
        assert_eq!(topics[3], Some(keccak256([1u8, 2])));

        assert!(matches!(
            encode_topics(&e, &[None, None, None, None]),
            Err(CodecError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn tuple_filters_are_rejected() {
        let e = event("event Moved((uint256,uint256) indexed pos)");
        assert!(matches!(
            encode_topics(&e, &[Some(AbiValue::Tuple(vec![1u64.into(), 2u64.into()]))]),
            Err(CodecError::FilterTypeNotSupported { .. })
        ));
        // wildcards are fine
        assert_eq!(encode_topics(&e, &[None]).unwrap().len(), 2);
    }

    #[test]
    fn dynamic_indexed_values_decode_to_their_hash() {
        let e = event("event Named(string indexed label, uint256 value)");
        let hash = keccak256("vitalik");
        let topics = vec![e.signature_hash(), hash];
        let data = encode(&e.inputs[1..], &[AbiValue::from(3u64)]).unwrap();
        let log = decode_log(&e, &topics, &data).unwrap();
        assert_eq!(log.args[0], AbiValue::FixedBytes(hash, 32));
        assert_eq!(log.args[1], AbiValue::from(3u64));
    }

    #[test]
    fn anonymous_events_have_no_signature_topic() {
        let e = event("event Ping(uint256 indexed id) anonymous");
        let topics = encode_topics(&e, &[Some(AbiValue::from(9u64))]).unwrap();
        assert_eq!(topics.len(), 1);
        let log = decode_log(&e, &[topics[0].unwrap()], &[]).unwrap();
        assert_eq!(log.args, vec![AbiValue::from(9u64)]);
    }

    #[test]
    fn topic_mismatches() {
        let transfer = event("event Transfer(address indexed from, address indexed to, uint256 value)");
        assert!(matches!(
            decode_log(&transfer, &[], &[]),
            Err(CodecError::TopicsMismatch { .. })
        ));
        assert!(matches!(
            decode_log(&transfer, &[B256::ZERO], &[]),
            Err(CodecError::TopicsMismatch { .. })
        ));
        assert!(matches!(
            decode_log(&transfer, &[transfer.signature_hash()], &[]),
            Err(CodecError::TopicsMismatch { .. })
        ));
    }

    #[test]
    fn resolves_event_by_topic0() {
        let abi = Abi::parse(&[
            "function Transfer(address to)",
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "event Approval(address indexed owner, address indexed spender, uint256 value)",
        ])
        .unwrap();
        let approval = abi.events().nth(1).and_then(|e| e.as_event()).cloned().unwrap();
        let owner: Address = FROM.parse().unwrap();
        let spender: Address = TO.parse().unwrap();
        let topics = vec![approval.signature_hash(), address_topic(owner), address_topic(spender)];
        let data = encode(&approval.inputs[2..], &[AbiValue::from(5u64)]).unwrap();

        let log = decode_event_log(&abi, &topics, &data).unwrap();
        assert_eq!(log.event.name, "Approval");
        assert_eq!(log.named_args()[1].0, "spender");

        assert!(matches!(
            decode_event_log(&abi, &[B256::ZERO], &data),
            Err(AbiError::Resolve(ResolveError::NotFound { .. }))
        ));
        assert!(matches!(decode_event_log(&abi, &[], &data), Err(AbiError::Codec(_))));
    }
}
