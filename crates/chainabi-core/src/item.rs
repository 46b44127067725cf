//! ABI items: functions, events, errors, constructors, fallback and receive.
//!
//! Functions, events and errors carry a signature hash. It is computed once by
//! [`AbiItem::prepare`] and stored as a plain field; unprepared items compute
//! it on demand instead. Both paths produce the same value.

use alloy_primitives::{Selector, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SignatureError;
use crate::format;
use crate::hash::{hash_canonical, selector_of};
use crate::types::AbiParameter;

/// Solidity state mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }

    /// Parse a mutability keyword as written in Solidity source.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of an [`AbiItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Function,
    Event,
    Error,
    Constructor,
    Fallback,
    Receive,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Function => "function",
            ItemKind::Event => "event",
            ItemKind::Error => "error",
            ItemKind::Constructor => "constructor",
            ItemKind::Fallback => "fallback",
            ItemKind::Receive => "receive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Eq)]
pub struct FunctionItem {
    pub name: String,
    pub inputs: Vec<AbiParameter>,
    pub outputs: Vec<AbiParameter>,
    pub state_mutability: StateMutability,
    hash: Option<B256>,
}

impl FunctionItem {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<AbiParameter>,
        outputs: Vec<AbiParameter>,
        state_mutability: StateMutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability,
            hash: None,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn signature_hash(&self) -> B256 {
        self.hash
            .unwrap_or_else(|| hash_canonical(&self.signature()))
    }

    pub fn selector(&self) -> Selector {
        selector_of(&self.signature_hash())
    }
}

#[derive(Debug, Clone, Eq)]
pub struct EventItem {
    pub name: String,
    pub inputs: Vec<AbiParameter>,
    pub anonymous: bool,
    hash: Option<B256>,
}

impl EventItem {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParameter>, anonymous: bool) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous,
            hash: None,
        }
    }

    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Topic hash (`topic0` of non-anonymous logs).
    pub fn signature_hash(&self) -> B256 {
        self.hash
            .unwrap_or_else(|| hash_canonical(&self.signature()))
    }
}

#[derive(Debug, Clone, Eq)]
pub struct ErrorItem {
    pub name: String,
    pub inputs: Vec<AbiParameter>,
    hash: Option<B256>,
}

impl ErrorItem {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParameter>) -> Self {
        Self {
            name: name.into(),
            inputs,
            hash: None,
        }
    }

    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn signature_hash(&self) -> B256 {
        self.hash
            .unwrap_or_else(|| hash_canonical(&self.signature()))
    }

    pub fn selector(&self) -> Selector {
        selector_of(&self.signature_hash())
    }
}

// The cached hash is derived from the other fields and takes no part in equality.
impl PartialEq for FunctionItem {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.state_mutability == other.state_mutability
    }
}

impl PartialEq for EventItem {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.inputs == other.inputs && self.anonymous == other.anonymous
    }
}

impl PartialEq for ErrorItem {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.inputs == other.inputs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructorItem {
    pub inputs: Vec<AbiParameter>,
    pub state_mutability: StateMutability,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackItem {
    pub state_mutability: StateMutability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveItem {
    pub state_mutability: StateMutability,
}

impl Default for ReceiveItem {
    fn default() -> Self {
        Self {
            state_mutability: StateMutability::Payable,
        }
    }
}

/// One entry of a contract ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawItem", into = "RawItem")]
pub enum AbiItem {
    Function(FunctionItem),
    Event(EventItem),
    Error(ErrorItem),
    Constructor(ConstructorItem),
    Fallback(FallbackItem),
    Receive(ReceiveItem),
}

impl AbiItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            AbiItem::Function(_) => ItemKind::Function,
            AbiItem::Event(_) => ItemKind::Event,
            AbiItem::Error(_) => ItemKind::Error,
            AbiItem::Constructor(_) => ItemKind::Constructor,
            AbiItem::Fallback(_) => ItemKind::Fallback,
            AbiItem::Receive(_) => ItemKind::Receive,
        }
    }

    /// Item name; `None` for constructor, fallback and receive.
    pub fn name(&self) -> Option<&str> {
        match self {
            AbiItem::Function(f) => Some(&f.name),
            AbiItem::Event(e) => Some(&e.name),
            AbiItem::Error(e) => Some(&e.name),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[AbiParameter] {
        match self {
            AbiItem::Function(f) => &f.inputs,
            AbiItem::Event(e) => &e.inputs,
            AbiItem::Error(e) => &e.inputs,
            AbiItem::Constructor(c) => &c.inputs,
            AbiItem::Fallback(_) | AbiItem::Receive(_) => &[],
        }
    }

    pub fn outputs(&self) -> &[AbiParameter] {
        match self {
            AbiItem::Function(f) => &f.outputs,
            _ => &[],
        }
    }

    pub fn as_function(&self) -> Option<&FunctionItem> {
        match self {
            AbiItem::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventItem> {
        match self {
            AbiItem::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorItem> {
        match self {
            AbiItem::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn state_mutability(&self) -> Option<StateMutability> {
        match self {
            AbiItem::Function(f) => Some(f.state_mutability),
            AbiItem::Constructor(c) => Some(c.state_mutability),
            AbiItem::Fallback(f) => Some(f.state_mutability),
            AbiItem::Receive(r) => Some(r.state_mutability),
            AbiItem::Event(_) | AbiItem::Error(_) => None,
        }
    }

    /// Canonical signature. Unnamed items use their kind as the name.
    pub fn signature(&self) -> String {
        match self.name() {
            Some(name) => canonical_signature(name, self.inputs()),
            None => canonical_signature(&self.kind().to_string(), self.inputs()),
        }
    }

    /// The hash cached by [`AbiItem::prepare`], if any.
    pub fn hash(&self) -> Option<B256> {
        match self {
            AbiItem::Function(f) => f.hash,
            AbiItem::Event(e) => e.hash,
            AbiItem::Error(e) => e.hash,
            _ => None,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.hash().is_some()
    }

    /// keccak-256 of the canonical signature, from the cache when prepared.
    pub fn signature_hash(&self) -> B256 {
        self.hash()
            .unwrap_or_else(|| hash_canonical(&self.signature()))
    }

    /// First four bytes of [`AbiItem::signature_hash`].
    pub fn selector(&self) -> Selector {
        selector_of(&self.signature_hash())
    }

    /// Compute and store the signature hash. No-op for constructor,
    /// fallback and receive, and for items that are already prepared.
    pub fn prepare(&mut self) {
        if self.is_prepared() || self.name().is_none() {
            return;
        }
        let hash = hash_canonical(&self.signature());
        match self {
            AbiItem::Function(f) => f.hash = Some(hash),
            AbiItem::Event(e) => e.hash = Some(hash),
            AbiItem::Error(e) => e.hash = Some(hash),
            _ => {}
        }
    }

    /// Owned variant of [`AbiItem::prepare`].
    pub fn prepared(mut self) -> Self {
        self.prepare();
        self
    }

    /// Human-readable Solidity-like declaration.
    pub fn format(&self) -> String {
        format::format_item(self)
    }
}

impl fmt::Display for AbiItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<FunctionItem> for AbiItem {
    fn from(f: FunctionItem) -> Self {
        AbiItem::Function(f)
    }
}

impl From<EventItem> for AbiItem {
    fn from(e: EventItem) -> Self {
        AbiItem::Event(e)
    }
}

impl From<ErrorItem> for AbiItem {
    fn from(e: ErrorItem) -> Self {
        AbiItem::Error(e)
    }
}

impl From<ConstructorItem> for AbiItem {
    fn from(c: ConstructorItem) -> Self {
        AbiItem::Constructor(c)
    }
}

/// `name(type1,type2,...)` from a parameter list.
pub fn canonical_signature(name: &str, inputs: &[AbiParameter]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

// ─── Raw ABI JSON serde types ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(rename = "type", default = "default_item_type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inputs: Option<Vec<AbiParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<AbiParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_mutability: Option<StateMutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anonymous: Option<bool>,
    // Pre-0.4.16 compilers emit these instead of `stateMutability`.
    #[serde(default, skip_serializing)]
    constant: Option<bool>,
    #[serde(default, skip_serializing)]
    payable: Option<bool>,
}

fn default_item_type() -> String {
    "function".into()
}

impl RawItem {
    fn mutability(&self) -> StateMutability {
        match self.state_mutability {
            Some(m) => m,
            None if self.constant == Some(true) => StateMutability::View,
            None if self.payable == Some(true) => StateMutability::Payable,
            None => StateMutability::NonPayable,
        }
    }

    fn required_name(&mut self) -> Result<String, SignatureError> {
        match self.name.take() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(SignatureError::InvalidItem {
                reason: format!("{} item without a name", self.kind),
            }),
        }
    }
}

impl TryFrom<RawItem> for AbiItem {
    type Error = SignatureError;

    fn try_from(mut raw: RawItem) -> Result<Self, SignatureError> {
        let mutability = raw.mutability();
        let item = match raw.kind.as_str() {
            "function" => AbiItem::Function(FunctionItem::new(
                raw.required_name()?,
                raw.inputs.take().unwrap_or_default(),
                raw.outputs.take().unwrap_or_default(),
                mutability,
            )),
            "event" => AbiItem::Event(EventItem::new(
                raw.required_name()?,
                raw.inputs.take().unwrap_or_default(),
                raw.anonymous.unwrap_or(false),
            )),
            "error" => AbiItem::Error(ErrorItem::new(
                raw.required_name()?,
                raw.inputs.take().unwrap_or_default(),
            )),
            "constructor" => AbiItem::Constructor(ConstructorItem {
                inputs: raw.inputs.take().unwrap_or_default(),
                state_mutability: mutability,
            }),
            "fallback" => AbiItem::Fallback(FallbackItem {
                state_mutability: mutability,
            }),
            "receive" => AbiItem::Receive(ReceiveItem::default()),
            other => {
                return Err(SignatureError::InvalidItem {
                    reason: format!("unknown item type `{other}`"),
                })
            }
        };
        Ok(item)
    }
}

impl From<AbiItem> for RawItem {
    fn from(item: AbiItem) -> Self {
        let mut raw = RawItem {
            kind: item.kind().to_string(),
            name: None,
            inputs: None,
            outputs: None,
            state_mutability: None,
            anonymous: None,
            constant: None,
            payable: None,
        };
        match item {
            AbiItem::Function(f) => {
                raw.name = Some(f.name);
                raw.inputs = Some(f.inputs);
                raw.outputs = Some(f.outputs);
                raw.state_mutability = Some(f.state_mutability);
            }
            AbiItem::Event(e) => {
                raw.name = Some(e.name);
                raw.inputs = Some(e.inputs);
                raw.anonymous = Some(e.anonymous);
            }
            AbiItem::Error(e) => {
                raw.name = Some(e.name);
                raw.inputs = Some(e.inputs);
            }
            AbiItem::Constructor(c) => {
                raw.inputs = Some(c.inputs);
                raw.state_mutability = Some(c.state_mutability);
            }
            AbiItem::Fallback(f) => raw.state_mutability = Some(f.state_mutability),
            AbiItem::Receive(r) => raw.state_mutability = Some(r.state_mutability),
        }
        raw
    }
}
