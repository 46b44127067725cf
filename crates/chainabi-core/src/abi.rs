//! A full contract ABI: an ordered list of items with a by-name index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SignatureError;
use crate::human::parse_abi_items;
use crate::item::{AbiItem, ConstructorItem, ItemKind};

/// Options applied when building an [`Abi`] from JSON or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compute and cache selector / topic hashes up front.
    pub prepare: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { prepare: true }
    }
}

/// An ordered contract ABI.
///
/// Declaration order is preserved; it decides ties between equally valid
/// overloads during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AbiItem>", into = "Vec<AbiItem>")]
pub struct Abi {
    items: Vec<AbiItem>,
    by_name: HashMap<String, Vec<usize>>,
}

impl Abi {
    pub fn new(items: Vec<AbiItem>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            if let Some(name) = item.name() {
                by_name.entry(name.to_string()).or_default().push(i);
            }
        }
        Self { items, by_name }
    }

    /// Parse a Solidity ABI JSON array, preparing hashes.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        Self::from_json_with(json, ParseOptions::default())
    }

    pub fn from_json_with(json: &str, options: ParseOptions) -> Result<Self, SignatureError> {
        let items: Vec<AbiItem> = serde_json::from_str(json)?;
        Ok(Self::new(items).with_options(options))
    }

    /// Parse human-readable declarations (with `struct` definitions),
    /// preparing hashes.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, SignatureError> {
        Self::parse_with(lines, ParseOptions::default())
    }

    pub fn parse_with<S: AsRef<str>>(lines: &[S], options: ParseOptions) -> Result<Self, SignatureError> {
        Ok(Self::new(parse_abi_items(lines)?).with_options(options))
    }

    fn with_options(mut self, options: ParseOptions) -> Self {
        if options.prepare {
            self.prepare();
        }
        self
    }

    /// Compute and cache the hash of every function, event and error.
    pub fn prepare(&mut self) {
        for item in &mut self.items {
            item.prepare();
        }
    }

    pub fn to_json(&self) -> Result<String, SignatureError> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }

    pub fn items(&self) -> &[AbiItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AbiItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item named `name`, of any kind, in declaration order.
    pub fn overloads(&self, name: &str) -> Vec<&AbiItem> {
        self.by_name
            .get(name)
            .map(|idx| idx.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Items of `kind` named `name`, in declaration order.
    pub fn overloads_of(&self, kind: ItemKind, name: &str) -> Vec<&AbiItem> {
        self.overloads(name)
            .into_iter()
            .filter(|item| item.kind() == kind)
            .collect()
    }

    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &AbiItem> {
        self.items.iter().filter(move |item| item.kind() == kind)
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiItem> {
        self.of_kind(ItemKind::Function)
    }

    pub fn events(&self) -> impl Iterator<Item = &AbiItem> {
        self.of_kind(ItemKind::Event)
    }

    pub fn errors(&self) -> impl Iterator<Item = &AbiItem> {
        self.of_kind(ItemKind::Error)
    }

    pub fn constructor(&self) -> Option<&ConstructorItem> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Constructor(c) => Some(c),
            _ => None,
        })
    }

    pub fn has_fallback(&self) -> bool {
        self.of_kind(ItemKind::Fallback).next().is_some()
    }

    pub fn has_receive(&self) -> bool {
        self.of_kind(ItemKind::Receive).next().is_some()
    }

    /// Human-readable rendering of every item.
    pub fn format(&self) -> Vec<String> {
        self.items.iter().map(AbiItem::format).collect()
    }
}

impl From<Vec<AbiItem>> for Abi {
    fn from(items: Vec<AbiItem>) -> Self {
        Self::new(items)
    }
}

impl From<Abi> for Vec<AbiItem> {
    fn from(abi: Abi) -> Self {
        abi.items
    }
}

impl FromIterator<AbiItem> for Abi {
    fn from_iter<I: IntoIterator<Item = AbiItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Abi {
    type Item = &'a AbiItem;
    type IntoIter = std::slice::Iter<'a, AbiItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
