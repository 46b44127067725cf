//! Human-readable ABI parsing.
//!
//! Accepts Solidity-like declarations:
//!
//! ```text
//! struct Order { address maker; uint256[2] amounts; }
//! function fill(Order calldata order, bytes sig) external payable returns (bool)
//! event Filled(address indexed maker, Order order) anonymous
//! error Expired(uint256 deadline)
//! constructor(address owner) payable
//! fallback() external
//! receive() external payable
//! ```
//!
//! `struct` lines define aliases for the other lines; they may reference each
//! other in any order but not form cycles.

use std::collections::{HashMap, HashSet};

use crate::error::SignatureError;
use crate::item::{
    AbiItem, ConstructorItem, ErrorItem, EventItem, FallbackItem, FunctionItem, ReceiveItem,
    StateMutability,
};
use crate::signature::{matching_paren, split_top_level};
use crate::types::{apply_array_suffix, AbiParameter, AbiType};

const DATA_LOCATIONS: &[&str] = &["memory", "calldata", "storage"];
const VISIBILITY: &[&str] = &["external", "public", "internal", "private", "virtual", "override"];

/// Parse a single declaration. Struct references are not available; use
/// [`parse_abi_items`] for that.
pub fn parse_abi_item(text: &str) -> Result<AbiItem, SignatureError> {
    Parser::default().item(text)
}

/// Parse a list of declarations, resolving `struct` definitions among them.
/// Struct lines do not produce items.
pub fn parse_abi_items<S: AsRef<str>>(lines: &[S]) -> Result<Vec<AbiItem>, SignatureError> {
    let mut parser = Parser::default();
    let mut declarations = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if let Some(body) = strip_keyword(line, "struct") {
            let (name, members) = parse_struct_definition(line, body)?;
            parser.raw_structs.insert(name, members);
        } else {
            declarations.push(line);
        }
    }

    let names: Vec<String> = parser.raw_structs.keys().cloned().collect();
    for name in names {
        parser.resolve_struct(&name)?;
    }

    declarations.into_iter().map(|d| parser.item(d)).collect()
}

/// `struct Name { type a; type b; }` → (`Name`, [`type a`, `type b`]).
fn parse_struct_definition(line: &str, body: &str) -> Result<(String, Vec<String>), SignatureError> {
    let invalid = |reason: &str| SignatureError::InvalidItem {
        reason: format!("{reason} in `{line}`"),
    };
    let open = body.find('{').ok_or_else(|| invalid("missing `{`"))?;
    let close = body.rfind('}').ok_or_else(|| invalid("missing `}`"))?;
    if close < open || !body[close + 1..].trim().is_empty() {
        return Err(invalid("malformed struct body"));
    }
    let name = body[..open].trim();
    if !is_identifier(name) {
        return Err(invalid("invalid struct name"));
    }
    let members: Vec<String> = body[open + 1..close]
        .split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect();
    if members.is_empty() {
        return Err(invalid("empty struct"));
    }
    Ok((name.to_string(), members))
}

#[derive(Default)]
struct Parser {
    raw_structs: HashMap<String, Vec<String>>,
    structs: HashMap<String, Vec<AbiParameter>>,
    resolving: HashSet<String>,
}

impl Parser {
    fn resolve_struct(&mut self, name: &str) -> Result<Vec<AbiParameter>, SignatureError> {
        if let Some(components) = self.structs.get(name) {
            return Ok(components.clone());
        }
        let members = self
            .raw_structs
            .get(name)
            .cloned()
            .ok_or_else(|| SignatureError::UnknownStruct { name: name.into() })?;
        if !self.resolving.insert(name.to_string()) {
            return Err(SignatureError::CircularStruct { name: name.into() });
        }
        let components = members
            .iter()
            .map(|m| self.parameter(m, false))
            .collect::<Result<Vec<_>, _>>()?;
        self.resolving.remove(name);
        self.structs.insert(name.to_string(), components.clone());
        Ok(components)
    }

    fn item(&mut self, text: &str) -> Result<AbiItem, SignatureError> {
        let text = text.trim();
        if let Some(rest) = strip_keyword(text, "function") {
            return self.function(rest);
        }
        if let Some(rest) = strip_keyword(text, "event") {
            return self.event(rest);
        }
        if let Some(rest) = strip_keyword(text, "error") {
            let (name, inputs, tail) = self.named_parameter_list(rest, false)?;
            if !tail.is_empty() {
                return Err(unexpected(tail, text));
            }
            return Ok(AbiItem::Error(ErrorItem::new(name, inputs)));
        }
        if opens_with(text, "constructor") {
            return self.constructor(text);
        }
        if opens_with(text, "fallback") {
            return fallback(text);
        }
        if opens_with(text, "receive") {
            return receive(text);
        }
        // Bare `name(...)` is treated as a function.
        self.function(text)
    }

    fn function(&mut self, rest: &str) -> Result<AbiItem, SignatureError> {
        let (name, inputs, tail) = self.named_parameter_list(rest, false)?;

        let (modifiers, outputs) = match find_word(tail, "returns") {
            Some(idx) => {
                let returns = tail[idx + "returns".len()..].trim();
                let (outputs, after) = self.parenthesized(returns, false)?;
                if !after.is_empty() {
                    return Err(unexpected(after, rest));
                }
                (&tail[..idx], outputs)
            }
            None => (tail, Vec::new()),
        };

        let mut mutability = StateMutability::NonPayable;
        for word in modifiers.split_whitespace() {
            if let Some(m) = StateMutability::from_keyword(word) {
                mutability = m;
            } else if !VISIBILITY.contains(&word) {
                return Err(unexpected(word, rest));
            }
        }

        Ok(AbiItem::Function(FunctionItem::new(
            name, inputs, outputs, mutability,
        )))
    }

    fn event(&mut self, rest: &str) -> Result<AbiItem, SignatureError> {
        let (name, inputs, tail) = self.named_parameter_list(rest, true)?;
        let anonymous = match tail {
            "" => false,
            "anonymous" => true,
            other => return Err(unexpected(other, rest)),
        };
        Ok(AbiItem::Event(EventItem::new(name, inputs, anonymous)))
    }

    fn constructor(&mut self, text: &str) -> Result<AbiItem, SignatureError> {
        let (name, inputs, tail) = self.named_parameter_list(text, false)?;
        if name != "constructor" {
            return Err(unexpected(&name, text));
        }
        let mut state_mutability = StateMutability::NonPayable;
        for word in tail.split_whitespace() {
            match word {
                "payable" => state_mutability = StateMutability::Payable,
                "public" | "internal" => {}
                other => return Err(unexpected(other, text)),
            }
        }
        Ok(AbiItem::Constructor(ConstructorItem {
            inputs,
            state_mutability,
        }))
    }

    /// `Name(params) tail` → (name, params, trimmed tail).
    fn named_parameter_list<'t>(
        &mut self,
        text: &'t str,
        allow_indexed: bool,
    ) -> Result<(String, Vec<AbiParameter>, &'t str), SignatureError> {
        let text = text.trim();
        let open = text.find('(').ok_or_else(|| SignatureError::InvalidSignature {
            text: text.to_string(),
        })?;
        let name = text[..open].trim();
        if !is_identifier(name) {
            return Err(SignatureError::InvalidSignature {
                text: text.to_string(),
            });
        }
        let (params, tail) = self.parenthesized(&text[open..], allow_indexed)?;
        Ok((name.to_string(), params, tail))
    }

    /// `(params) tail` → (params, trimmed tail).
    fn parenthesized<'t>(
        &mut self,
        text: &'t str,
        allow_indexed: bool,
    ) -> Result<(Vec<AbiParameter>, &'t str), SignatureError> {
        let invalid = || SignatureError::InvalidSignature {
            text: text.to_string(),
        };
        if !text.starts_with('(') {
            return Err(invalid());
        }
        let close = matching_paren(text, 0).ok_or_else(invalid)?;
        let params = self.parameter_list(&text[1..close], allow_indexed)?;
        Ok((params, text[close + 1..].trim()))
    }

    fn parameter_list(
        &mut self,
        inner: &str,
        allow_indexed: bool,
    ) -> Result<Vec<AbiParameter>, SignatureError> {
        if inner.trim().is_empty() {
            return Ok(Vec::new());
        }
        split_top_level(inner)?
            .into_iter()
            .map(|part| self.parameter(part, allow_indexed))
            .collect()
    }

    /// `type [modifiers] [name]`.
    fn parameter(&mut self, text: &str, allow_indexed: bool) -> Result<AbiParameter, SignatureError> {
        let text = text.trim();
        let invalid = |reason: &str| SignatureError::InvalidParameter {
            param: text.to_string(),
            reason: reason.to_string(),
        };
        if text.is_empty() {
            return Err(invalid("empty parameter"));
        }

        let tuple_start = text.strip_prefix("tuple").unwrap_or(text);
        let (ty, internal_type, rest) = if tuple_start.starts_with('(') {
            let close = matching_paren(tuple_start, 0).ok_or_else(|| invalid("unbalanced parentheses"))?;
            let components = self.parameter_list(&tuple_start[1..close], false)?;
            let after = &tuple_start[close + 1..];
            let suffix_end = after.find(char::is_whitespace).unwrap_or(after.len());
            let ty = apply_array_suffix(AbiType::Tuple(components), &after[..suffix_end])?;
            (ty, None, &after[suffix_end..])
        } else {
            let token_end = text.find(char::is_whitespace).unwrap_or(text.len());
            let token = &text[..token_end];
            let split = token.find('[').unwrap_or(token.len());
            let (base, suffix) = token.split_at(split);
            let (base_ty, internal_type) = self.base_type(base)?;
            let ty = apply_array_suffix(base_ty, suffix)?;
            let internal_type = internal_type.map(|t| format!("{t}{suffix}"));
            (ty, internal_type, &text[token_end..])
        };

        let mut param = AbiParameter::new(ty);
        param.internal_type = internal_type;
        let mut name = None;
        for word in rest.split_whitespace() {
            match word {
                "indexed" if allow_indexed => param.indexed = true,
                "indexed" => return Err(invalid("`indexed` is only allowed on event inputs")),
                "payable" if param.ty == AbiType::Address && name.is_none() => {}
                w if DATA_LOCATIONS.contains(&w) && name.is_none() => {}
                w if name.is_none() && is_identifier(w) => name = Some(w.to_string()),
                _ => return Err(invalid("unexpected token")),
            }
        }
        param.name = name;
        Ok(param)
    }

    /// Elementary type or struct alias, plus the struct's internal type name.
    fn base_type(&mut self, base: &str) -> Result<(AbiType, Option<String>), SignatureError> {
        if self.raw_structs.contains_key(base) {
            let components = self.resolve_struct(base)?;
            return Ok((AbiType::Tuple(components), Some(format!("struct {base}"))));
        }
        match AbiType::elementary(base) {
            Ok(ty) => Ok((ty, None)),
            Err(e) => {
                let elementary_prefix = ["uint", "int", "bytes"].iter().any(|p| base.starts_with(p));
                if is_identifier(base) && !elementary_prefix {
                    Err(SignatureError::UnknownStruct { name: base.into() })
                } else {
                    Err(e)
                }
            }
        }
    }
}

fn fallback(text: &str) -> Result<AbiItem, SignatureError> {
    let rest = text
        .strip_prefix("fallback")
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix("()"))
        .ok_or_else(|| SignatureError::InvalidSignature { text: text.into() })?;
    let mut state_mutability = StateMutability::NonPayable;
    for word in rest.split_whitespace() {
        match word {
            "external" => {}
            "payable" => state_mutability = StateMutability::Payable,
            other => return Err(unexpected(other, text)),
        }
    }
    Ok(AbiItem::Fallback(FallbackItem { state_mutability }))
}

fn receive(text: &str) -> Result<AbiItem, SignatureError> {
    let rest = text
        .strip_prefix("receive")
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix("()"))
        .ok_or_else(|| SignatureError::InvalidSignature { text: text.into() })?;
    for word in rest.split_whitespace() {
        if !matches!(word, "external" | "payable") {
            return Err(unexpected(word, text));
        }
    }
    Ok(AbiItem::Receive(ReceiveItem::default()))
}

/// `text` with a leading `keyword` and whitespace removed, if present.
fn strip_keyword<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Whether `text` is `keyword` directly followed by its parameter list.
fn opens_with(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword)
        .is_some_and(|rest| rest.trim_start().starts_with('('))
}

/// Byte index of `word` as a whole whitespace/paren-delimited word.
fn find_word(text: &str, word: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = text[from..].find(word) {
        let idx = from + pos;
        let before_ok = idx == 0 || text[..idx].ends_with(char::is_whitespace);
        let after = &text[idx + word.len()..];
        let after_ok = after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '(');
        if before_ok && after_ok {
            return Some(idx);
        }
        from = idx + word.len();
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn unexpected(token: &str, text: &str) -> SignatureError {
    SignatureError::InvalidItem {
        reason: format!("unexpected `{token}` in `{text}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    #[test]
    fn function_with_modifiers_and_returns() {
        let item = parse_abi_item(
            "function foo(uint a, (bool x, address y)[] memory b) external view returns (uint256, string memory)",
        )
        .unwrap();
        assert_eq!(item.signature(), "foo(uint256,(bool,address)[])");
        assert_eq!(item.state_mutability(), Some(StateMutability::View));
        assert_eq!(item.outputs().len(), 2);
        assert_eq!(item.inputs()[1].name(), Some("b"));
        assert_eq!(item.inputs()[1].components().unwrap()[0].name(), Some("x"));
    }

    #[test]
    fn bare_signature_is_a_function() {
        let item = parse_abi_item("transfer(address,uint256)").unwrap();
        assert_eq!(item.kind(), ItemKind::Function);
        assert_eq!(item.signature(), "transfer(address,uint256)");
        assert!(item.inputs()[0].name().is_none());
    }

    #[test]
    fn event_indexed_anonymous() {
        let item =
            parse_abi_item("event Transfer(address indexed from, address indexed to, uint256 value) anonymous")
                .unwrap();
        match &item {
            AbiItem::Event(e) => {
                assert!(e.anonymous);
                assert!(e.inputs[0].indexed && e.inputs[1].indexed && !e.inputs[2].indexed);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn indexed_rejected_outside_events() {
        assert!(parse_abi_item("function f(address indexed a)").is_err());
    }

    #[test]
    fn special_items() {
        let c = parse_abi_item("constructor(address payable owner) payable").unwrap();
        assert_eq!(c.kind(), ItemKind::Constructor);
        assert_eq!(c.inputs()[0].ty, AbiType::Address);
        assert_eq!(c.state_mutability(), Some(StateMutability::Payable));

        let f = parse_abi_item("fallback() external payable").unwrap();
        assert_eq!(f.state_mutability(), Some(StateMutability::Payable));
        let r = parse_abi_item("receive() external payable").unwrap();
        assert_eq!(r.kind(), ItemKind::Receive);
        let e = parse_abi_item("error Expired(uint256 deadline)").unwrap();
        assert_eq!(e.kind(), ItemKind::Error);
        let g = parse_abi_item("function receiveTokens(uint256 amount)").unwrap();
        assert_eq!(g.signature(), "receiveTokens(uint256)");
        let h = parse_abi_item("fallbackAmount() view returns (uint256)").unwrap();
        assert_eq!(h.kind(), ItemKind::Function);
    }

    #[test]
    fn structs_nest_and_resolve_out_of_order() {
        let items = parse_abi_items(&[
            "function fill(Order calldata order, Leg[2] legs) returns (bool)",
            "struct Order { address maker; Leg leg; }",
            "struct Leg { uint256 amount; bytes data; }",
        ])
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].signature(),
            "fill((address,(uint256,bytes)),(uint256,bytes)[2])"
        );
        let order = &items[0].inputs()[0];
        assert_eq!(order.internal_type.as_deref(), Some("struct Order"));
        assert_eq!(items[0].inputs()[1].internal_type.as_deref(), Some("struct Leg[2]"));
    }

    #[test]
    fn unknown_and_circular_structs() {
        assert!(matches!(
            parse_abi_items(&["function f(Missing m)"]),
            Err(SignatureError::UnknownStruct { .. })
        ));
        assert!(matches!(
            parse_abi_items(&["struct A { B b; }", "struct B { A a; }", "function f(A a)"]),
            Err(SignatureError::CircularStruct { .. })
        ));
        assert!(matches!(
            parse_abi_item("function f(uint7 x)"),
            Err(SignatureError::UnknownType { .. })
        ));
    }

    #[test]
    fn format_parse_roundtrip() {
        let text = "function swap((address token, uint256 amount)[] legs, bytes data) payable returns (int256 delta)";
        let item = parse_abi_item(text).unwrap();
        assert_eq!(item.format(), text);
        assert_eq!(parse_abi_item(&item.format()).unwrap(), item);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_abi_item("function (uint256)").is_err());
        assert!(parse_abi_item("function f(uint256").is_err());
        assert!(parse_abi_item("function f(uint256,,bool)").is_err());
        assert!(parse_abi_item("event E(uint256) stuff").is_err());
        assert!(parse_abi_item("function f() returns").is_err());
    }
}
