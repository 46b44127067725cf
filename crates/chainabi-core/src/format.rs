//! Render items and parameters back to human-readable declarations.

use crate::item::{AbiItem, StateMutability};
use crate::types::{AbiParameter, AbiType};

/// `function name(type a, ...) view returns (...)`, `event ...`, etc.
pub fn format_item(item: &AbiItem) -> String {
    match item {
        AbiItem::Function(f) => {
            let mut out = format!("function {}({})", f.name, format_parameters(&f.inputs));
            if f.state_mutability != StateMutability::NonPayable {
                out.push(' ');
                out.push_str(f.state_mutability.as_str());
            }
            if !f.outputs.is_empty() {
                out.push_str(&format!(" returns ({})", format_parameters(&f.outputs)));
            }
            out
        }
        AbiItem::Event(e) => {
            let mut out = format!("event {}({})", e.name, format_parameters(&e.inputs));
            if e.anonymous {
                out.push_str(" anonymous");
            }
            out
        }
        AbiItem::Error(e) => format!("error {}({})", e.name, format_parameters(&e.inputs)),
        AbiItem::Constructor(c) => {
            let mut out = format!("constructor({})", format_parameters(&c.inputs));
            if c.state_mutability == StateMutability::Payable {
                out.push_str(" payable");
            }
            out
        }
        AbiItem::Fallback(f) => {
            if f.state_mutability == StateMutability::Payable {
                "fallback() external payable".into()
            } else {
                "fallback() external".into()
            }
        }
        AbiItem::Receive(_) => "receive() external payable".into(),
    }
}

/// Comma-separated parameter list without the surrounding parentheses.
pub fn format_parameters(params: &[AbiParameter]) -> String {
    params
        .iter()
        .map(format_parameter)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `type [indexed] [name]`, with tuple components spelled out inline.
pub fn format_parameter(param: &AbiParameter) -> String {
    let mut out = format_type(&param.ty);
    if param.indexed {
        out.push_str(" indexed");
    }
    if let Some(name) = param.name() {
        out.push(' ');
        out.push_str(name);
    }
    out
}

fn format_type(ty: &AbiType) -> String {
    let (base, suffix) = ty.split_array_suffix();
    match base {
        AbiType::Tuple(components) => format!("({}){suffix}", format_parameters(components)),
        other => format!("{other}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ConstructorItem, EventItem, FallbackItem, FunctionItem, ReceiveItem};

    #[test]
    fn function_with_tuple_and_returns() {
        let inputs = vec![
            AbiParameter::named("a", AbiType::Uint(256)),
            AbiParameter::named(
                "b",
                AbiType::array(AbiType::Tuple(vec![
                    AbiParameter::named("x", AbiType::Bool),
                    AbiParameter::new(AbiType::Address),
                ])),
            ),
        ];
        let item = AbiItem::Function(FunctionItem::new(
            "foo",
            inputs,
            vec![AbiParameter::new(AbiType::Uint(256))],
            StateMutability::View,
        ));
        assert_eq!(
            format_item(&item),
            "function foo(uint256 a, (bool x, address)[] b) view returns (uint256)"
        );
    }

    #[test]
    fn event_indexed_and_anonymous() {
        let item = AbiItem::Event(EventItem::new(
            "Transfer",
            vec![
                AbiParameter::named("from", AbiType::Address).indexed(),
                AbiParameter::named("value", AbiType::Uint(256)),
            ],
            true,
        ));
        assert_eq!(
            item.format(),
            "event Transfer(address indexed from, uint256 value) anonymous"
        );
    }

    #[test]
    fn special_items() {
        let ctor = AbiItem::Constructor(ConstructorItem {
            inputs: vec![AbiParameter::named("owner", AbiType::Address)],
            state_mutability: StateMutability::Payable,
        });
        assert_eq!(ctor.format(), "constructor(address owner) payable");
        assert_eq!(
            AbiItem::Fallback(FallbackItem::default()).format(),
            "fallback() external"
        );
        assert_eq!(
            AbiItem::Receive(ReceiveItem::default()).format(),
            "receive() external payable"
        );
    }
}
