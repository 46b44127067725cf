//! Overload resolution.
//!
//! Picks one item out of a pool sharing a name (or matching a raw selector /
//! topic hash), using example arguments to discriminate between overloads.
//! When more than one overload structurally accepts the arguments and their
//! types collide on the wire for those values, resolution fails with
//! [`ResolveError::Ambiguity`] instead of guessing.
//!
//! Resolution policy:
//! - a hex `name` matches functions/errors by 4-byte selector and events by
//!   32-byte topic hash; otherwise items are matched by name
//! - a pool of one is returned as is, whatever the arguments
//! - without arguments, the first zero-input item wins, else the first item
//! - with arguments, candidates need exactly `args.len()` inputs (zero-input
//!   items never match) and every argument must pass [`is_arg_of_type`]
//! - among several survivors the first declared wins, unless any pair of
//!   them is ambiguous
//! - when nothing survives, the first candidate is returned
//! - the other items sharing the chosen item's name come back as overloads,
//!   also when the lookup was by selector / topic hash

use chainabi_core::{
    bytes::{from_hex, is_address_shaped, is_hex},
    Abi, AbiItem, AbiParameter, AbiType, AbiValue, ItemKind, ResolveError,
};
use tracing::{debug, trace};

/// Options for [`resolve`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Example arguments used to pick between overloads.
    pub args: Option<&'a [AbiValue]>,
    /// Cache the signature hash on the returned item.
    pub prepare: bool,
    /// Only consider items of this kind.
    pub kind: Option<ItemKind>,
}

impl Default for ResolveOptions<'_> {
    fn default() -> Self {
        Self {
            args: None,
            prepare: true,
            kind: None,
        }
    }
}

impl<'a> ResolveOptions<'a> {
    pub fn with_args(args: &'a [AbiValue]) -> Self {
        Self {
            args: Some(args),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// The selected item plus the other candidates it was chosen from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub item: AbiItem,
    pub overloads: Vec<AbiItem>,
}

/// Resolve `name` (an item name or a `0x` selector / topic hash) in `abi`.
pub fn resolve(abi: &Abi, name: &str, options: ResolveOptions<'_>) -> Result<Resolved, ResolveError> {
    resolve_in(abi.items(), name, options)
}

/// Resolve `name` in an arbitrary pool of items.
pub fn resolve_in(
    items: &[AbiItem],
    name: &str,
    options: ResolveOptions<'_>,
) -> Result<Resolved, ResolveError> {
    let candidates: Vec<&AbiItem> = candidates(items, name)
        .into_iter()
        .filter(|item| options.kind.map_or(true, |k| item.kind() == k))
        .collect();
    if candidates.is_empty() {
        debug!(name, "no ABI item found");
        return Err(ResolveError::NotFound {
            name: name.to_string(),
            available: items
                .iter()
                .filter(|item| options.kind.map_or(true, |k| item.kind() == k))
                .map(AbiItem::format)
                .collect(),
        });
    }

    let chosen = select(&candidates, options.args)?;
    trace!(name, signature = %candidates[chosen].signature(), "resolved ABI item");

    let mut item = candidates[chosen].clone();
    if options.prepare {
        item.prepare();
    }
    let chosen = candidates[chosen];
    let overloads = items
        .iter()
        .filter(|other| !std::ptr::eq(*other, chosen))
        .filter(|other| options.kind.map_or(true, |k| other.kind() == k))
        .filter(|other| other.name().is_some() && other.name() == chosen.name())
        .cloned()
        .collect();
    Ok(Resolved { item, overloads })
}

fn candidates<'i>(items: &'i [AbiItem], name: &str) -> Vec<&'i AbiItem> {
    if is_hex(name) {
        let Ok(hash) = from_hex(name) else {
            return Vec::new();
        };
        return items
            .iter()
            .filter(|item| match item.kind() {
                ItemKind::Function | ItemKind::Error => {
                    hash.len() >= 4 && item.selector().as_slice() == &hash[..4]
                }
                ItemKind::Event => item.signature_hash().as_slice() == hash.as_slice(),
                _ => false,
            })
            .collect();
    }
    items.iter().filter(|item| item.name() == Some(name)).collect()
}

/// Index of the chosen candidate.
fn select(candidates: &[&AbiItem], args: Option<&[AbiValue]>) -> Result<usize, ResolveError> {
    if candidates.len() == 1 {
        return Ok(0);
    }

    let args = match args {
        Some(args) if !args.is_empty() => args,
        _ => {
            let zero_input = candidates.iter().position(|c| c.inputs().is_empty());
            if zero_input.is_none() {
                debug!(
                    candidates = candidates.len(),
                    "no zero-input overload, falling back to the first declared"
                );
            }
            return Ok(zero_input.unwrap_or(0));
        }
    };

    let survivors: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            let inputs = c.inputs();
            !inputs.is_empty()
                && inputs.len() == args.len()
                && args.iter().zip(inputs).all(|(arg, p)| is_arg_of_type(arg, &p.ty))
        })
        .map(|(i, _)| i)
        .collect();

    for (pos, &later) in survivors.iter().enumerate() {
        for &earlier in &survivors[..pos] {
            let (a, b) = (candidates[later], candidates[earlier]);
            if let Some((type_a, type_b)) = ambiguous_types(a.inputs(), b.inputs(), args) {
                debug!(
                    signature_a = %a.signature(),
                    signature_b = %b.signature(),
                    "ambiguous overloads"
                );
                return Err(ResolveError::Ambiguity {
                    type_a,
                    signature_a: a.format(),
                    type_b,
                    signature_b: b.format(),
                });
            }
        }
    }

    match survivors.first() {
        Some(&first) => Ok(first),
        None => {
            debug!(
                candidates = candidates.len(),
                "no overload accepts the arguments, falling back to the first declared"
            );
            Ok(0)
        }
    }
}

/// Whether `value` structurally fits `ty`.
///
/// This is a shape check, not an encode dry-run: integers are not
/// range-checked. Strings match `address` only when they look like an
/// address, and `bytesN` only when they hold exactly `N` bytes. Decimal
/// strings count as integers.
pub fn is_arg_of_type(value: &AbiValue, ty: &AbiType) -> bool {
    match ty {
        AbiType::Address => match value {
            AbiValue::Address(_) => true,
            AbiValue::String(s) => is_address_shaped(s),
            _ => false,
        },
        AbiType::Bool => matches!(value, AbiValue::Bool(_)),
        AbiType::Uint(_) => match value {
            AbiValue::Uint(_) | AbiValue::Int(_) => true,
            AbiValue::String(s) => is_decimal(s),
            _ => false,
        },
        AbiType::Int(_) => match value {
            AbiValue::Uint(_) | AbiValue::Int(_) => true,
            AbiValue::String(s) => is_decimal(s.strip_prefix('-').unwrap_or(s)),
            _ => false,
        },
        AbiType::String => matches!(value, AbiValue::String(_)),
        AbiType::Bytes => match value {
            AbiValue::String(s) => is_hex(s),
            AbiValue::Bytes(_) | AbiValue::FixedBytes(..) | AbiValue::Function(_) => true,
            _ => false,
        },
        AbiType::FixedBytes(size) => byte_len(value) == Some(*size),
        AbiType::Function => byte_len(value) == Some(24),
        AbiType::Array { element, len } => match value.as_slice() {
            Some(items) => {
                len.map_or(true, |n| n == items.len())
                    && items.iter().all(|item| is_arg_of_type(item, element))
            }
            None => false,
        },
        AbiType::Tuple(components) => match tuple_args(components, value) {
            Some(fields) => fields
                .iter()
                .zip(components)
                .all(|(field, c)| field.is_some_and(|v| is_arg_of_type(v, &c.ty))),
            None => false,
        },
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn byte_len(value: &AbiValue) -> Option<usize> {
    match value {
        AbiValue::String(s) if is_hex(s) => from_hex(s).ok().map(|b| b.len()),
        other => other.as_bytes().map(<[u8]>::len),
    }
}

/// Per-component argument values of a tuple argument: positional for
/// tuples/arrays, by name for structs (by position for anonymous
/// components). `None` when the shape is not tuple-like at all.
fn tuple_args<'v>(components: &[AbiParameter], value: &'v AbiValue) -> Option<Vec<Option<&'v AbiValue>>> {
    if let Some(items) = value.as_slice() {
        if items.len() != components.len() {
            return None;
        }
        return Some(items.iter().map(Some).collect());
    }
    let fields = value.as_struct()?;
    Some(
        components
            .iter()
            .enumerate()
            .map(|(i, c)| match c.name() {
                Some(name) => fields.get(name),
                None => fields.get_index(i).map(|(_, v)| v),
            })
            .collect(),
    )
}

/// When a collision applies.
#[derive(Debug, Clone, Copy)]
enum Collision {
    Always,
    /// Only when the argument looks like an address.
    AddressShaped,
}

/// Type pairs that accept the same runtime value but encode differently.
/// Patterns: `address`, `string`, `bytes`, `bytes20`, `bytesN` (any fixed).
const COLLISIONS: &[(&str, &str, Collision)] = &[
    ("address", "bytes20", Collision::Always),
    ("address", "string", Collision::AddressShaped),
    ("address", "bytes", Collision::AddressShaped),
    ("bytes", "bytesN", Collision::Always),
];

fn type_matches(pattern: &str, ty: &AbiType) -> bool {
    match pattern {
        "address" => *ty == AbiType::Address,
        "string" => *ty == AbiType::String,
        "bytes" => *ty == AbiType::Bytes,
        "bytes20" => *ty == AbiType::FixedBytes(20),
        "bytesN" => matches!(ty, AbiType::FixedBytes(_)),
        _ => false,
    }
}

fn collides(a: &AbiType, b: &AbiType, arg: Option<&AbiValue>) -> bool {
    COLLISIONS.iter().any(|(x, y, when)| {
        let pair = (type_matches(x, a) && type_matches(y, b)) || (type_matches(y, a) && type_matches(x, b));
        pair && match when {
            Collision::Always => true,
            Collision::AddressShaped => match arg {
                Some(AbiValue::Address(_)) => true,
                Some(AbiValue::String(s)) => is_address_shaped(s),
                _ => false,
            },
        }
    })
}

/// First position (recursing into tuples and arrays) where `a` and `b` collide for the
/// given arguments, as canonical type strings `(type in a, type in b)`.
fn ambiguous_types(
    a: &[AbiParameter],
    b: &[AbiParameter],
    args: &[AbiValue],
) -> Option<(String, String)> {
    let args: Vec<Option<&AbiValue>> = args.iter().map(Some).collect();
    ambiguous_in(a, b, &args)
}

fn ambiguous_in(
    a: &[AbiParameter],
    b: &[AbiParameter],
    args: &[Option<&AbiValue>],
) -> Option<(String, String)> {
    a.iter()
        .zip(b)
        .enumerate()
        .find_map(|(i, (pa, pb))| ambiguous_at(&pa.ty, &pb.ty, args.get(i).copied().flatten()))
}

fn ambiguous_at(a: &AbiType, b: &AbiType, arg: Option<&AbiValue>) -> Option<(String, String)> {
    match (a, b) {
        (AbiType::Tuple(ca), AbiType::Tuple(cb)) => {
            let nested = arg
                .and_then(|v| tuple_args(ca, v))
                .unwrap_or_else(|| vec![None; ca.len()]);
            ambiguous_in(ca, cb, &nested)
        }
        (
            AbiType::Array { element: ea, len: la },
            AbiType::Array { element: eb, len: lb },
        ) if la == lb => match arg.and_then(AbiValue::as_slice) {
            Some(items) if !items.is_empty() => items
                .iter()
                .find_map(|item| ambiguous_at(ea, eb, Some(item))),
            _ => ambiguous_at(ea, eb, None),
        },
        _ if collides(a, b, arg) => Some((a.to_string(), b.to_string())),
        _ => None,
    }
}
