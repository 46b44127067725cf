//! Signature normalization.
//!
//! Turns a human-readable declaration such as
//! `function foo(uint a, (bool x, address y) b) view returns (uint)` into the
//! canonical signature `foo(uint256,(bool,address))` that selectors and topic
//! hashes are computed from.
//!
//! The input language is tiny (identifiers, commas, parentheses, brackets and
//! a few keywords), so this is a single left-to-right scan with an explicit
//! parenthesis-depth counter rather than a grammar.

use crate::error::SignatureError;

/// Keywords that may precede the item name at depth 0.
const ITEM_KEYWORDS: &[&str] = &["function", "event", "error", ""];

/// Normalize a human-readable signature into its canonical form.
///
/// Strips the leading keyword, parameter names, `indexed`, data-location
/// keywords, irregular whitespace and anything after the closing parenthesis
/// of the parameter list (`returns (...)`, mutability). `uint`/`int` aliases
/// are expanded to `uint256`/`int256`.
///
/// The result is idempotent: normalizing a canonical signature returns it
/// unchanged.
pub fn normalize_signature(signature: &str) -> Result<String, SignatureError> {
    let invalid = || SignatureError::InvalidSignature {
        text: signature.to_string(),
    };

    let chars: Vec<char> = signature.chars().collect();
    let mut active = true;
    let mut level: i32 = 0;
    let mut current = String::new();
    let mut result = String::new();
    let mut valid = false;

    for (i, &c) in chars.iter().enumerate() {
        let c = if c.is_whitespace() { ' ' } else { c };

        // Separators re-enable output after a skipped parameter name.
        if matches!(c, '(' | ')' | ',') {
            active = true;
        }
        if c == '(' {
            level += 1;
        }
        if c == ')' {
            level -= 1;
            if level < 0 {
                return Err(invalid());
            }
        }

        if !active {
            continue;
        }

        if level == 0 {
            if c == ' ' {
                if ITEM_KEYWORDS.contains(&result.as_str()) {
                    result.clear();
                }
                continue;
            }
            result.push(c);
            if c == ')' {
                valid = true;
                break;
            }
            continue;
        }

        if c == ' ' {
            // A space after a type token starts the modifier/name section,
            // which is dropped until the next separator.
            let prev = if i > 0 { chars[i - 1] } else { ' ' };
            if prev != ',' && prev != '(' && !prev.is_whitespace() && current != "," && current != ",(" {
                current.clear();
                active = false;
            }
            continue;
        }

        result.push(c);
        current.push(c);
    }

    if !valid || !result.contains('(') || result.starts_with('(') {
        return Err(invalid());
    }

    Ok(expand_aliases(&result))
}

/// Rewrite `uint`/`int`/`byte` aliases in every type token (but not the item
/// name) to their canonical spelling.
fn expand_aliases(signature: &str) -> String {
    let mut out = String::with_capacity(signature.len() + 8);
    let mut token = String::new();
    let mut seen_name = false;

    fn flush(token: &mut String, out: &mut String, seen_name: &mut bool) {
        if !*seen_name {
            out.push_str(token);
            *seen_name = true;
        } else {
            out.push_str(&canonical_token(token));
        }
        token.clear();
    }

    for c in signature.chars() {
        if matches!(c, '(' | ')' | ',') {
            flush(&mut token, &mut out, &mut seen_name);
            out.push(c);
        } else {
            token.push(c);
        }
    }
    flush(&mut token, &mut out, &mut seen_name);
    out
}

fn canonical_token(token: &str) -> String {
    let split = token.find('[').unwrap_or(token.len());
    let (base, suffix) = token.split_at(split);
    let base = match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        other => other,
    };
    format!("{base}{suffix}")
}

/// Split `text` on commas at parenthesis depth 0.
///
/// Fails with `InvalidSignature` when the parentheses are unbalanced.
pub fn split_top_level(text: &str) -> Result<Vec<&str>, SignatureError> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(SignatureError::InvalidSignature { text: text.into() });
                }
            }
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SignatureError::InvalidSignature { text: text.into() });
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Index of the parenthesis closing the one opened at `open`.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}
