//! Human-readable ABI fragments
//!
//! One declaration per line, Solidity style:
//!
//! ```text
//! function balanceOf(address owner) view returns (uint256)
//! function fill((address maker, uint128[] amounts)[] orders) payable
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! error InsufficientBalance(uint256 needed)
//! constructor(string name) payable
//! ```

use crate::function::{ErrorDef, Event, EventParam, Function, StateMutability};
use crate::interface::{Abi, AbiEntry};
use crate::param_type::{apply_array_suffix, split_top_level, Param, ParamType};
use crate::AbiError;

impl Abi {
    /// Build an ABI from human-readable declarations
    pub fn parse_human(lines: &[&str]) -> Result<Self, AbiError> {
        let entries = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Abi::new(entries)
    }
}

/// Parse one declaration
pub fn parse_entry(line: &str) -> Result<AbiEntry, AbiError> {
    let line = line.trim().trim_end_matches(';');
    let invalid = || AbiError::InvalidSignature(line.to_string());

    let (keyword, rest) = match line.find(|c: char| c == '(' || c.is_whitespace()) {
        Some(i) => (&line[..i], line[i..].trim_start()),
        None => return Err(invalid()),
    };

    let (name, rest) = match keyword {
        "function" | "event" | "error" => {
            let open = rest.find('(').ok_or_else(invalid)?;
            let name = rest[..open].trim();
            if name.is_empty() || !is_identifier(name) {
                return Err(invalid());
            }
            (name, &rest[open..])
        }
        "constructor" | "fallback" | "receive" => ("", rest),
        _ => return Err(invalid()),
    };

    let close = matching_paren(rest, 0).ok_or_else(invalid)?;
    let params = parse_params(&rest[1..close])?;
    let tail = rest[close + 1..].trim();

    let (modifiers, returns) = match find_word(tail, "returns") {
        Some(i) => (&tail[..i], Some(tail[i + "returns".len()..].trim())),
        None => (tail, None),
    };
    let words: Vec<&str> = modifiers.split_whitespace().collect();
    let state_mutability = words
        .iter()
        .rev()
        .find_map(|w| match *w {
            "constant" => Some(StateMutability::View),
            other => StateMutability::from_keyword(other),
        })
        .unwrap_or(StateMutability::NonPayable);

    match keyword {
        "function" => {
            let outputs = match returns {
                Some(r) => {
                    let end = r
                        .strip_prefix('(')
                        .and_then(|_| matching_paren(r, 0))
                        .ok_or_else(invalid)?;
                    if !r[end + 1..].trim().is_empty() {
                        return Err(invalid());
                    }
                    parse_params(&r[1..end])?
                        .into_iter()
                        .map(|(p, _)| p)
                        .collect()
                }
                None => Vec::new(),
            };
            Ok(AbiEntry::Function(Function::new(
                name,
                plain(params),
                outputs,
                state_mutability,
            )))
        }
        "event" => Ok(AbiEntry::Event(Event {
            name: name.to_string(),
            inputs: params
                .into_iter()
                .map(|(param, indexed)| EventParam { param, indexed })
                .collect(),
            anonymous: words.contains(&"anonymous"),
        })),
        "error" => Ok(AbiEntry::Error(ErrorDef {
            name: name.to_string(),
            inputs: plain(params),
        })),
        "constructor" => Ok(AbiEntry::Constructor {
            inputs: plain(params),
            state_mutability,
        }),
        "fallback" => Ok(AbiEntry::Fallback { state_mutability }),
        _ => Ok(AbiEntry::Receive),
    }
}

fn plain(params: Vec<(Param, bool)>) -> Vec<Param> {
    params.into_iter().map(|(p, _)| p).collect()
}

/// Parse a comma-separated parameter list, returning each param and its `indexed` flag
fn parse_params(s: &str) -> Result<Vec<(Param, bool)>, AbiError> {
    split_top_level(s)?.into_iter().map(parse_param).collect()
}

/// `type [indexed|memory|calldata|storage|payable] [name]`
fn parse_param(s: &str) -> Result<(Param, bool), AbiError> {
    let s = s.trim();
    let (kind, rest) = parse_type_prefix(s)?;

    let mut indexed = false;
    let mut name = String::new();
    for word in rest.split_whitespace() {
        match word {
            "indexed" => indexed = true,
            "memory" | "calldata" | "storage" | "payable" => {}
            w if name.is_empty() && is_identifier(w) => name = w.to_string(),
            _ => return Err(AbiError::InvalidSignature(s.to_string())),
        }
    }
    Ok((Param::new(name, kind), indexed))
}

/// Split the leading type expression off a parameter declaration
fn parse_type_prefix(s: &str) -> Result<(ParamType, &str), AbiError> {
    let tuple_body = if s.starts_with('(') {
        Some(0)
    } else if s.starts_with("tuple(") {
        Some("tuple".len())
    } else {
        None
    };

    match tuple_body {
        Some(open) => {
            let close = matching_paren(s, open)
                .ok_or_else(|| AbiError::InvalidType(s.to_string()))?;
            let components = plain(parse_params(&s[open + 1..close])?);
            let after = &s[close + 1..];
            let suffix_len = array_suffix_len(after);
            let kind = apply_array_suffix(ParamType::Tuple(components), &after[..suffix_len])?;
            kind.validate()?;
            Ok((kind, &after[suffix_len..]))
        }
        None => {
            let end = s.find(char::is_whitespace).unwrap_or(s.len());
            Ok((ParamType::parse(&s[..end])?, &s[end..]))
        }
    }
}

/// Length of the leading `[..][..]` run
fn array_suffix_len(s: &str) -> usize {
    let mut len = 0;
    let mut rest = s;
    while rest.starts_with('[') {
        match rest.find(']') {
            Some(close) => {
                len += close + 1;
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }
    len
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    if s.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
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

/// Byte offset of `word` as a standalone word outside any parentheses
fn find_word(s: &str, word: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && s[i..].starts_with(word) => {
                let before_ok = i == 0 || s[..i].ends_with(|c: char| c.is_whitespace());
                let after = &s[i + word.len()..];
                let after_ok = after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '(');
                if before_ok && after_ok {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
