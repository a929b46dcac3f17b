//! Grapheme-aware text helpers

use unicode_segmentation::UnicodeSegmentation;

use super::coerce::{NumberType, iterable};
use super::context::Context;
use super::error::RuntimeError;
use super::value::Value;

/// Substitute each `%` in `pattern` with the next item of `data`, cycling.
///
/// Text data is substituted whole at every `%`. `\x` is copied through
/// untouched, and with no data the `%` stays as is.
pub fn format_string(pattern: &str, data: &Value, ctx: &mut Context) -> Result<String, RuntimeError> {
    let items: Vec<String> = match data {
        Value::List(sequence) => sequence
            .force(ctx)?
            .iter()
            .map(Value::to_plain_string)
            .collect(),
        scalar => vec![scalar.to_plain_string()],
    };

    let mut formatted = String::with_capacity(pattern.len());
    let mut graphemes = pattern.graphemes(true);
    let mut next_item = 0;
    while let Some(g) = graphemes.next() {
        match g {
            "\\" => {
                formatted.push('\\');
                if let Some(escaped) = graphemes.next() {
                    formatted.push_str(escaped);
                }
            }
            "%" if !items.is_empty() => {
                formatted.push_str(&items[next_item % items.len()]);
                next_item += 1;
            }
            other => formatted.push_str(other),
        }
    }
    Ok(formatted)
}

/// Replace every character found in `ring` with its successor, wrapping at the end
pub fn ring_translate(ring: &Value, text: &str, ctx: &mut Context) -> Result<String, RuntimeError> {
    let ring: Vec<String> = match ring {
        Value::Text(s) => s.graphemes(true).map(str::to_string).collect(),
        Value::List(sequence) => sequence
            .force(ctx)?
            .iter()
            .map(Value::to_plain_string)
            .collect(),
        other => {
            return Err(RuntimeError::type_mismatch(format!(
                "ring_translate expects Text or List, got {}",
                other.type_name()
            )));
        }
    };

    Ok(text
        .graphemes(true)
        .map(|g| match ring.iter().position(|r| r == g) {
            Some(index) => ring[(index + 1) % ring.len()].as_str(),
            None => g,
        })
        .collect())
}

/// Items of `haystack` that occur in `needle`. Text stays text; anything
/// else becomes a list.
pub fn keep(haystack: &Value, needle: &Value, ctx: &mut Context) -> Result<Value, RuntimeError> {
    if let Value::Text(s) = haystack {
        let mut kept = String::new();
        for g in s.graphemes(true) {
            if occurs_in(&Value::text(g), needle, ctx)? {
                kept.push_str(g);
            }
        }
        return Ok(Value::text(kept));
    }

    let items = match iterable(haystack, Some(NumberType::Digits), ctx)? {
        Value::List(sequence) => sequence.force(ctx)?,
        other => im_rc::Vector::unit(other),
    };
    let mut kept = Vec::new();
    for item in items {
        if occurs_in(&item, needle, ctx)? {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

fn occurs_in(item: &Value, needle: &Value, ctx: &mut Context) -> Result<bool, RuntimeError> {
    match needle {
        Value::Text(s) => Ok(matches!(item, Value::Text(t) if s.contains(t.as_str()))),
        Value::List(sequence) => sequence.contains(item, ctx),
        Value::Number(_) => match iterable(needle, Some(NumberType::Digits), ctx)? {
            Value::List(digits) => digits.contains(item, ctx),
            _ => Ok(false),
        },
        Value::Function(_) => Err(RuntimeError::type_mismatch(
            "cannot test membership in a Function",
        )),
    }
}

/// The whole text, then its suffixes of length 1, 2, ..., n-1
pub fn suffixes(text: &str) -> Value {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let n = graphemes.len();
    let mut all = Vec::with_capacity(n);
    if n > 0 {
        all.push(Value::text(text));
    }
    for len in 1..n {
        all.push(Value::text(graphemes[n - len..].concat()));
    }
    Value::list(all)
}
