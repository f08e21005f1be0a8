//! Token merger: flattens nested run output and coalesces neighbours.

use crate::error::{CompileError, Result};
use crate::visitor::Value;

/// Flattens `value` into an ordered run list, concatenating adjacent runs of
/// the same kind and dropping empty ones.
///
/// The concatenated text is unchanged by merging, and merging a merged list
/// again is a no-op. Non-empty plain `Text` in the input means some node kind produced
/// uncategorized text and is rejected.
pub fn merge<K: PartialEq>(value: Value<(K, String)>) -> Result<Vec<(K, String)>> {
    let mut out = Vec::new();
    merge_into(value, &mut out)?;
    Ok(out)
}

fn merge_into<K: PartialEq>(value: Value<(K, String)>, out: &mut Vec<(K, String)>) -> Result<()> {
    match value {
        Value::Empty => Ok(()),
        // Empty containers (no attributes, no children) arrive as empty text.
        Value::Text(text) if text.is_empty() => Ok(()),
        Value::Text(text) => Err(CompileError::UntypedFragment { text }),
        Value::Item(run) => {
            push_run(out, run);
            Ok(())
        }
        Value::List(values) => {
            for value in values {
                merge_into(value, out)?;
            }
            Ok(())
        }
    }
}

/// Appends one run, extending the previous run when the kinds match.
pub fn push_run<K: PartialEq>(out: &mut Vec<(K, String)>, (kind, text): (K, String)) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some((last_kind, last_text)) if *last_kind == kind => last_text.push_str(&text),
        _ => out.push((kind, text)),
    }
}

/// Wraps an already merged list so it can be fed back through [`merge`].
pub fn as_value<K>(runs: Vec<(K, String)>) -> Value<(K, String)> {
    Value::List(runs.into_iter().map(Value::Item).collect())
}
