//! Canonical serialization: [`dumps`] always emits a fully-resolved
//! document — no comments, variables, or imports ever appear in the
//! output, since [`crate::loads`] has already resolved them away.

use crate::value::{Object, Value};

const INDENT_UNIT: &str = "    ";

/// Formats a float the way interpolation and serialization both want it:
/// shortest round-trippable decimal, always distinguishable from an
/// integer (a bare `5.0` never prints as `5`).
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let text = format!("{f}");
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        format!("{text}.0")
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Serializes a scalar or a list's/inline-position's value onto a single
/// line. Nested objects are not valid here — they always render as
/// indented blocks via [`write_object`].
fn write_inline(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => out.push_str(&escape_string(s)),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(item, out);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            out.push_str("{ ");
            for (i, (k, v)) in obj.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(k);
                out.push_str(": ");
                write_inline(v, out);
            }
            out.push_str(" }");
        }
    }
}

fn write_object(obj: &Object, depth: usize, out: &mut String) {
    let prefix = INDENT_UNIT.repeat(depth);
    for (key, value) in obj {
        out.push_str(&prefix);
        out.push_str(key);
        out.push(':');
        match value {
            Value::Object(child) => {
                out.push('\n');
                write_object(child, depth + 1, out);
            }
            other => {
                out.push(' ');
                write_inline(other, out);
                out.push('\n');
            }
        }
    }
}

/// Renders a [`Value`] as canonical, fully-resolved `glade` text. The
/// top level is always an object: each key starts a new line at the
/// given indentation, and a key whose value is itself an object opens a
/// nested block rather than an inline `{ ... }`.
pub fn dumps(value: &Value) -> String {
    match value {
        Value::Object(obj) => {
            let mut out = String::new();
            write_object(obj, 0, &mut out);
            out
        }
        other => {
            let mut out = String::new();
            write_inline(other, &mut out);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn float_formatting_always_distinguishable_from_integer() {
        assert_eq!(format_float(5.0), "5.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert!(format_float(f64::NAN) == "nan");
    }

    #[test]
    fn dumps_nested_block_object() {
        let mut inner = IndexMap::new();
        inner.insert("b".to_string(), Value::Integer(1));
        let mut outer = IndexMap::new();
        outer.insert("a".to_string(), Value::Object(inner));
        let text = dumps(&Value::Object(outer));
        assert_eq!(text, "a:\n    b: 1\n");
    }

    #[test]
    fn dumps_list_single_line() {
        let mut obj = IndexMap::new();
        obj.insert(
            "xs".to_string(),
            Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
        );
        assert_eq!(dumps(&Value::Object(obj)), "xs: [1, 2, 3]\n");
    }

    #[test]
    fn dumps_preserves_insertion_order() {
        let mut obj = IndexMap::new();
        obj.insert("z".to_string(), Value::Integer(1));
        obj.insert("a".to_string(), Value::Integer(2));
        assert_eq!(dumps(&Value::Object(obj)), "z: 1\na: 2\n");
    }
}
