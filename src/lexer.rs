//! Lexical layer: whitespace/comment skipping, the four string flavors
//! (with escapes and `$var` interpolation), numeric literals, and the
//! shared `[A-Za-z0-9_]+` identifier class used by both keys and variable
//! names.

use indexmap::IndexMap;

use crate::combinators::{choice, keyword, zero_or_more};
use crate::cursor::Cursor;
use crate::error::{Error, Failure, PResult};
use crate::value::{stringify_for_interpolation, Value};

/// Consumes a run of spaces/tabs (not newlines).
pub(crate) fn skip_inline_ws(cursor: &mut Cursor) {
    scan_while(cursor, |c| c == ' ' || c == '\t');
}

/// Consumes a single `\n` or `\r\n`, counting as one line.
pub(crate) fn newline(cursor: &mut Cursor) -> PResult<()> {
    if cursor.starts_with("\r\n") {
        cursor.consume(2);
        Ok(())
    } else if cursor.starts_with('\n') {
        cursor.consume(1);
        Ok(())
    } else {
        Err(Failure::at(cursor, Error::parse("expected a newline", cursor.line())))
    }
}

/// Consumes a `#` comment through (but not including) the line ending.
pub(crate) fn comment(cursor: &mut Cursor) -> PResult<()> {
    keyword(cursor, "#")?;
    let rest = cursor.rest();
    let end = memchr::memchr2(b'\n', b'\r', rest.as_bytes()).unwrap_or(rest.len());
    cursor.consume(end);
    Ok(())
}

fn ws_or_newline_or_comment_unit(cursor: &mut Cursor) -> PResult<()> {
    choice!(
        cursor,
        |c: &mut Cursor| {
            let taken = scan_while(c, |ch| ch == ' ' || ch == '\t');
            if taken.is_empty() {
                Err(Failure::at(c, Error::parse("expected whitespace", c.line())))
            } else {
                Ok(())
            }
        },
        newline,
        comment,
    )
}

/// Skips any mixture of inline whitespace, newlines, and comments — used
/// freely between tokens inside `[...]` and `{...}` brackets.
pub(crate) fn skip_ws_or_newline_or_comment(cursor: &mut Cursor) {
    zero_or_more(cursor, ws_or_newline_or_comment_unit);
}

/// A single "useless line": optional leading whitespace, an optional
/// comment, then a line ending (or EOF). Carries no indentation meaning.
fn useless_line(cursor: &mut Cursor) -> PResult<()> {
    skip_inline_ws(cursor);
    let _ = crate::combinators::maybe(cursor, comment);
    if cursor.is_eof() {
        return Ok(());
    }
    match cursor.peek_char() {
        Some('\n') | Some('\r') => newline(cursor),
        _ => Err(Failure::at(cursor, Error::parse("not a useless line", cursor.line()))),
    }
}

/// Skips every useless (blank/comment-only) line starting here.
pub(crate) fn skip_useless_lines(cursor: &mut Cursor) {
    zero_or_more(cursor, useless_line);
}

/// Scans while `pred` holds, returning the consumed slice (empty if none).
pub(crate) fn scan_while<'a>(cursor: &mut Cursor<'a>, pred: impl Fn(char) -> bool) -> &'a str {
    let rest = cursor.rest();
    let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
    cursor.consume(end)
}

fn count_consecutive(cursor: &Cursor, ch: char) -> usize {
    cursor.rest().chars().take_while(|&c| c == ch).count()
}

/// The `[A-Za-z0-9_]+` class shared by keys and variable names.
pub(crate) fn lex_ident_chars(cursor: &mut Cursor) -> PResult<String> {
    let taken = scan_while(cursor, |c| c.is_ascii_alphanumeric() || c == '_');
    if taken.is_empty() {
        Err(Failure::at(cursor, Error::parse("expected a name", cursor.line())))
    } else {
        Ok(taken.to_string())
    }
}

/// A key: the same identifier class. Keys containing `.`, `-`, or quotes
/// are never matched here, so the caller sees a plain parse error instead.
pub(crate) fn lex_key(cursor: &mut Cursor) -> PResult<String> {
    lex_ident_chars(cursor)
}

/// Consumes exactly one space, failing if there are zero or more than one
/// — the spacing rule shared by key lines and variable definition lines.
pub(crate) fn require_exactly_one_space(cursor: &mut Cursor) -> PResult<()> {
    if !cursor.starts_with(' ') {
        return Err(Failure::at(cursor, Error::parse("expected a space", cursor.line())));
    }
    cursor.consume(1);
    if cursor.starts_with(' ') {
        return Err(Failure::at(
            cursor,
            Error::parse("expected exactly one space", cursor.line()),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------

fn is_digit_or_underscore(c: char) -> bool {
    c.is_ascii_digit() || c == '_'
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|&c| c != '_').collect()
}

fn lex_radix(cursor: &mut Cursor, prefix: &str, radix: u32, digit: impl Fn(char) -> bool) -> PResult<Value> {
    let cp = cursor.checkpoint();
    if keyword(cursor, prefix).is_err() {
        return Err(Failure::at(cursor, Error::parse("expected number", cursor.line())));
    }
    let digits = scan_while(cursor, |c| digit(c) || c == '_');
    if digits.is_empty() {
        cursor.restore(cp);
        return Err(Failure::at(cursor, Error::parse("expected digits", cursor.line())));
    }
    let cleaned = strip_underscores(digits);
    match i64::from_str_radix(&cleaned, radix) {
        Ok(v) => Ok(Value::Integer(v)),
        Err(_) => {
            cursor.restore(cp);
            Err(Failure::at(cursor, Error::parse("invalid numeric literal", cursor.line())))
        }
    }
}

fn lex_hex(cursor: &mut Cursor) -> PResult<Value> {
    lex_radix(cursor, "0x", 16, |c| c.is_ascii_hexdigit())
}

fn lex_oct(cursor: &mut Cursor) -> PResult<Value> {
    lex_radix(cursor, "0o", 8, |c| ('0'..='7').contains(&c))
}

fn lex_bin(cursor: &mut Cursor) -> PResult<Value> {
    lex_radix(cursor, "0b", 2, |c| c == '0' || c == '1')
}

fn lex_special_float(cursor: &mut Cursor) -> PResult<Value> {
    choice!(
        cursor,
        |c: &mut Cursor| keyword(c, "+inf").map(|_| Value::Float(f64::INFINITY)),
        |c: &mut Cursor| keyword(c, "-inf").map(|_| Value::Float(f64::NEG_INFINITY)),
        |c: &mut Cursor| keyword(c, "inf").map(|_| Value::Float(f64::INFINITY)),
        |c: &mut Cursor| keyword(c, "+nan").map(|_| Value::Float(f64::NAN)),
        |c: &mut Cursor| keyword(c, "-nan").map(|_| Value::Float(-f64::NAN)),
        |c: &mut Cursor| keyword(c, "nan").map(|_| Value::Float(f64::NAN)),
    )
}

fn lex_float(cursor: &mut Cursor) -> PResult<Value> {
    let cp = cursor.checkpoint();
    if matches!(cursor.peek_char(), Some('+') | Some('-')) {
        cursor.bump();
    }
    let int_part = scan_while(cursor, is_digit_or_underscore);
    let mut has_marker = false;

    if cursor.peek_char() == Some('.') {
        let dot_cp = cursor.checkpoint();
        cursor.bump();
        let frac_part = scan_while(cursor, is_digit_or_underscore);
        if frac_part.is_empty() {
            cursor.restore(dot_cp);
        } else {
            has_marker = true;
        }
    }

    if matches!(cursor.peek_char(), Some('e') | Some('E')) {
        let exp_cp = cursor.checkpoint();
        cursor.bump();
        if matches!(cursor.peek_char(), Some('+') | Some('-')) {
            cursor.bump();
        }
        let exp_digits = scan_while(cursor, is_digit_or_underscore);
        if exp_digits.is_empty() {
            cursor.restore(exp_cp);
        } else {
            has_marker = true;
        }
    }

    if !has_marker || int_part.is_empty() {
        cursor.restore(cp);
        return Err(Failure::at(cursor, Error::parse("expected a float", cursor.line())));
    }

    let text = strip_underscores(cursor.slice_since(cp));
    match text.parse::<f64>() {
        Ok(v) => Ok(Value::Float(v)),
        Err(_) => {
            cursor.restore(cp);
            Err(Failure::at(cursor, Error::parse("invalid float literal", cursor.line())))
        }
    }
}

fn lex_integer(cursor: &mut Cursor) -> PResult<Value> {
    let cp = cursor.checkpoint();
    if matches!(cursor.peek_char(), Some('+') | Some('-')) {
        cursor.bump();
    }
    let digits = scan_while(cursor, is_digit_or_underscore);
    if digits.is_empty() {
        cursor.restore(cp);
        return Err(Failure::at(cursor, Error::parse("expected an integer", cursor.line())));
    }
    let text = strip_underscores(cursor.slice_since(cp));
    match text.parse::<i64>() {
        Ok(v) => Ok(Value::Integer(v)),
        Err(_) => {
            cursor.restore(cp);
            Err(Failure::at(cursor, Error::parse("invalid integer literal", cursor.line())))
        }
    }
}

pub(crate) fn lex_number(cursor: &mut Cursor) -> PResult<Value> {
    choice!(cursor, lex_hex, lex_oct, lex_bin, lex_special_float, lex_float, lex_integer)
}

// ---------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------

fn decode_scalar(cursor: &Cursor, hex: &str) -> PResult<String> {
    let code = u32::from_str_radix(hex, 16)
        .map_err(|_| Failure::at(cursor, Error::parse("invalid unicode escape", cursor.line())))?;
    let c = char::from_u32(code)
        .ok_or_else(|| Failure::at(cursor, Error::parse("invalid unicode scalar value", cursor.line())))?;
    Ok(c.to_string())
}

fn take_exact_hex(cursor: &mut Cursor, n: usize) -> PResult<String> {
    let taken = scan_while(cursor, |c| c.is_ascii_hexdigit());
    if taken.chars().count() != n {
        return Err(Failure::at(cursor, Error::parse("expected hex digits", cursor.line())));
    }
    Ok(taken.to_string())
}

/// A single backslash escape. `\$` yields a literal `$` that does not
/// trigger interpolation on what follows — the `$` is consumed here, so
/// the caller's interpolation check never sees it fresh.
fn lex_escape(cursor: &mut Cursor) -> PResult<String> {
    let cp = cursor.checkpoint();
    let result: PResult<String> = (|| {
        keyword(cursor, "\\")?;
        match cursor.peek_char() {
            Some('b') => {
                cursor.bump();
                Ok("\u{8}".to_string())
            }
            Some('f') => {
                cursor.bump();
                Ok("\u{c}".to_string())
            }
            Some('n') => {
                cursor.bump();
                Ok("\n".to_string())
            }
            Some('r') => {
                cursor.bump();
                Ok("\r".to_string())
            }
            Some('t') => {
                cursor.bump();
                Ok("\t".to_string())
            }
            Some('"') => {
                cursor.bump();
                Ok("\"".to_string())
            }
            Some('\\') => {
                cursor.bump();
                Ok("\\".to_string())
            }
            Some('$') => {
                cursor.bump();
                Ok("$".to_string())
            }
            Some('u') => {
                cursor.bump();
                let hex = take_exact_hex(cursor, 4)?;
                decode_scalar(cursor, &hex)
            }
            Some('U') => {
                cursor.bump();
                let hex = take_exact_hex(cursor, 8)?;
                decode_scalar(cursor, &hex)
            }
            _ => Err(Failure::at(cursor, Error::parse("invalid escape sequence", cursor.line()))),
        }
    })();
    if result.is_err() {
        cursor.restore(cp);
    }
    result
}

fn resolve_interpolation(cursor: &mut Cursor, vars: &IndexMap<String, Value>) -> PResult<String> {
    let cp = cursor.checkpoint();
    keyword(cursor, "$")?;
    let name = lex_ident_chars(cursor).map_err(|e| {
        cursor.restore(cp);
        e
    })?;
    if let Some(value) = vars.get(&name) {
        match stringify_for_interpolation(value) {
            Some(s) => Ok(s),
            None => Err(Failure::at(
                cursor,
                Error::parse(format!("variable '${name}' cannot be interpolated: not a scalar"), cursor.line()),
            )),
        }
    } else if let Some(s) = crate::env::lookup(&name) {
        Ok(s)
    } else {
        Err(Failure::at(cursor, Error::VariableNotDefined { name, line: cursor.line() }))
    }
}

/// A basic, single-line `"..."` string: escapes and `$var` interpolation.
pub(crate) fn lex_basic(cursor: &mut Cursor, vars: &IndexMap<String, Value>) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "\"")?;
    let mut out = String::new();
    loop {
        match cursor.peek_char() {
            None => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some('"') => {
                cursor.bump();
                break;
            }
            Some('\n') | Some('\r') => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some('\\') => out.push_str(&lex_escape(cursor)?),
            Some('$') => out.push_str(&resolve_interpolation(cursor, vars)?),
            Some(_) => out.push(cursor.bump().unwrap()),
        }
    }
    Ok(Value::String(out))
}

/// A literal, single-line `'...'` string: fully verbatim, no escapes or
/// interpolation.
fn lex_literal(cursor: &mut Cursor) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "'")?;
    let mut out = String::new();
    loop {
        match cursor.peek_char() {
            None => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some('\'') => {
                cursor.bump();
                break;
            }
            Some('\n') | Some('\r') => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some(c) => {
                out.push(c);
                cursor.bump();
            }
        }
    }
    Ok(Value::String(out))
}

fn is_line_continuation(cursor: &Cursor) -> bool {
    let rest = cursor.rest();
    debug_assert!(rest.starts_with('\\'));
    let after = &rest[1..];
    after.starts_with('\n') || after.starts_with("\r\n")
}

fn consume_line_continuation(cursor: &mut Cursor) -> PResult<()> {
    cursor.consume(1);
    newline(cursor)?;
    skip_inline_ws(cursor);
    Ok(())
}

/// A multiline basic `"""..."""` string: escapes, interpolation, and
/// trailing-backslash line continuations. Only a run of *exactly* three
/// unescaped `"` closes the string; any other run length (one, two, or
/// more than three) is entirely literal content and scanning continues —
/// a run longer than three can't be split into "trailing close plus
/// literal prefix" without risking swallowing real content that follows,
/// so embedding a literal run of exactly three quotes requires escaping
/// at least one of them.
pub(crate) fn lex_multiline_basic(cursor: &mut Cursor, vars: &IndexMap<String, Value>) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "\"\"\"")?;
    let _ = crate::combinators::maybe(cursor, newline);
    let mut out = String::new();
    loop {
        if cursor.starts_with("\"\"\"") {
            let run = count_consecutive(cursor, '"');
            if run == 3 {
                cursor.consume(3);
                break;
            } else {
                out.push_str(&"\"".repeat(run));
                cursor.consume(run);
                continue;
            }
        }
        match cursor.peek_char() {
            None => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some('\\') if is_line_continuation(cursor) => consume_line_continuation(cursor)?,
            Some('\\') => out.push_str(&lex_escape(cursor)?),
            Some('$') => out.push_str(&resolve_interpolation(cursor, vars)?),
            Some('\r') if cursor.starts_with("\r\n") => {
                cursor.consume(2);
                out.push('\n');
            }
            Some(c) => {
                out.push(c);
                cursor.bump();
            }
        }
    }
    Ok(Value::String(out))
}

/// A multiline literal `'''...'''` string: fully verbatim. Quote-run
/// handling mirrors the basic multiline flavor: only a run of exactly
/// three closes, any other run length is literal and scanning continues.
pub(crate) fn lex_multiline_literal(cursor: &mut Cursor) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "'''")?;
    let _ = crate::combinators::maybe(cursor, newline);
    let mut out = String::new();
    loop {
        if cursor.starts_with("'''") {
            let run = count_consecutive(cursor, '\'');
            if run == 3 {
                cursor.consume(3);
                break;
            } else {
                out.push_str(&"'".repeat(run));
                cursor.consume(run);
                continue;
            }
        }
        if cursor.starts_with("\r\n") {
            cursor.consume(2);
            out.push('\n');
            continue;
        }
        match cursor.bump() {
            None => {
                cursor.restore(cp);
                return Err(Failure::at(cursor, Error::parse("unterminated string", cursor.line())));
            }
            Some(c) => out.push(c),
        }
    }
    Ok(Value::String(out))
}

/// Any of the four string flavors, longest delimiter first so `"""` and
/// `'''` are not mistaken for an empty `""`/`''` followed by a third quote.
pub(crate) fn lex_string(cursor: &mut Cursor, vars: &IndexMap<String, Value>) -> PResult<Value> {
    choice!(
        cursor,
        |c: &mut Cursor| lex_multiline_basic(c, vars),
        |c: &mut Cursor| lex_basic(c, vars),
        |c: &mut Cursor| lex_multiline_literal(c),
        lex_literal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars() -> IndexMap<String, Value> {
        IndexMap::new()
    }

    #[test]
    fn lexes_plain_integer() {
        let mut c = Cursor::new("42 ");
        assert_eq!(lex_number(&mut c).unwrap(), Value::Integer(42));
    }

    #[test]
    fn lexes_hex_oct_bin() {
        assert_eq!(lex_number(&mut Cursor::new("0xFF")).unwrap(), Value::Integer(255));
        assert_eq!(lex_number(&mut Cursor::new("0o17")).unwrap(), Value::Integer(15));
        assert_eq!(lex_number(&mut Cursor::new("0b101")).unwrap(), Value::Integer(5));
    }

    #[test]
    fn lexes_float_with_exponent() {
        match lex_number(&mut Cursor::new("1.5e2")).unwrap() {
            Value::Float(f) => assert_eq!(f, 150.0),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn lexes_signed_infinity() {
        assert_eq!(lex_number(&mut Cursor::new("-inf")).unwrap(), Value::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn lexes_signed_nan_tokens() {
        assert!(matches!(lex_number(&mut Cursor::new("nan")).unwrap(), Value::Float(f) if f.is_nan()));
        assert!(matches!(lex_number(&mut Cursor::new("+nan")).unwrap(), Value::Float(f) if f.is_nan()));
        assert!(matches!(lex_number(&mut Cursor::new("-nan")).unwrap(), Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn integer_does_not_consume_trailing_dot_without_digits() {
        // "5." with nothing after the dot is not a float: the integer lexer
        // should win, leaving the dot unconsumed for the caller.
        let mut c = Cursor::new("5.");
        let v = lex_number(&mut c).unwrap();
        assert_eq!(v, Value::Integer(5));
        assert_eq!(c.rest(), ".");
    }

    #[test]
    fn basic_string_supports_escapes_and_interpolation() {
        let mut vars = no_vars();
        vars.insert("name".to_string(), Value::String("world".to_string()));
        let mut c = Cursor::new("\"hello \\$name, $name!\"");
        let v = lex_basic(&mut c, &vars).unwrap();
        assert_eq!(v, Value::String("hello $name, world!".to_string()));
    }

    #[test]
    fn literal_string_is_never_interpolated() {
        let mut c = Cursor::new("'$no_parsed variable!'");
        let v = lex_literal(&mut c).unwrap();
        assert_eq!(v, Value::String("$no_parsed variable!".to_string()));
    }

    #[test]
    fn multiline_basic_handles_short_quote_runs() {
        let vars = no_vars();
        let mut c = Cursor::new("\"\"\"Here are two quotation marks: \"\". Simple enough.\"\"\"");
        let v = lex_multiline_basic(&mut c, &vars).unwrap();
        assert_eq!(v, Value::String("Here are two quotation marks: \"\". Simple enough.".to_string()));
    }

    #[test]
    fn multiline_basic_handles_long_quote_runs() {
        let vars = no_vars();
        let fifteen = "\"".repeat(15);
        let text = format!("\"\"\"Here are fifteen quotation marks: {fifteen}.\"\"\"");
        let mut c = Cursor::new(&text);
        let v = lex_multiline_basic(&mut c, &vars).unwrap();
        assert_eq!(v, Value::String(format!("Here are fifteen quotation marks: {fifteen}.")));
    }

    #[test]
    fn multiline_basic_line_continuation_drops_newline_and_indent() {
        let vars = no_vars();
        let mut c = Cursor::new("\"\"\"a long \\\n    sentence\"\"\"");
        let v = lex_multiline_basic(&mut c, &vars).unwrap();
        assert_eq!(v, Value::String("a long sentence".to_string()));
    }

    #[test]
    fn unicode_escape_decodes_scalar() {
        let vars = no_vars();
        let mut c = Cursor::new("\"\\u00e9\"");
        assert_eq!(lex_basic(&mut c, &vars).unwrap(), Value::String("é".to_string()));
    }

    #[test]
    fn multiline_basic_normalizes_crlf_to_lf() {
        let vars = no_vars();
        let mut c = Cursor::new("\"\"\"a\r\nb\"\"\"");
        assert_eq!(lex_multiline_basic(&mut c, &vars).unwrap(), Value::String("a\nb".to_string()));
    }

    #[test]
    fn multiline_literal_normalizes_crlf_to_lf() {
        let mut c = Cursor::new("'''a\r\nb'''");
        assert_eq!(lex_multiline_literal(&mut c).unwrap(), Value::String("a\nb".to_string()));
    }
}
