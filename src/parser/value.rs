//! The "value" production: everything a key or list element can hold
//! other than a nested block object, which only ever arises from the
//! indentation-driven statement loop in `parser::block`.

use crate::combinators::{choice, keyword, maybe};
use crate::cursor::Cursor;
use crate::error::{Error, Failure, PResult};
use crate::lexer::{lex_ident_chars, lex_number, lex_string};
use crate::parser::document::DocumentState;
use crate::value::{insert_unique, Object, Value};

pub(crate) fn parse_bool(cursor: &mut Cursor) -> PResult<Value> {
    choice!(
        cursor,
        |c: &mut Cursor| keyword(c, "true").map(|_| Value::Bool(true)),
        |c: &mut Cursor| keyword(c, "false").map(|_| Value::Bool(false)),
    )
}

pub(crate) fn parse_null(cursor: &mut Cursor) -> PResult<Value> {
    keyword(cursor, "null").map(|_| Value::Null)
}

pub(crate) fn parse_variable_reference(cursor: &mut Cursor, state: &DocumentState) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "$")?;
    let name = lex_ident_chars(cursor).map_err(|e| {
        cursor.restore(cp);
        e
    })?;
    if let Some(value) = state.variables.get(&name) {
        Ok(value.clone())
    } else if let Some(text) = crate::env::lookup(&name) {
        Ok(Value::String(text))
    } else {
        Err(Failure::at(cursor, Error::VariableNotDefined { name, line: cursor.line() }))
    }
}

pub(crate) fn parse_list(cursor: &mut Cursor, state: &DocumentState) -> PResult<Value> {
    keyword(cursor, "[")?;
    crate::lexer::skip_ws_or_newline_or_comment(cursor);
    let mut items = Vec::new();
    if !cursor.starts_with(']') {
        loop {
            let item = parse_inline_value(cursor, state)?;
            items.push(item);
            crate::lexer::skip_ws_or_newline_or_comment(cursor);
            if maybe(cursor, |c| keyword(c, ",")).is_some() {
                crate::lexer::skip_ws_or_newline_or_comment(cursor);
                if cursor.starts_with(']') {
                    break;
                }
                continue;
            }
            break;
        }
    }
    crate::lexer::skip_ws_or_newline_or_comment(cursor);
    keyword(cursor, "]")?;
    Ok(Value::List(items))
}

pub(crate) fn parse_inline_object(cursor: &mut Cursor, state: &DocumentState) -> PResult<Value> {
    let cp = cursor.checkpoint();
    keyword(cursor, "{")?;
    crate::lexer::skip_ws_or_newline_or_comment(cursor);
    let mut obj = Object::new();
    if !cursor.starts_with('}') {
        loop {
            let line = cursor.line();
            let key = crate::lexer::lex_key(cursor)?;
            crate::lexer::skip_inline_ws(cursor);
            keyword(cursor, ":")?;
            crate::lexer::skip_ws_or_newline_or_comment(cursor);
            let val = parse_inline_value(cursor, state)?;
            insert_unique(&mut obj, key, val, line).map_err(|e| {
                cursor.restore(cp);
                Failure::at(cursor, e)
            })?;
            crate::lexer::skip_ws_or_newline_or_comment(cursor);
            if maybe(cursor, |c| keyword(c, ",")).is_some() {
                crate::lexer::skip_ws_or_newline_or_comment(cursor);
                continue;
            }
            break;
        }
    }
    crate::lexer::skip_ws_or_newline_or_comment(cursor);
    keyword(cursor, "}")?;
    Ok(Value::Object(obj))
}

/// `choice(list_literal, inline_object, string, number, bool, null,
/// variable_reference)` — every alternative in spec 4.4's value grammar
/// except `object_block`, which only arises from the statement loop.
pub(crate) fn parse_inline_value(cursor: &mut Cursor, state: &DocumentState) -> PResult<Value> {
    choice!(
        cursor,
        |c: &mut Cursor| parse_list(c, state),
        |c: &mut Cursor| parse_inline_object(c, state),
        |c: &mut Cursor| lex_string(c, &state.variables),
        lex_number,
        parse_bool,
        parse_null,
        |c: &mut Cursor| parse_variable_reference(c, state),
    )
}

/// The restricted value grammar for `$name: value` variable definitions
/// (spec 4.6): scalars only, no lists/objects/bool/null.
pub(crate) fn parse_scalar_value(cursor: &mut Cursor, state: &DocumentState) -> PResult<Value> {
    choice!(cursor, |c: &mut Cursor| lex_string(c, &state.variables), lex_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_list() {
        let state = DocumentState::new();
        let mut c = Cursor::new("[1, [2, 3], true]");
        let v = parse_inline_value(&mut c, &state).unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::Integer(1),
                Value::List(vec![Value::Integer(2), Value::Integer(3)]),
                Value::Bool(true),
            ])
        );
    }

    #[test]
    fn parses_inline_object_with_trailing_newline_inside_braces() {
        let state = DocumentState::new();
        let mut c = Cursor::new("{ a: 1,\n  b: 2 }");
        let v = parse_inline_object(&mut c, &state).unwrap();
        match v {
            Value::Object(obj) => {
                assert_eq!(obj.get("a"), Some(&Value::Integer(1)));
                assert_eq!(obj.get("b"), Some(&Value::Integer(2)));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_key_within_inline_object_is_rejected() {
        let state = DocumentState::new();
        let mut c = Cursor::new("{ a: 1, a: 2 }");
        let err = parse_inline_object(&mut c, &state).unwrap_err();
        assert!(matches!(err.error, Error::DuplicatedKey { .. }));
    }

    #[test]
    fn variable_reference_falls_back_to_environment() {
        std::env::set_var("GLADE_TEST_VAR_VALUE_RESOLUTION", "from-env");
        let state = DocumentState::new();
        let mut c = Cursor::new("$GLADE_TEST_VAR_VALUE_RESOLUTION");
        let v = parse_variable_reference(&mut c, &state).unwrap();
        assert_eq!(v, Value::String("from-env".to_string()));
        std::env::remove_var("GLADE_TEST_VAR_VALUE_RESOLUTION");
    }
}
