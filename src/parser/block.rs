//! The indentation-driven statement loop. Keeps an explicit stack of
//! "open block" frames — one per key whose value is a nested object
//! still accepting children — so a dedent closes exactly the frames it
//! needs to and attaches each finished object to its parent under the
//! key that opened it.

use std::path::Path;

use crate::combinators::maybe;
use crate::cursor::Cursor;
use crate::error::{Error, Failure, Result};
use crate::parser::indent::measure_indent;
use crate::lexer::{
    lex_key, require_exactly_one_space, skip_inline_ws, skip_useless_lines,
};
use crate::parser::document::DocumentState;
use crate::parser::value::{parse_inline_value, parse_scalar_value};
use crate::value::{insert_unique, Object, Value};

/// A key whose block is still open, waiting for its children.
struct Frame {
    /// Column of the key itself.
    header_indent: usize,
    /// Column its children must sit at, fixed by the first child line.
    indent: Option<usize>,
    key: String,
    object: Object,
    header_line: usize,
}

enum KeyLineValue {
    Inline(Value),
    BlockHeader,
}

fn remainder_of_line_is_empty(cursor: &Cursor) -> bool {
    let rest = cursor.rest();
    let line_end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    let line = &rest[..line_end];
    let trimmed = line.trim_start_matches([' ', '\t']);
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// A variable definition or `import` directive is only legal at column 0
/// (spec 4.4): unlike a plain key line, this is a rule about the
/// statement itself, not about block nesting, so a misplaced one must be
/// reported as a `ParseError` even when its indentation happens to look
/// like a valid (or invalid) block transition. `import ` (with the
/// trailing space) can never start a key line — a key must be followed
/// directly by `:` with no space — so this check can't misfire on a key
/// literally named `import`.
fn misplaced_statement_error(cursor: &Cursor, c: usize, line: usize) -> Option<Error> {
    if c == 0 {
        return None;
    }
    let rest = cursor.rest();
    if rest.starts_with('$') {
        Some(Error::parse("variable definitions must start at column 0", line))
    } else if rest.starts_with("import ") {
        Some(Error::parse("'import' must start at column 0", line))
    } else {
        None
    }
}

fn end_of_statement(cursor: &mut Cursor) -> Result<()> {
    skip_inline_ws(cursor);
    let _ = maybe(cursor, crate::lexer::comment);
    if cursor.is_eof() {
        return Ok(());
    }
    crate::lexer::newline(cursor)?;
    Ok(())
}

fn parse_key_line_head(cursor: &mut Cursor, state: &DocumentState) -> crate::error::PResult<(String, KeyLineValue)> {
    let key = lex_key(cursor)?;
    crate::combinators::keyword(cursor, ":")?;
    if remainder_of_line_is_empty(cursor) {
        Ok((key, KeyLineValue::BlockHeader))
    } else {
        require_exactly_one_space(cursor)?;
        let value = parse_inline_value(cursor, state)?;
        Ok((key, KeyLineValue::Inline(value)))
    }
}

fn parse_variable_definition(cursor: &mut Cursor, state: &mut DocumentState) -> crate::error::PResult<()> {
    let line = cursor.line();
    crate::combinators::keyword(cursor, "$")?;
    let name = crate::lexer::lex_ident_chars(cursor)?;
    crate::combinators::keyword(cursor, ":")?;
    require_exactly_one_space(cursor)?;
    let value = parse_scalar_value(cursor, state)?;
    if state.variables.contains_key(&name) {
        return Err(Failure::at(cursor, Error::DuplicatedVariable { name, line }));
    }
    state.variables.insert(name, value);
    Ok(())
}

/// Closes `frame`, raising a parse error if it never received a child,
/// and inserts it into its parent (or `root`, if the stack is now
/// empty) under the key that opened it.
fn attach(stack: &mut Vec<Frame>, root: &mut Object, frame: Frame) -> Result<()> {
    if frame.object.is_empty() {
        return Err(Error::parse(
            format!("block for key '{}' has no content", frame.key),
            frame.header_line,
        ));
    }
    let parent = stack.last_mut().map(|f| &mut f.object).unwrap_or(root);
    insert_unique(parent, frame.key, Value::Object(frame.object), frame.header_line)
}

/// Parses `text` as a sequence of top-level statements, writing directly
/// into `root`. Called once for the document itself, and again
/// (recursively, sharing `state`) for every file it imports, so a
/// collision between the importer and an import is caught the same way
/// a collision within one file is.
pub(crate) fn parse_body(text: &str, state: &mut DocumentState, base_dir: &Path, root: &mut Object) -> Result<()> {
    if text.starts_with('\u{feff}') {
        return Err(Error::parse("byte-order mark is not allowed", 1));
    }
    let mut cursor = Cursor::new(text);
    let mut stack: Vec<Frame> = Vec::new();

    skip_useless_lines(&mut cursor);
    while !cursor.is_eof() {
        let line_no = cursor.line();
        let c = measure_indent(&mut cursor, state)?;

        if let Some(top) = stack.last_mut() {
            if top.indent.is_none() {
                let expected = top.header_indent + 4;
                if c != expected {
                    let frame = stack.pop().expect("just checked last_mut");
                    return Err(Error::parse(
                        format!("block for key '{}' has no content", frame.key),
                        frame.header_line,
                    ));
                }
                top.indent = Some(c);
                state.indent_levels.push(c);
            }
        }

        if let Some(err) = misplaced_statement_error(&cursor, c, line_no) {
            return Err(err);
        }

        let current_top = stack.iter().rev().find_map(|f| f.indent).unwrap_or(0);

        if c < current_top {
            if c % 4 != 0 {
                return Err(Error::invalid_indentation(
                    format!("indentation of {c} spaces is not a multiple of 4"),
                    line_no,
                ));
            }
            loop {
                let established = stack.last().and_then(|f| f.indent);
                match established {
                    Some(ind) if ind > c => {
                        let frame = stack.pop().expect("checked above");
                        state.indent_levels.pop();
                        attach(&mut stack, root, frame)?;
                    }
                    _ => break,
                }
            }
            let new_top = stack.iter().rev().find_map(|f| f.indent).unwrap_or(0);
            if new_top != c {
                return Err(Error::invalid_indentation(
                    format!("indentation of {c} spaces does not match any enclosing block"),
                    line_no,
                ));
            }
        } else if c == current_top + 4 {
            return Err(Error::parse("unexpected indentation increase".to_string(), line_no));
        } else if c != current_top {
            return Err(Error::invalid_indentation(
                format!("indentation of {c} spaces does not match the current block ({current_top} spaces)"),
                line_no,
            ));
        }

        if c == 0 {
            if maybe(&mut cursor, |cur| parse_variable_definition(cur, state)).is_some() {
                end_of_statement(&mut cursor)?;
                skip_useless_lines(&mut cursor);
                continue;
            }
            if maybe(&mut cursor, |cur| crate::imports::try_parse_import(cur, state, base_dir, root)).is_some() {
                end_of_statement(&mut cursor)?;
                skip_useless_lines(&mut cursor);
                continue;
            }
        }

        let (key, kind) = parse_key_line_head(&mut cursor, state)?;
        end_of_statement(&mut cursor)?;
        match kind {
            KeyLineValue::Inline(value) => {
                let target = stack.last_mut().map(|f| &mut f.object).unwrap_or(&mut *root);
                insert_unique(target, key, value, line_no)?;
            }
            KeyLineValue::BlockHeader => {
                stack.push(Frame {
                    header_indent: c,
                    indent: None,
                    key,
                    object: Object::new(),
                    header_line: line_no,
                });
            }
        }
        skip_useless_lines(&mut cursor);
    }

    while let Some(frame) = stack.pop() {
        state.indent_levels.pop();
        attach(&mut stack, root, frame)?;
    }

    if !cursor.is_eof() {
        return Err(Error::parse("unexpected trailing input".to_string(), cursor.line()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Result<Object> {
        let mut state = DocumentState::new();
        let mut root = Object::new();
        parse_body(text, &mut state, Path::new("."), &mut root)?;
        Ok(root)
    }

    #[test]
    fn parses_flat_key_lines() {
        let root = run("a: 1\nb: \"two\"\n").unwrap();
        assert_eq!(root.get("a"), Some(&Value::Integer(1)));
        assert_eq!(root.get("b"), Some(&Value::String("two".to_string())));
    }

    #[test]
    fn parses_nested_block() {
        let root = run("parent:\n    child: 1\n    other: 2\n").unwrap();
        match root.get("parent").unwrap() {
            Value::Object(obj) => {
                assert_eq!(obj.get("child"), Some(&Value::Integer(1)));
                assert_eq!(obj.get("other"), Some(&Value::Integer(2)));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn empty_block_is_a_parse_error() {
        let err = run("parent:\nsibling: 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn dedent_to_invalid_level_is_rejected() {
        let err = run("a:\n    b:\n        c: 1\n   d: 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn variable_definition_then_reference() {
        let root = run("$name: \"world\"\ngreeting: \"hi $name\"\n").unwrap();
        assert_eq!(root.get("greeting"), Some(&Value::String("hi world".to_string())));
    }

    #[test]
    fn duplicated_variable_is_rejected() {
        let err = run("$x: 1\n$x: 2\ny: 3\n").unwrap_err();
        assert!(matches!(err, Error::DuplicatedVariable { .. }));
    }

    #[test]
    fn variable_with_non_scalar_value_is_a_parse_error() {
        let err = run("$x: [1, 2]\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let err = run("a: 1\na: 2\n").unwrap_err();
        assert!(matches!(err, Error::DuplicatedKey { .. }));
    }

    #[test]
    fn multiple_levels_of_dedent_in_one_step() {
        let root = run("a:\n    b:\n        c: 1\nd: 2\n").unwrap();
        assert!(root.get("a").is_some());
        assert_eq!(root.get("d"), Some(&Value::Integer(2)));
    }
}
