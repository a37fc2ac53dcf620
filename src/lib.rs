//! `glade`: a parser and serializer for a human-oriented configuration
//! document format — indentation-delimited nested objects, first-class
//! `$variable`s with environment-variable fallback, and `import "path"`
//! directives for splitting a document across files.
//!
//! ```
//! let value = glade::loads("name: \"world\"\n").unwrap();
//! assert_eq!(glade::dumps(&value), "name: \"world\"\n");
//! ```

mod combinators;
mod cursor;
mod env;
mod error;
mod imports;
mod lexer;
mod parser;
mod serializer;
mod value;

use std::path::Path;

pub use error::{Error, Result};
pub use value::{Object, Value};

/// Parses a document from its textual form into a resolved [`Value`]
/// tree. Any `import "path"` directive resolves relative to the current
/// working directory — use [`loads_file`] when the document lives on
/// disk and its imports should resolve relative to its own location.
pub fn loads(text: &str) -> Result<Value> {
    parser::document::parse_document(text, Path::new("."))
}

/// Parses a document from `path`, resolving any imports it contains
/// relative to `path`'s own parent directory.
pub fn loads_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound { path: path.to_path_buf() })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parser::document::parse_document(&text, base_dir)
}

/// Renders a [`Value`] back to canonical `glade` text: fully resolved,
/// with no comments, variables, or imports — those only ever exist in
/// source text, not in the parsed tree.
pub fn dumps(value: &Value) -> String {
    serializer::dumps(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_an_empty_object() {
        let v = loads("").unwrap();
        assert_eq!(v, Value::Object(Object::new()));
    }

    #[test]
    fn variable_only_document_is_an_empty_object() {
        let v = loads("$unused: 5\n").unwrap();
        assert_eq!(v, Value::Object(Object::new()));
    }

    #[test]
    fn round_trips_a_small_document() {
        let text = "name: \"glade\"\ncount: 3\nnested:\n    enabled: true\n";
        let v = loads(text).unwrap();
        let out = dumps(&v);
        let reparsed = loads(&out).unwrap();
        assert_eq!(v, reparsed);
    }

    #[test]
    fn malformed_key_is_a_parse_error() {
        let err = loads("with.dot: 5\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn invalid_indentation_is_reported() {
        let err = loads("a:\n    b:\n        c: 1\n   d: 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn undefined_variable_reference_is_reported() {
        let err = loads("a: $missing\n").unwrap_err();
        assert!(matches!(err, Error::VariableNotDefined { .. }));
    }
}
