//! Top-level entry point: owns the state shared across a document and
//! its imports, and drives the recursive-descent parse to a resolved
//! [`Value`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::Result;
use crate::parser::block;
use crate::value::{Object, Value};

/// State threaded by mutable reference through a document and every file
/// it (transitively) imports: variables and import bookkeeping are
/// shared so a later file can see an earlier file's `$var` definitions
/// and duplicate-import checks stay global to the whole document.
pub(crate) struct DocumentState {
    pub variables: IndexMap<String, Value>,
    pub imported_paths: HashSet<PathBuf>,
    /// Mirrors the nesting depth of currently-open blocks, `[0]` at the
    /// document root. Maintained alongside the block parser's own frame
    /// stack for observability/testing; not itself load-bearing for
    /// control flow.
    pub indent_levels: Vec<usize>,
    pub indent_char: Option<char>,
}

impl DocumentState {
    pub(crate) fn new() -> Self {
        DocumentState {
            variables: IndexMap::new(),
            imported_paths: HashSet::new(),
            indent_levels: vec![0],
            indent_char: None,
        }
    }
}

/// Parses `text` as a complete document, resolving variables and imports
/// relative to `base_dir` (used for any `import "..."` it contains).
pub(crate) fn parse_document(text: &str, base_dir: &Path) -> Result<Value> {
    let mut state = DocumentState::new();
    let mut root = Object::new();
    block::parse_body(text, &mut state, base_dir, &mut root)?;
    Ok(Value::Object(root))
}
