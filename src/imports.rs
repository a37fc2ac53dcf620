//! `import "path"` resolution: relative paths resolve against the
//! importing file's own directory, absolute paths are used verbatim,
//! and the imported file's statements are parsed directly into the
//! importer's root object and shared variable table — an import reads
//! exactly as if its contents were spliced in at that point.

use std::path::{Path, PathBuf};

use crate::combinators::keyword;
use crate::cursor::Cursor;
use crate::error::{Error, Failure, PResult};
use crate::lexer::lex_basic;
use crate::parser::document::DocumentState;
use crate::value::{Object, Value};

fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Attempts to parse an `import "path"` directive starting here. Does
/// not consume the trailing line ending — the caller applies the same
/// end-of-statement check it uses for every other statement kind.
pub(crate) fn try_parse_import(
    cursor: &mut Cursor,
    state: &mut DocumentState,
    base_dir: &Path,
    root: &mut Object,
) -> PResult<()> {
    let line = cursor.line();
    keyword(cursor, "import")?;
    if !cursor.starts_with(' ') {
        return Err(Failure::at(cursor, Error::parse("expected a space after 'import'", line)));
    }
    cursor.consume(1);
    if cursor.starts_with(' ') {
        return Err(Failure::at(
            cursor,
            Error::parse("expected exactly one space between 'import' and the path", line),
        ));
    }

    let path_value = lex_basic(cursor, &state.variables)?;
    let Value::String(path_text) = path_value else {
        unreachable!("lex_basic always yields Value::String");
    };

    let resolved = resolve_path(base_dir, &path_text);
    let canonical = std::fs::canonicalize(&resolved)
        .map_err(|_| Failure::at(cursor, Error::FileNotFound { path: resolved.clone() }))?;

    if state.imported_paths.contains(&canonical) {
        return Err(Failure::at(cursor, Error::DuplicatedImport { path: canonical, line }));
    }

    let contents = std::fs::read_to_string(&resolved)
        .map_err(|_| Failure::at(cursor, Error::FileNotFound { path: resolved.clone() }))?;

    state.imported_paths.insert(canonical);
    log::debug!("importing '{}'", resolved.display());

    let import_base_dir = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    crate::parser::block::parse_body(&contents, state, &import_base_dir, root)
        .map_err(|e| Failure::at(cursor, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn imports_merge_into_the_same_root() {
        let dir = tempfile::tempdir().unwrap();
        let imported_path = dir.path().join("shared.glade");
        let mut f = std::fs::File::create(&imported_path).unwrap();
        writeln!(f, "shared_key: 1").unwrap();

        let mut state = DocumentState::new();
        let mut root = Object::new();
        let text = format!("import \"{}\"\nlocal_key: 2\n", imported_path.display());
        crate::parser::block::parse_body(&text, &mut state, dir.path(), &mut root).unwrap();

        assert_eq!(root.get("shared_key"), Some(&Value::Integer(1)));
        assert_eq!(root.get("local_key"), Some(&Value::Integer(2)));
    }

    #[test]
    fn duplicate_import_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let imported_path = dir.path().join("shared.glade");
        std::fs::File::create(&imported_path).unwrap().write_all(b"shared_key: 1\n").unwrap();

        let mut state = DocumentState::new();
        let mut root = Object::new();
        let text = format!(
            "import \"{}\"\nimport \"{}\"\n",
            imported_path.display(),
            imported_path.display()
        );
        let err = crate::parser::block::parse_body(&text, &mut state, dir.path(), &mut root).unwrap_err();
        assert!(matches!(err, Error::DuplicatedImport { .. }));
    }

    #[test]
    fn missing_import_reports_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DocumentState::new();
        let mut root = Object::new();
        let text = "import \"does-not-exist.glade\"\n";
        let err = crate::parser::block::parse_body(text, &mut state, dir.path(), &mut root).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
