//! Indentation measurement: a fixed 4-space unit, tabs forbidden.

use crate::cursor::Cursor;
use crate::error::{Error, Failure, PResult};
use crate::parser::document::DocumentState;

/// Measures and consumes the run of leading spaces/tabs at the cursor,
/// returning its width in columns. Any tab anywhere in an indentation
/// run is an [`Error::InvalidIndentation`] — this crate's documents are
/// space-indented only.
pub(crate) fn measure_indent(cursor: &mut Cursor, state: &mut DocumentState) -> PResult<usize> {
    let rest = cursor.rest();
    let end = rest.find(|c: char| c != ' ' && c != '\t').unwrap_or(rest.len());
    let run = &rest[..end];
    if run.contains('\t') {
        return Err(Failure::at(
            cursor,
            Error::invalid_indentation("tabs are not allowed in indentation", cursor.line()),
        ));
    }
    if !run.is_empty() && state.indent_char.is_none() {
        state.indent_char = Some(' ');
    }
    let width = run.chars().count();
    cursor.consume(end);
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_tab_indentation() {
        let mut c = Cursor::new("\tkey: 1");
        let mut state = DocumentState::new();
        let err = measure_indent(&mut c, &mut state).unwrap_err();
        assert!(matches!(err.error, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn measures_space_width() {
        let mut c = Cursor::new("    key: 1");
        let mut state = DocumentState::new();
        assert_eq!(measure_indent(&mut c, &mut state).unwrap(), 4);
        assert_eq!(c.rest(), "key: 1");
    }
}
