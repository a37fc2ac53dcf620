//! The backtracking parser-combinator kernel: `maybe`, `choice`,
//! `one_or_more`, `zero_or_more`, `keyword`. Every combinator either
//! succeeds having advanced the cursor, or fails having restored it —
//! failed attempts are never visible to the caller as a partially-advanced
//! cursor.

use crate::cursor::Cursor;
use crate::error::{Error, Failure, PResult};

/// Runs `p`; on failure, restores the cursor to the entry checkpoint and
/// yields `None` instead of propagating the failure.
pub(crate) fn maybe<'a, T>(
    cursor: &mut Cursor<'a>,
    p: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> Option<T> {
    let checkpoint = cursor.checkpoint();
    match p(cursor) {
        Ok(value) => Some(value),
        Err(_) => {
            cursor.restore(checkpoint);
            None
        }
    }
}

/// Matches a literal keyword/token; fails (without advancing the cursor)
/// if the input doesn't start with it.
pub(crate) fn keyword<'a>(cursor: &mut Cursor<'a>, literal: &str) -> PResult<()> {
    if cursor.starts_with(literal) {
        cursor.consume(literal.len());
        Ok(())
    } else {
        Err(Failure::new(
            Error::parse(format!("expected '{literal}'"), cursor.line()),
            cursor.pos(),
        ))
    }
}

/// Greedily applies `p` until it fails; the final, non-progressing
/// failure is absorbed rather than propagated, so `zero_or_more` always
/// succeeds (possibly with an empty result).
pub(crate) fn zero_or_more<'a, T>(
    cursor: &mut Cursor<'a>,
    mut p: impl FnMut(&mut Cursor<'a>) -> PResult<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    loop {
        let checkpoint = cursor.checkpoint();
        match p(cursor) {
            Ok(value) => out.push(value),
            Err(_) => {
                cursor.restore(checkpoint);
                break;
            }
        }
    }
    out
}

/// Like [`zero_or_more`], but requires at least one success.
pub(crate) fn one_or_more<'a, T>(
    cursor: &mut Cursor<'a>,
    mut p: impl FnMut(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<Vec<T>> {
    let first = p(cursor)?;
    let mut out = vec![first];
    out.extend(zero_or_more(cursor, p));
    Ok(out)
}

/// Picks which deepest-position failure survives a `choice` when every
/// alternative fails: ties are broken toward the alternative tried last.
pub(crate) fn deepest(current: Option<Failure>, candidate: Failure) -> Option<Failure> {
    match current {
        Some(existing) if existing.pos > candidate.pos => Some(existing),
        _ => Some(candidate),
    }
}

/// Tries each alternative in order; the first success wins. If every
/// alternative fails, the combinator fails at the entry checkpoint,
/// reporting the deepest-position failure seen (tie-break: last
/// encountered).
macro_rules! choice {
    ($cursor:expr, $($parser:expr),+ $(,)?) => {{
        let checkpoint = $cursor.checkpoint();
        let mut deepest_failure: Option<$crate::error::Failure> = None;
        let mut result = None;
        $(
            if result.is_none() {
                $cursor.restore(checkpoint);
                match ($parser)($cursor) {
                    Ok(value) => result = Some(value),
                    Err(failure) => {
                        deepest_failure = $crate::combinators::deepest(deepest_failure, failure);
                    }
                }
            }
        )+
        match result {
            Some(value) => Ok(value),
            None => {
                $cursor.restore(checkpoint);
                Err(deepest_failure.expect("choice! requires at least one alternative"))
            }
        }
    }};
}

pub(crate) use choice;
