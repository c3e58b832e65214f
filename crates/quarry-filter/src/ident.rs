//! `$Id$` keyword handling.

use crate::error::FilterResult;
use crate::list::{Direction, Filter, FilterSource};

const KEYWORD: &[u8] = b"$Id";

/// Collapses `$Id: ... $` to `$Id$` on the way into storage and expands
/// `$Id$` to `$Id: <blob id> $` on the way out.
///
/// Expansion needs the blob id of the content being checked out; without
/// one the content is left as it is. Binary content is never touched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentFilter;

impl Filter for IdentFilter {
    fn name(&self) -> &str {
        "ident"
    }

    fn apply(&self, source: &FilterSource, input: Vec<u8>) -> FilterResult<Vec<u8>> {
        if input.contains(&0) || !contains(&input, KEYWORD) {
            return Ok(input);
        }
        Ok(match (source.direction, source.object_id) {
            (Direction::ToStore, _) => collapse(&input),
            (Direction::ToWorktree, Some(id)) => expand(&input, &id.to_hex()),
            (Direction::ToWorktree, None) => input,
        })
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn collapse(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(b"$Id:") {
            let rest = &input[i + 4..];
            let end = rest.iter().position(|&b| b == b'$' || b == b'\n');
            if let Some(end) = end.filter(|&e| rest[e] == b'$') {
                out.extend_from_slice(b"$Id$");
                i += 4 + end + 1;
                continue;
            }
        }
        out.push(input[i]);
        i += 1;
    }
    out
}

fn expand(input: &[u8], hex: &str) -> Vec<u8> {
    let replacement = format!("$Id: {hex} $");
    let mut out = Vec::with_capacity(input.len() + replacement.len());
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(b"$Id$") {
            out.extend_from_slice(replacement.as_bytes());
            i += 4;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_crypto::ContentHasher;

    #[test]
    fn collapses_expanded_keyword() {
        let source = FilterSource::new("a.c", Direction::ToStore);
        let out = IdentFilter
            .apply(&source, b"/* $Id: 0123abcd $ */\n".to_vec())
            .unwrap();
        assert_eq!(out, b"/* $Id$ */\n");
    }

    #[test]
    fn unterminated_keyword_is_kept() {
        let source = FilterSource::new("a.c", Direction::ToStore);
        let input = b"$Id: no end\n$".to_vec();
        assert_eq!(IdentFilter.apply(&source, input.clone()).unwrap(), input);
    }

    #[test]
    fn expands_with_blob_id() {
        let id = ContentHasher::BLOB.hash(b"x");
        let source = FilterSource::new("a.c", Direction::ToWorktree).with_object_id(id);
        let out = IdentFilter.apply(&source, b"v $Id$".to_vec()).unwrap();
        assert_eq!(out, format!("v $Id: {} $", id.to_hex()).into_bytes());
    }

    #[test]
    fn expansion_without_id_is_noop() {
        let source = FilterSource::new("a.c", Direction::ToWorktree);
        let out = IdentFilter.apply(&source, b"$Id$".to_vec()).unwrap();
        assert_eq!(out, b"$Id$");
    }

    #[test]
    fn expand_then_collapse_restores_content() {
        let id = ContentHasher::BLOB.hash(b"y");
        let out_src = FilterSource::new("f", Direction::ToWorktree).with_object_id(id);
        let in_src = FilterSource::new("f", Direction::ToStore);
        let original = b"a $Id$ b $Id$".to_vec();
        let expanded = IdentFilter.apply(&out_src, original.clone()).unwrap();
        assert_eq!(IdentFilter.apply(&in_src, expanded).unwrap(), original);
    }
}
