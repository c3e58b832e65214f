//! Line-ending normalisation.

use tracing::trace;

use crate::error::FilterResult;
use crate::list::{Direction, Filter, FilterSource};

/// How much checking the CRLF filter does before converting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDetection {
    /// The path is declared text: always convert.
    Declared,
    /// Convert only content that looks like text.
    Auto,
}

/// Converts CRLF to LF on the way into storage and, when the working tree
/// wants CRLF, LF to CRLF on the way out.
#[derive(Clone, Debug)]
pub struct CrlfFilter {
    detection: TextDetection,
    crlf_worktree: bool,
}

impl CrlfFilter {
    pub fn new(detection: TextDetection, crlf_worktree: bool) -> Self {
        Self {
            detection,
            crlf_worktree,
        }
    }
}

impl Filter for CrlfFilter {
    fn name(&self) -> &str {
        "crlf"
    }

    fn apply(&self, source: &FilterSource, input: Vec<u8>) -> FilterResult<Vec<u8>> {
        if self.detection == TextDetection::Auto && !looks_like_text(&input) {
            trace!(path = %source.path, "crlf: content looks binary, skipping");
            return Ok(input);
        }
        let output = match source.direction {
            Direction::ToStore => crlf_to_lf(input),
            Direction::ToWorktree if self.crlf_worktree => lf_to_crlf(input),
            Direction::ToWorktree => input,
        };
        Ok(output)
    }
}

/// Heuristic used for auto text detection: no NUL bytes and no CR that is
/// not followed by LF.
pub fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    let mut bytes = data.iter().peekable();
    while let Some(&b) = bytes.next() {
        if b == b'\r' && bytes.peek() != Some(&&b'\n') {
            return false;
        }
    }
    true
}

/// Replace every CRLF pair with LF. Lone CRs are kept.
pub fn crlf_to_lf(input: Vec<u8>) -> Vec<u8> {
    if !input.windows(2).any(|w| w == b"\r\n") {
        return input;
    }
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'\r' && input.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        out.push(input[i]);
        i += 1;
    }
    out
}

/// Replace every bare LF with CRLF. Existing CRLF pairs are kept.
pub fn lf_to_crlf(input: Vec<u8>) -> Vec<u8> {
    let bare = input
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'\n' && (i == 0 || input[i - 1] != b'\r'))
        .count();
    if bare == 0 {
        return input;
    }
    let mut out = Vec::with_capacity(input.len() + bare);
    for (i, &b) in input.iter().enumerate() {
        if b == b'\n' && (i == 0 || input[i - 1] != b'\r') {
            out.push(b'\r');
        }
        out.push(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn to_store(filter: &CrlfFilter, data: &[u8]) -> Vec<u8> {
        let source = FilterSource::new("f.txt", Direction::ToStore);
        filter.apply(&source, data.to_vec()).unwrap()
    }

    fn to_worktree(filter: &CrlfFilter, data: &[u8]) -> Vec<u8> {
        let source = FilterSource::new("f.txt", Direction::ToWorktree);
        filter.apply(&source, data.to_vec()).unwrap()
    }

    #[test]
    fn normalises_crlf_on_the_way_in() {
        let filter = CrlfFilter::new(TextDetection::Auto, false);
        assert_eq!(to_store(&filter, b"line1\r\nline2\r\n"), b"line1\nline2\n");
        assert_eq!(to_store(&filter, b"already\n"), b"already\n");
    }

    #[test]
    fn auto_detection_leaves_binary_alone() {
        let filter = CrlfFilter::new(TextDetection::Auto, false);
        assert_eq!(to_store(&filter, b"a\r\n\0b\r\n"), b"a\r\n\0b\r\n");
        assert_eq!(to_store(&filter, b"old mac\rline\r\n"), b"old mac\rline\r\n");
    }

    #[test]
    fn declared_text_converts_regardless() {
        let filter = CrlfFilter::new(TextDetection::Declared, false);
        assert_eq!(to_store(&filter, b"a\r\n\0"), b"a\n\0");
    }

    #[test]
    fn worktree_gets_crlf_only_when_asked() {
        let crlf = CrlfFilter::new(TextDetection::Auto, true);
        assert_eq!(to_worktree(&crlf, b"a\nb\r\n"), b"a\r\nb\r\n");
        let lf = CrlfFilter::new(TextDetection::Auto, false);
        assert_eq!(to_worktree(&lf, b"a\nb\n"), b"a\nb\n");
    }

    #[test]
    fn text_heuristic() {
        assert!(looks_like_text(b"plain\r\ntext\n"));
        assert!(looks_like_text(b""));
        assert!(!looks_like_text(b"nul\0"));
        assert!(!looks_like_text(b"trailing cr\r"));
    }

    proptest! {
        #[test]
        fn normalised_text_has_no_crlf(lines in proptest::collection::vec("[a-z ]{0,12}", 0..8)) {
            let data = lines.join("\r\n").into_bytes();
            let out = crlf_to_lf(data);
            prop_assert!(!out.windows(2).any(|w| w == b"\r\n"));
            prop_assert_eq!(crlf_to_lf(lf_to_crlf(out.clone())), out);
        }
    }
}
