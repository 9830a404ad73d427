//! Line bookkeeping over raw source text.

use crate::Span;

/// Byte offsets at which each line starts, including line 0 at offset 0.
pub fn line_starts(source: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(source.match_indices('\n').map(|(i, _)| i + 1))
}

/// Precomputed line-start table for offset to line/column translation.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            starts: line_starts(source).collect(),
        }
    }

    /// 1-based line and column for a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .starts
            .binary_search(&offset)
            .unwrap_or_else(|next| next - 1);
        (line + 1, offset - self.starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One line of source, as handed to per-line rule hooks.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Byte span of the line's content, excluding the terminator.
    pub span: Span,
    /// The content, without `\n` or `\r\n`.
    pub text: &'a str,
}

/// Iterate the lines of `source`, recognizing both `\n` and `\r\n` and
/// preserving byte offsets into the original buffer.
pub fn lines(source: &str) -> impl Iterator<Item = Line<'_>> {
    LinesIter {
        source,
        offset: 0,
        number: 0,
    }
}

struct LinesIter<'a> {
    source: &'a str,
    offset: usize,
    number: usize,
}

impl<'a> Iterator for LinesIter<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.source.len() {
            return None;
        }
        let rest = &self.source[self.offset..];
        let (content_len, terminator_len) = match rest.find('\n') {
            Some(nl) if nl > 0 && rest.as_bytes()[nl - 1] == b'\r' => (nl - 1, 2),
            Some(nl) => (nl, 1),
            None => (rest.len(), 0),
        };
        self.number += 1;
        let start = self.offset;
        let line = Line {
            number: self.number,
            span: Span::from(start..start + content_len),
            text: &rest[..content_len],
        };
        self.offset = start + content_len + terminator_len;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_offsets_across_crlf() {
        let src = "ab\r\ncd\nef";
        let collected: Vec<_> = lines(src).collect();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].text, "ab");
        assert_eq!(collected[0].span, Span::new(0, 2));
        assert_eq!(collected[1].text, "cd");
        assert_eq!(collected[1].span, Span::new(4, 6));
        assert_eq!(collected[2].text, "ef");
        assert_eq!(collected[2].span, Span::new(7, 9));
        assert_eq!(collected[2].number, 3);
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        let collected: Vec<_> = lines("a\n").collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].text, "a");
        assert!(lines("").next().is_none());
    }

    #[test]
    fn line_col_round_trip() {
        let index = LineIndex::new("one\ntwo\nthree");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (2, 1));
        assert_eq!(index.line_col(9), (3, 2));
    }
}
