//! The Zig tokenizer.
//!
//! Comments never enter the token stream; they are collected into a side
//! list so that byte-level helpers (doc lookups, safety-comment scans) can
//! find them without re-scanning the file.

use zlint_errors::Span;

use crate::token::{Comment, CommentKind, TokenList, TokenTag};

/// Tokenize a whole file.
pub fn tokenize(source: &str) -> (TokenList, Vec<Comment>) {
    let bytes = source.as_bytes();
    let mut tokens = TokenList::default();
    let mut comments = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let byte = bytes[offset];
        if byte == b' ' || byte == b'\t' || byte == b'\r' || byte == b'\n' {
            offset += 1;
            continue;
        }
        if byte == b'/' && bytes.get(offset + 1) == Some(&b'/') {
            let start = offset;
            while offset < bytes.len() && bytes[offset] != b'\n' {
                offset += 1;
            }
            let kind = if source[start..offset].starts_with("///") {
                CommentKind::Doc
            } else {
                CommentKind::Normal
            };
            comments.push(Comment {
                span: Span::from(start..offset),
                kind,
            });
            continue;
        }
        let (tag, end) = lex_one(source, offset);
        tokens.push(tag, offset as u32);
        offset = end;
    }

    tokens.push(TokenTag::Eof, bytes.len() as u32);
    (tokens, comments)
}

/// Byte length of the single token starting at `start`.
pub fn token_len(source: &str, start: usize) -> usize {
    if start >= source.len() {
        return 0;
    }
    let (_, end) = lex_one(source, start);
    end - start
}

fn is_ident_byte(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}

/// Lex exactly one token at `start`, which must not point at whitespace or a
/// comment. Returns the tag and the end offset.
fn lex_one(source: &str, start: usize) -> (TokenTag, usize) {
    let bytes = source.as_bytes();
    let mut i = start;
    let byte = bytes[i];

    macro_rules! one {
        ($tag:ident) => {
            return (TokenTag::$tag, i + 1)
        };
    }

    match byte {
        b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            let tag = TokenTag::keyword(&source[start..i]).unwrap_or(TokenTag::Identifier);
            (tag, i)
        }
        b'@' => {
            i += 1;
            match bytes.get(i) {
                Some(b'"') => {
                    let end = scan_string(bytes, i);
                    (TokenTag::Identifier, end)
                }
                Some(&b) if is_ident_byte(b) => {
                    while i < bytes.len() && is_ident_byte(bytes[i]) {
                        i += 1;
                    }
                    (TokenTag::Builtin, i)
                }
                _ => (TokenTag::Invalid, i),
            }
        }
        b'"' => (TokenTag::StringLiteral, scan_string(bytes, i)),
        b'\'' => (TokenTag::CharLiteral, scan_char(bytes, i)),
        b'0'..=b'9' => (TokenTag::NumberLiteral, scan_number(bytes, i)),
        b'=' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::EqualEqual, i + 2),
            Some(b'>') => (TokenTag::Arrow, i + 2),
            _ => one!(Equal),
        },
        b'!' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::BangEqual, i + 2),
            _ => one!(Bang),
        },
        b'|' => match bytes.get(i + 1) {
            Some(b'|') => (TokenTag::PipePipe, i + 2),
            Some(b'=') => (TokenTag::PipeEqual, i + 2),
            _ => one!(Pipe),
        },
        b'+' => match bytes.get(i + 1) {
            Some(b'+') => (TokenTag::PlusPlus, i + 2),
            Some(b'=') => (TokenTag::PlusEqual, i + 2),
            _ => one!(Plus),
        },
        b'-' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::MinusEqual, i + 2),
            _ => one!(Minus),
        },
        b'*' => match bytes.get(i + 1) {
            Some(b'*') => (TokenTag::AsteriskAsterisk, i + 2),
            Some(b'=') => (TokenTag::AsteriskEqual, i + 2),
            _ => one!(Asterisk),
        },
        b'/' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::SlashEqual, i + 2),
            _ => one!(Slash),
        },
        b'%' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::PercentEqual, i + 2),
            _ => one!(Percent),
        },
        b'&' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::AmpersandEqual, i + 2),
            _ => one!(Ampersand),
        },
        b'^' => match bytes.get(i + 1) {
            Some(b'=') => (TokenTag::CaretEqual, i + 2),
            _ => one!(Caret),
        },
        b'<' => match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'<'), Some(b'=')) => (TokenTag::LessLessEqual, i + 3),
            (Some(b'<'), _) => (TokenTag::LessLess, i + 2),
            (Some(b'='), _) => (TokenTag::LessOrEqual, i + 2),
            _ => one!(LessThan),
        },
        b'>' => match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'>'), Some(b'=')) => (TokenTag::GreaterGreaterEqual, i + 3),
            (Some(b'>'), _) => (TokenTag::GreaterGreater, i + 2),
            (Some(b'='), _) => (TokenTag::GreaterOrEqual, i + 2),
            _ => one!(GreaterThan),
        },
        b'.' => match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'.'), Some(b'.')) => (TokenTag::Ellipsis3, i + 3),
            (Some(b'.'), _) => (TokenTag::Ellipsis2, i + 2),
            (Some(b'*'), _) => (TokenTag::PeriodAsterisk, i + 2),
            _ => one!(Period),
        },
        b'(' => one!(LParen),
        b')' => one!(RParen),
        b'{' => one!(LBrace),
        b'}' => one!(RBrace),
        b'[' => one!(LBracket),
        b']' => one!(RBracket),
        b';' => one!(Semicolon),
        b',' => one!(Comma),
        b':' => one!(Colon),
        b'?' => one!(QuestionMark),
        b'~' => one!(Tilde),
        _ => one!(Invalid),
    }
}

/// Scan a `"`-delimited literal starting at its opening quote. Unterminated
/// strings end at the newline or EOF; the parser reports them.
fn scan_string(bytes: &[u8], quote: usize) -> usize {
    let mut i = quote + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return i + 1,
            b'\n' => return i,
            b'\\' => i += 2,
            _ => i += 1,
        }
    }
    i.min(bytes.len())
}

fn scan_char(bytes: &[u8], quote: usize) -> usize {
    let mut i = quote + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => return i + 1,
            b'\n' => return i,
            b'\\' => i += 2,
            _ => i += 1,
        }
    }
    i.min(bytes.len())
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        let byte = bytes[i];
        if is_ident_byte(byte) {
            i += 1;
        } else if byte == b'.' && bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit()) {
            // A digit after the dot makes this a float; `0..` is a range.
            i += 1;
        } else if (byte == b'+' || byte == b'-')
            && i > start
            && matches!(bytes[i - 1], b'e' | b'E' | b'p' | b'P')
        {
            i += 1;
        } else {
            break;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(source: &str) -> Vec<TokenTag> {
        let (tokens, _) = tokenize(source);
        (0..tokens.len())
            .map(|i| tokens.tag(crate::ids::TokenId::new(i as u32)))
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenTag::*;
        assert_eq!(
            tags("const x = try foo();"),
            vec![
                KeywordConst, Identifier, Equal, KeywordTry, Identifier, LParen, RParen,
                Semicolon, Eof
            ]
        );
    }

    #[test]
    fn compound_punctuation() {
        use TokenTag::*;
        assert_eq!(
            tags("a.* b.? c... d..e => |x| <<="),
            vec![
                Identifier, PeriodAsterisk, Identifier, Period, QuestionMark, Identifier,
                Ellipsis3, Identifier, Ellipsis2, Identifier, Arrow, Pipe, Identifier, Pipe,
                LessLessEqual, Eof
            ]
        );
    }

    #[test]
    fn comments_are_collected_not_tokenized() {
        let (tokens, comments) = tokenize("// note\n/// doc\nconst x = 1;");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kind, CommentKind::Normal);
        assert_eq!(comments[1].kind, CommentKind::Doc);
        assert_eq!(tokens.tag(crate::ids::TokenId::new(0)), TokenTag::KeywordConst);
    }

    #[test]
    fn annotation_keywords_lex_as_keywords() {
        use TokenTag::*;
        assert_eq!(
            tags("addrspace align linksection"),
            vec![KeywordAddrspace, KeywordAlign, KeywordLinksection, Eof]
        );
    }

    #[test]
    fn numbers_do_not_eat_ranges() {
        use TokenTag::*;
        assert_eq!(
            tags("0..2 1.5 0x1f"),
            vec![NumberLiteral, Ellipsis2, NumberLiteral, NumberLiteral, NumberLiteral, Eof]
        );
    }

    #[test]
    fn token_len_matches_tokenize() {
        let source = "const foo = \"bar\";";
        let (tokens, _) = tokenize(source);
        for i in 0..tokens.len() - 1 {
            let id = crate::ids::TokenId::new(i as u32);
            let span = tokens.span(source, id);
            assert!(!span.is_empty(), "token {} has an empty span", i);
        }
        assert_eq!(tokens.slice(source, crate::ids::TokenId::new(2)), "=");
        assert_eq!(tokens.slice(source, crate::ids::TokenId::new(3)), "\"bar\"");
    }
}
