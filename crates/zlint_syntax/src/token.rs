//! Token tags and the token list.
//!
//! The token list stores one `{tag, start offset}` pair per token. Token text
//! is recovered by re-lexing the single token at its start offset; the list
//! exists so span and lookahead queries never re-tokenize the whole file.

use zlint_errors::Span;

use crate::ids::TokenId;
use crate::lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Identifier,
    Builtin,
    NumberLiteral,
    StringLiteral,
    CharLiteral,

    KeywordAddrspace,
    KeywordAlign,
    KeywordAnd,
    KeywordAnytype,
    KeywordBreak,
    KeywordCatch,
    KeywordComptime,
    KeywordConst,
    KeywordContinue,
    KeywordDefer,
    KeywordElse,
    KeywordEnum,
    KeywordErrdefer,
    KeywordError,
    KeywordExport,
    KeywordExtern,
    KeywordFn,
    KeywordFor,
    KeywordIf,
    KeywordInline,
    KeywordLinksection,
    KeywordNoalias,
    KeywordOr,
    KeywordOrelse,
    KeywordPacked,
    KeywordPub,
    KeywordReturn,
    KeywordStruct,
    KeywordSwitch,
    KeywordTest,
    KeywordThreadlocal,
    KeywordTry,
    KeywordUnion,
    KeywordUnreachable,
    KeywordVar,
    KeywordWhile,

    Bang,
    BangEqual,
    Pipe,
    PipePipe,
    PipeEqual,
    Equal,
    EqualEqual,
    Arrow,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Period,
    PeriodAsterisk,
    Ellipsis2,
    Ellipsis3,
    QuestionMark,
    Ampersand,
    AmpersandEqual,
    Caret,
    CaretEqual,
    Tilde,
    Plus,
    PlusPlus,
    PlusEqual,
    Minus,
    MinusEqual,
    Asterisk,
    AsteriskAsterisk,
    AsteriskEqual,
    Slash,
    SlashEqual,
    Percent,
    PercentEqual,
    LessThan,
    LessLess,
    LessLessEqual,
    LessOrEqual,
    GreaterThan,
    GreaterGreater,
    GreaterGreaterEqual,
    GreaterOrEqual,

    Invalid,
    Eof,
}

impl TokenTag {
    pub fn keyword(ident: &str) -> Option<TokenTag> {
        use TokenTag::*;
        Some(match ident {
            "addrspace" => KeywordAddrspace,
            "align" => KeywordAlign,
            "and" => KeywordAnd,
            "anytype" => KeywordAnytype,
            "break" => KeywordBreak,
            "catch" => KeywordCatch,
            "comptime" => KeywordComptime,
            "const" => KeywordConst,
            "continue" => KeywordContinue,
            "defer" => KeywordDefer,
            "else" => KeywordElse,
            "enum" => KeywordEnum,
            "errdefer" => KeywordErrdefer,
            "error" => KeywordError,
            "export" => KeywordExport,
            "extern" => KeywordExtern,
            "fn" => KeywordFn,
            "for" => KeywordFor,
            "if" => KeywordIf,
            "inline" => KeywordInline,
            "linksection" => KeywordLinksection,
            "noalias" => KeywordNoalias,
            "or" => KeywordOr,
            "orelse" => KeywordOrelse,
            "packed" => KeywordPacked,
            "pub" => KeywordPub,
            "return" => KeywordReturn,
            "struct" => KeywordStruct,
            "switch" => KeywordSwitch,
            "test" => KeywordTest,
            "threadlocal" => KeywordThreadlocal,
            "try" => KeywordTry,
            "union" => KeywordUnion,
            "unreachable" => KeywordUnreachable,
            "var" => KeywordVar,
            "while" => KeywordWhile,
            _ => return None,
        })
    }

    /// A human-readable name for parse error messages.
    pub fn describe(self) -> &'static str {
        use TokenTag::*;
        match self {
            Identifier => "an identifier",
            Builtin => "a builtin",
            NumberLiteral => "a number literal",
            StringLiteral => "a string literal",
            CharLiteral => "a character literal",
            Bang => "`!`",
            BangEqual => "`!=`",
            Pipe => "`|`",
            PipePipe => "`||`",
            PipeEqual => "`|=`",
            Equal => "`=`",
            EqualEqual => "`==`",
            Arrow => "`=>`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            LBracket => "`[`",
            RBracket => "`]`",
            Semicolon => "`;`",
            Comma => "`,`",
            Colon => "`:`",
            Period => "`.`",
            PeriodAsterisk => "`.*`",
            Ellipsis2 => "`..`",
            Ellipsis3 => "`...`",
            QuestionMark => "`?`",
            Ampersand => "`&`",
            AmpersandEqual => "`&=`",
            Caret => "`^`",
            CaretEqual => "`^=`",
            Tilde => "`~`",
            Plus => "`+`",
            PlusPlus => "`++`",
            PlusEqual => "`+=`",
            Minus => "`-`",
            MinusEqual => "`-=`",
            Asterisk => "`*`",
            AsteriskAsterisk => "`**`",
            AsteriskEqual => "`*=`",
            Slash => "`/`",
            SlashEqual => "`/=`",
            Percent => "`%`",
            PercentEqual => "`%=`",
            LessThan => "`<`",
            LessLess => "`<<`",
            LessLessEqual => "`<<=`",
            LessOrEqual => "`<=`",
            GreaterThan => "`>`",
            GreaterGreater => "`>>`",
            GreaterGreaterEqual => "`>>=`",
            GreaterOrEqual => "`>=`",
            Invalid => "an invalid token",
            Eof => "the end of the file",
            _ => "a keyword",
        }
    }
}

/// Dense token storage: one tag and one byte offset per token.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tags: Vec<TokenTag>,
    starts: Vec<u32>,
}

impl TokenList {
    pub fn push(&mut self, tag: TokenTag, start: u32) {
        self.tags.push(tag);
        self.starts.push(start);
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tag(&self, token: TokenId) -> TokenTag {
        self.tags[token.index()]
    }

    pub fn start(&self, token: TokenId) -> u32 {
        self.starts[token.index()]
    }

    /// Tag at a raw index, or `Eof` when out of bounds. Bounded token
    /// back-scans in the full-node accessors lean on this.
    pub fn tag_at(&self, index: u32) -> TokenTag {
        self.tags
            .get(index as usize)
            .copied()
            .unwrap_or(TokenTag::Eof)
    }

    /// Byte span of a token, re-lexing just that token for its length.
    pub fn span(&self, source: &str, token: TokenId) -> Span {
        let start = self.start(token) as usize;
        let len = lexer::token_len(source, start);
        Span::from(start..start + len)
    }

    /// The token's text.
    pub fn slice<'s>(&self, source: &'s str, token: TokenId) -> &'s str {
        let span = self.span(source, token);
        &source[span.range()]
    }

    /// The first token starting at or after `offset`.
    pub fn first_at_or_after(&self, offset: u32) -> TokenId {
        let index = self.starts.partition_point(|&start| start < offset);
        TokenId::new(index as u32)
    }

    /// The token starting exactly at `offset`, which every node span does.
    pub fn at_offset(&self, offset: u32) -> Option<TokenId> {
        let index = self.starts.binary_search(&offset).ok()?;
        Some(TokenId::new(index as u32))
    }
}

/// A comment, kept out of the token stream but retained for rules that
/// inspect comment text adjacent to code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub span: Span,
    pub kind: CommentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `//` including `//!` container docs.
    Normal,
    /// `///` doc comments.
    Doc,
}
