//! The recursive-descent Zig parser.
//!
//! The parser consumes the token list and produces the dense node arrays of
//! [`Ast`]. It recovers at declaration and statement boundaries: an error
//! inside one member is reported and the parser resynchronizes at the next
//! `;` or `}`, so one bad declaration does not hide the rest of the file's
//! errors. A file that produced any parse error has a structurally
//! unreliable tree and callers must treat it as failed.

use std::cell::Cell;

use zlint_errors::{Diagnostic, Span};

use crate::ast::{Ast, Node, NodeData, Tag};
use crate::ids::{NodeId, TokenId};
use crate::lexer;
use crate::token::{Comment, TokenList, TokenTag};

/// The parse artifact: tree, token list, comment list and parse errors.
#[derive(Debug, Clone)]
pub struct Parse {
    pub ast: Ast,
    pub tokens: TokenList,
    pub comments: Vec<Comment>,
    pub errors: Vec<Diagnostic>,
}

impl Parse {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a whole file.
pub fn parse(source: &str) -> Parse {
    let (tokens, comments) = lexer::tokenize(source);
    let mut parser = Parser {
        source,
        tokens,
        tok_i: 0,
        nodes: Vec::new(),
        spans: Vec::new(),
        extra_data: Vec::new(),
        errors: Vec::new(),
        steps: Cell::new(0),
        no_suffix_init: 0,
    };
    parser.parse_root();
    let Parser {
        tokens,
        nodes,
        spans,
        extra_data,
        errors,
        ..
    } = parser;
    Parse {
        ast: Ast {
            nodes,
            spans,
            extra_data,
        },
        tokens,
        comments,
        errors,
    }
}

struct ParseAbort;

type ParseResult<T> = Result<T, ParseAbort>;

struct Parser<'s> {
    source: &'s str,
    tokens: TokenList,
    tok_i: u32,
    nodes: Vec<Node>,
    spans: Vec<Span>,
    extra_data: Vec<u32>,
    errors: Vec<Diagnostic>,
    // Tracks whether the parser is looping without consuming input.
    steps: Cell<u32>,
    // Depth counter suppressing `T{...}` init suffixes where a `{` must
    // start a block (return types, loop and branch bodies).
    no_suffix_init: u32,
}

impl<'s> Parser<'s> {
    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn cur(&self) -> TokenTag {
        let steps = self.steps.get();
        assert!(
            steps <= 10_000_000,
            "the parser seems to be looping forever"
        );
        self.steps.set(steps + 1);
        self.tokens.tag_at(self.tok_i)
    }

    fn peek(&self, n: u32) -> TokenTag {
        self.tokens.tag_at(self.tok_i + n)
    }

    fn at(&self, tag: TokenTag) -> bool {
        self.cur() == tag
    }

    fn cur_token(&self) -> TokenId {
        TokenId::new(self.tok_i)
    }

    fn next(&mut self) -> TokenId {
        let token = self.cur_token();
        if self.cur() != TokenTag::Eof {
            self.tok_i += 1;
        }
        token
    }

    fn eat(&mut self, tag: TokenTag) -> Option<TokenId> {
        if self.at(tag) {
            Some(self.next())
        } else {
            None
        }
    }

    fn expect(&mut self, tag: TokenTag) -> ParseResult<TokenId> {
        if self.at(tag) {
            Ok(self.next())
        } else {
            self.error_here(format!(
                "expected {}, found {}",
                tag.describe(),
                self.cur().describe()
            ));
            Err(ParseAbort)
        }
    }

    fn token_end(&self, token: TokenId) -> u32 {
        let start = self.tokens.start(token);
        start + lexer::token_len(self.source, start as usize) as u32
    }

    fn token_span(&self, token: TokenId) -> Span {
        Span::new(self.tokens.start(token), self.token_end(token))
    }

    fn error_here(&mut self, message: String) {
        let span = self.token_span(self.cur_token());
        self.errors
            .push(Diagnostic::error("parse", message).primary(span, ""));
    }

    /// Skip to just past the next `;`, or to a closing `}`/EOF.
    fn sync(&mut self) {
        loop {
            match self.cur() {
                TokenTag::Semicolon => {
                    self.next();
                    return;
                }
                TokenTag::RBrace | TokenTag::Eof => return,
                _ => {
                    self.next();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Node plumbing
    // ------------------------------------------------------------------

    fn add_node(&mut self, tag: Tag, main_token: TokenId, lhs: u32, rhs: u32, start: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let prev = TokenId::new(self.tok_i.saturating_sub(1));
        let end = self.token_end(prev).max(start);
        self.nodes.push(Node {
            tag,
            main_token,
            data: NodeData { lhs, rhs },
        });
        self.spans.push(Span::new(start, end));
        id
    }

    fn node_start(&self, node: NodeId) -> u32 {
        self.spans[node.index()].start
    }

    fn token_start(&self, token: TokenId) -> u32 {
        self.tokens.start(token)
    }

    fn add_extra(&mut self, words: &[u32]) -> u32 {
        let index = self.extra_data.len() as u32;
        self.extra_data.extend_from_slice(words);
        index
    }

    fn add_node_list(&mut self, nodes: &[NodeId]) -> (u32, u32) {
        let start = self.extra_data.len() as u32;
        self.extra_data.extend(nodes.iter().map(|node| node.get()));
        (start, self.extra_data.len() as u32)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_root(&mut self) {
        // Node 0 is the root; reserve it before anything else so data words
        // can use 0 as the null child.
        self.nodes.push(Node {
            tag: Tag::Root,
            main_token: TokenId::new(0),
            data: NodeData::default(),
        });
        self.spans
            .push(Span::from(0..self.source.len()));

        let members = self.container_members();
        if !self.at(TokenTag::Eof) {
            self.error_here(format!(
                "expected a top-level declaration, found {}",
                self.cur().describe()
            ));
        }
        let (start, end) = self.add_node_list(&members);
        self.nodes[0].data = NodeData {
            lhs: start,
            rhs: end,
        };
    }

    fn container_members(&mut self) -> Vec<NodeId> {
        let mut members = Vec::new();
        loop {
            match self.cur() {
                TokenTag::Eof | TokenTag::RBrace => break,
                _ => {}
            }
            let before = self.tok_i;
            match self.container_member() {
                Ok(Some(member)) => members.push(member),
                Ok(None) => break,
                Err(ParseAbort) => self.sync(),
            }
            if self.tok_i == before {
                // Unconsumed garbage; report once and step over it.
                self.error_here(format!(
                    "expected a container member, found {}",
                    self.cur().describe()
                ));
                self.next();
            }
        }
        members
    }

    fn container_member(&mut self) -> ParseResult<Option<NodeId>> {
        match self.cur() {
            TokenTag::KeywordTest => self.test_decl().map(Some),
            TokenTag::KeywordComptime if self.peek(1) == TokenTag::LBrace => {
                let comptime_token = self.next();
                let block = self.block()?;
                let start = self.token_start(comptime_token);
                Ok(Some(self.add_node(
                    Tag::Comptime,
                    comptime_token,
                    block.get(),
                    0,
                    start,
                )))
            }
            TokenTag::KeywordComptime if self.peek(1) == TokenTag::Identifier => {
                // `comptime name: T` container field.
                self.next();
                self.container_field().map(Some)
            }
            TokenTag::KeywordPub
            | TokenTag::KeywordExtern
            | TokenTag::KeywordExport
            | TokenTag::KeywordInline
            | TokenTag::KeywordThreadlocal => {
                self.decl_modifiers();
                match self.cur() {
                    TokenTag::KeywordFn => self.fn_decl().map(Some),
                    TokenTag::KeywordConst | TokenTag::KeywordVar => self.var_decl().map(Some),
                    found => {
                        self.error_here(format!(
                            "expected a function or variable declaration, found {}",
                            found.describe()
                        ));
                        Err(ParseAbort)
                    }
                }
            }
            TokenTag::KeywordFn => self.fn_decl().map(Some),
            TokenTag::KeywordConst | TokenTag::KeywordVar => self.var_decl().map(Some),
            TokenTag::Identifier => self.container_field().map(Some),
            _ => Ok(None),
        }
    }

    fn decl_modifiers(&mut self) {
        loop {
            match self.cur() {
                TokenTag::KeywordPub
                | TokenTag::KeywordExport
                | TokenTag::KeywordInline
                | TokenTag::KeywordThreadlocal => {
                    self.next();
                }
                TokenTag::KeywordExtern => {
                    self.next();
                    // `extern "c"` carries a library name.
                    self.eat(TokenTag::StringLiteral);
                }
                _ => return,
            }
        }
    }

    fn test_decl(&mut self) -> ParseResult<NodeId> {
        let test_token = self.next();
        let name_token = match self.cur() {
            TokenTag::StringLiteral | TokenTag::Identifier => Some(self.next()),
            _ => None,
        };
        let body = self.block()?;
        let start = self.token_start(test_token);
        Ok(self.add_node(
            Tag::TestDecl,
            test_token,
            name_token.map_or(0, |token| token.get() + 1),
            body.get(),
            start,
        ))
    }

    fn fn_decl(&mut self) -> ParseResult<NodeId> {
        let fn_token = self.expect(TokenTag::KeywordFn)?;
        self.eat(TokenTag::Identifier);
        self.expect(TokenTag::LParen)?;

        let mut params = Vec::new();
        while !self.at(TokenTag::RParen) && !self.at(TokenTag::Eof) {
            match self.cur() {
                TokenTag::KeywordComptime | TokenTag::KeywordNoalias => {
                    self.next();
                }
                _ => {}
            }
            if self.at(TokenTag::Identifier) && self.peek(1) == TokenTag::Colon {
                self.next();
                self.next();
            }
            let type_expr = if self.at(TokenTag::KeywordAnytype) {
                let token = self.next();
                let start = self.token_start(token);
                self.add_node(Tag::Identifier, token, 0, 0, start)
            } else {
                self.type_expr()?
            };
            params.push(type_expr);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenTag::RParen)?;

        let align_expr = self.annotation(TokenTag::KeywordAlign)?;

        self.eat(TokenTag::Bang);
        self.no_suffix_init += 1;
        let return_type = self.type_expr();
        self.no_suffix_init -= 1;
        let return_type = return_type?;

        let start = self.token_start(fn_token);
        let proto = match (params.len(), align_expr) {
            (0, None) => self.add_node(Tag::FnProtoSimple, fn_token, 0, return_type.get(), start),
            (1, None) => self.add_node(
                Tag::FnProtoSimple,
                fn_token,
                params[0].get(),
                return_type.get(),
                start,
            ),
            (0..=1, Some(align)) => {
                let param = params.first().map_or(0, |node| node.get());
                let extra = self.add_extra(&[param, align.get(), 0]);
                self.add_node(Tag::FnProtoOne, fn_token, extra, return_type.get(), start)
            }
            (_, None) => {
                let (range_start, range_end) = self.add_node_list(&params);
                let extra = self.add_extra(&[range_start, range_end]);
                self.add_node(Tag::FnProtoMulti, fn_token, extra, return_type.get(), start)
            }
            (_, Some(align)) => {
                let (range_start, range_end) = self.add_node_list(&params);
                let extra = self.add_extra(&[range_start, range_end, align.get(), 0]);
                self.add_node(Tag::FnProto, fn_token, extra, return_type.get(), start)
            }
        };

        if self.at(TokenTag::LBrace) {
            let body = self.block()?;
            Ok(self.add_node(Tag::FnDecl, fn_token, proto.get(), body.get(), start))
        } else {
            self.expect(TokenTag::Semicolon)?;
            Ok(proto)
        }
    }

    fn var_decl(&mut self) -> ParseResult<NodeId> {
        let mut_token = self.next();
        let start = self.token_start(mut_token);
        self.expect(TokenTag::Identifier)?;

        if self.at(TokenTag::Comma) {
            return self.assign_destructure(mut_token);
        }

        let type_node = if self.eat(TokenTag::Colon).is_some() {
            Some(self.type_expr()?)
        } else {
            None
        };
        let align_node = self.annotation(TokenTag::KeywordAlign)?;
        let addrspace_node = self.annotation(TokenTag::KeywordAddrspace)?;
        let section_node = self.annotation(TokenTag::KeywordLinksection)?;
        let init_node = if self.eat(TokenTag::Equal).is_some() {
            Some(self.expr()?)
        } else {
            None
        };
        let init = init_node.map_or(0, NodeId::get);

        let node = if section_node.is_some() || addrspace_node.is_some() {
            let extra = self.add_extra(&[
                type_node.map_or(0, NodeId::get),
                align_node.map_or(0, NodeId::get),
                section_node.map_or(0, NodeId::get),
                addrspace_node.map_or(0, NodeId::get),
            ]);
            self.add_node(Tag::GlobalVarDecl, mut_token, extra, init, start)
        } else {
            match (type_node, align_node) {
                (type_node, None) => self.add_node(
                    Tag::SimpleVarDecl,
                    mut_token,
                    type_node.map_or(0, NodeId::get),
                    init,
                    start,
                ),
                (None, Some(align)) => {
                    self.add_node(Tag::AlignedVarDecl, mut_token, align.get(), init, start)
                }
                (Some(type_node), Some(align)) => {
                    let extra = self.add_extra(&[type_node.get(), align.get()]);
                    self.add_node(Tag::LocalVarDecl, mut_token, extra, init, start)
                }
            }
        };
        self.expect(TokenTag::Semicolon)?;
        Ok(node)
    }

    /// A `keyword(expr)` annotation such as `align(4)`, `addrspace(.flash)`
    /// or `linksection(".text")`.
    fn annotation(&mut self, keyword: TokenTag) -> ParseResult<Option<NodeId>> {
        if !self.at(keyword) {
            return Ok(None);
        }
        self.next();
        self.expect(TokenTag::LParen)?;
        let expr = self.expr()?;
        self.expect(TokenTag::RParen)?;
        Ok(Some(expr))
    }

    /// `const a, const b = value;` — each binding becomes its own variable
    /// declaration node listed in the destructure's subrange.
    fn assign_destructure(&mut self, first_mut: TokenId) -> ParseResult<NodeId> {
        let start = self.token_start(first_mut);
        let mut variables = vec![self.add_node(Tag::SimpleVarDecl, first_mut, 0, 0, start)];
        while self.eat(TokenTag::Comma).is_some() {
            let mut_token = match self.cur() {
                TokenTag::KeywordConst | TokenTag::KeywordVar => self.next(),
                found => {
                    self.error_here(format!(
                        "expected `const` or `var` in destructure, found {}",
                        found.describe()
                    ));
                    return Err(ParseAbort);
                }
            };
            let var_start = self.token_start(mut_token);
            self.expect(TokenTag::Identifier)?;
            variables.push(self.add_node(Tag::SimpleVarDecl, mut_token, 0, 0, var_start));
        }
        let equal_token = self.expect(TokenTag::Equal)?;
        let value = self.expr()?;
        let (range_start, range_end) = self.add_node_list(&variables);
        let extra = self.add_extra(&[range_start, range_end]);
        let node = self.add_node(Tag::AssignDestructure, equal_token, extra, value.get(), start);
        self.expect(TokenTag::Semicolon)?;
        Ok(node)
    }

    fn container_field(&mut self) -> ParseResult<NodeId> {
        let name_token = self.expect(TokenTag::Identifier)?;
        let start = self.token_start(name_token);

        let type_expr = if self.eat(TokenTag::Colon).is_some() {
            Some(self.type_expr()?)
        } else {
            None
        };
        let align_expr = self.annotation(TokenTag::KeywordAlign)?;
        let value_expr = if self.eat(TokenTag::Equal).is_some() {
            Some(self.expr()?)
        } else {
            None
        };

        let node = match (align_expr, value_expr) {
            (None, value) => self.add_node(
                Tag::ContainerFieldInit,
                name_token,
                type_expr.map_or(0, NodeId::get),
                value.map_or(0, NodeId::get),
                start,
            ),
            (Some(align), None) => self.add_node(
                Tag::ContainerFieldAlign,
                name_token,
                type_expr.map_or(0, NodeId::get),
                align.get(),
                start,
            ),
            (Some(align), Some(value)) => {
                let extra = self.add_extra(&[value.get(), align.get()]);
                self.add_node(
                    Tag::ContainerField,
                    name_token,
                    type_expr.map_or(0, NodeId::get),
                    extra,
                    start,
                )
            }
        };
        self.eat(TokenTag::Comma);
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> ParseResult<NodeId> {
        let lbrace = self.expect(TokenTag::LBrace)?;
        let start = self.token_start(lbrace);
        let mut statements = Vec::new();
        while !self.at(TokenTag::RBrace) && !self.at(TokenTag::Eof) {
            let before = self.tok_i;
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(ParseAbort) => self.sync(),
            }
            if self.tok_i == before {
                self.error_here(format!(
                    "expected a statement, found {}",
                    self.cur().describe()
                ));
                self.next();
            }
        }
        self.expect(TokenTag::RBrace)?;

        let node = match statements.len() {
            0 => self.add_node(Tag::BlockTwo, lbrace, 0, 0, start),
            1 => self.add_node(Tag::BlockTwo, lbrace, statements[0].get(), 0, start),
            2 => self.add_node(
                Tag::BlockTwo,
                lbrace,
                statements[0].get(),
                statements[1].get(),
                start,
            ),
            _ => {
                let (range_start, range_end) = self.add_node_list(&statements);
                self.add_node(Tag::Block, lbrace, range_start, range_end, start)
            }
        };
        Ok(node)
    }

    fn statement(&mut self) -> ParseResult<NodeId> {
        match self.cur() {
            TokenTag::KeywordConst | TokenTag::KeywordVar => self.var_decl(),
            TokenTag::KeywordComptime if self.peek(1) == TokenTag::LBrace => {
                let comptime_token = self.next();
                let block = self.block()?;
                let start = self.token_start(comptime_token);
                Ok(self.add_node(Tag::Comptime, comptime_token, block.get(), 0, start))
            }
            TokenTag::KeywordDefer => {
                let defer_token = self.next();
                let target = self.defer_target()?;
                let start = self.token_start(defer_token);
                Ok(self.add_node(Tag::Defer, defer_token, 0, target.get(), start))
            }
            TokenTag::KeywordErrdefer => {
                let errdefer_token = self.next();
                let payload = self.pipe_payload();
                let target = self.defer_target()?;
                let start = self.token_start(errdefer_token);
                Ok(self.add_node(
                    Tag::Errdefer,
                    errdefer_token,
                    payload.map_or(0, |token| token.get() + 1),
                    target.get(),
                    start,
                ))
            }
            TokenTag::KeywordIf => {
                let node = self.if_expr()?;
                self.eat(TokenTag::Semicolon);
                Ok(node)
            }
            TokenTag::KeywordWhile => {
                let node = self.while_expr()?;
                self.eat(TokenTag::Semicolon);
                Ok(node)
            }
            TokenTag::KeywordFor => {
                let node = self.for_expr()?;
                self.eat(TokenTag::Semicolon);
                Ok(node)
            }
            TokenTag::KeywordSwitch => {
                let node = self.switch_expr()?;
                self.eat(TokenTag::Semicolon);
                Ok(node)
            }
            TokenTag::KeywordReturn => {
                let return_token = self.next();
                let operand = if self.at(TokenTag::Semicolon) {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(TokenTag::Semicolon)?;
                let start = self.token_start(return_token);
                Ok(self.add_node(
                    Tag::Return,
                    return_token,
                    operand.map_or(0, NodeId::get),
                    0,
                    start,
                ))
            }
            TokenTag::KeywordBreak => {
                let break_token = self.next();
                let label = self.break_label()?;
                let operand = if self.at(TokenTag::Semicolon) {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(TokenTag::Semicolon)?;
                let start = self.token_start(break_token);
                Ok(self.add_node(
                    Tag::Break,
                    break_token,
                    label.map_or(0, |token| token.get() + 1),
                    operand.map_or(0, NodeId::get),
                    start,
                ))
            }
            TokenTag::KeywordContinue => {
                let continue_token = self.next();
                let label = self.break_label()?;
                self.expect(TokenTag::Semicolon)?;
                let start = self.token_start(continue_token);
                Ok(self.add_node(
                    Tag::Continue,
                    continue_token,
                    label.map_or(0, |token| token.get() + 1),
                    0,
                    start,
                ))
            }
            TokenTag::LBrace => self.block(),
            _ => {
                let lhs = self.expr()?;
                let node = if let Some(op_token) = self.eat_assign_op() {
                    let rhs = self.expr()?;
                    let start = self.node_start(lhs);
                    self.add_node(Tag::Assign, op_token, lhs.get(), rhs.get(), start)
                } else {
                    lhs
                };
                self.expect(TokenTag::Semicolon)?;
                Ok(node)
            }
        }
    }

    fn defer_target(&mut self) -> ParseResult<NodeId> {
        if self.at(TokenTag::LBrace) {
            self.block()
        } else {
            let expr = self.expr()?;
            self.expect(TokenTag::Semicolon)?;
            Ok(expr)
        }
    }

    fn break_label(&mut self) -> ParseResult<Option<TokenId>> {
        if self.eat(TokenTag::Colon).is_some() {
            Ok(Some(self.expect(TokenTag::Identifier)?))
        } else {
            Ok(None)
        }
    }

    fn eat_assign_op(&mut self) -> Option<TokenId> {
        use TokenTag::*;
        match self.cur() {
            Equal | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual
            | AmpersandEqual | PipeEqual | CaretEqual | LessLessEqual | GreaterGreaterEqual => {
                Some(self.next())
            }
            _ => None,
        }
    }

    /// `|x|` or `|*x|`; returns the payload identifier.
    fn pipe_payload(&mut self) -> Option<TokenId> {
        if !self.at(TokenTag::Pipe) {
            return None;
        }
        self.next();
        self.eat(TokenTag::Asterisk);
        let name = self.eat(TokenTag::Identifier);
        self.eat(TokenTag::Pipe);
        name
    }

    // ------------------------------------------------------------------
    // Control-flow expressions
    // ------------------------------------------------------------------

    fn if_expr(&mut self) -> ParseResult<NodeId> {
        let if_token = self.expect(TokenTag::KeywordIf)?;
        let start = self.token_start(if_token);
        self.expect(TokenTag::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenTag::RParen)?;
        self.pipe_payload();
        let then_expr = self.branch_expr()?;

        if self.eat(TokenTag::KeywordElse).is_some() {
            self.pipe_payload();
            let else_expr = self.branch_expr()?;
            let extra = self.add_extra(&[then_expr.get(), else_expr.get()]);
            Ok(self.add_node(Tag::If, if_token, cond.get(), extra, start))
        } else {
            Ok(self.add_node(Tag::IfSimple, if_token, cond.get(), then_expr.get(), start))
        }
    }

    fn while_expr(&mut self) -> ParseResult<NodeId> {
        let while_token = self.expect(TokenTag::KeywordWhile)?;
        let start = self.token_start(while_token);
        self.expect(TokenTag::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenTag::RParen)?;
        self.pipe_payload();

        let cont_expr = if self.eat(TokenTag::Colon).is_some() {
            self.expect(TokenTag::LParen)?;
            let expr = self.expr()?;
            let expr = if let Some(op_token) = self.eat_assign_op() {
                let rhs = self.expr()?;
                let expr_start = self.node_start(expr);
                self.add_node(Tag::Assign, op_token, expr.get(), rhs.get(), expr_start)
            } else {
                expr
            };
            self.expect(TokenTag::RParen)?;
            Some(expr)
        } else {
            None
        };

        let then_expr = self.branch_expr()?;
        let else_expr = if self.eat(TokenTag::KeywordElse).is_some() {
            self.pipe_payload();
            Some(self.branch_expr()?)
        } else {
            None
        };

        let node = match (cont_expr, else_expr) {
            (None, None) => self.add_node(
                Tag::WhileSimple,
                while_token,
                cond.get(),
                then_expr.get(),
                start,
            ),
            (Some(cont), None) => {
                let extra = self.add_extra(&[cont.get(), then_expr.get()]);
                self.add_node(Tag::WhileCont, while_token, cond.get(), extra, start)
            }
            (cont, Some(els)) => {
                let extra = self.add_extra(&[
                    cont.map_or(0, NodeId::get),
                    then_expr.get(),
                    els.get(),
                ]);
                self.add_node(Tag::While, while_token, cond.get(), extra, start)
            }
        };
        Ok(node)
    }

    fn for_expr(&mut self) -> ParseResult<NodeId> {
        let for_token = self.expect(TokenTag::KeywordFor)?;
        let start = self.token_start(for_token);
        self.expect(TokenTag::LParen)?;
        let mut inputs = Vec::new();
        loop {
            inputs.push(self.expr()?);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
            if self.at(TokenTag::RParen) {
                break;
            }
        }
        self.expect(TokenTag::RParen)?;

        // The capture list is mandatory: `for (items) |item|`.
        if self.at(TokenTag::Pipe) {
            self.next();
            loop {
                self.eat(TokenTag::Asterisk);
                if self.eat(TokenTag::Identifier).is_none() {
                    break;
                }
                if self.eat(TokenTag::Comma).is_none() {
                    break;
                }
            }
            self.eat(TokenTag::Pipe);
        } else {
            self.error_here("expected a `|capture|` list after `for (...)`".to_string());
            return Err(ParseAbort);
        }

        let then_expr = self.branch_expr()?;
        let else_expr = if self.eat(TokenTag::KeywordElse).is_some() {
            Some(self.branch_expr()?)
        } else {
            None
        };

        let node = if inputs.len() == 1 && else_expr.is_none() {
            self.add_node(
                Tag::ForSimple,
                for_token,
                inputs[0].get(),
                then_expr.get(),
                start,
            )
        } else {
            let (inputs_start, inputs_end) = self.add_node_list(&inputs);
            let extra = self.add_extra(&[
                inputs_start,
                inputs_end,
                then_expr.get(),
                else_expr.map_or(0, NodeId::get),
            ]);
            self.add_node(Tag::For, for_token, extra, 0, start)
        };
        Ok(node)
    }

    fn switch_expr(&mut self) -> ParseResult<NodeId> {
        let switch_token = self.expect(TokenTag::KeywordSwitch)?;
        let start = self.token_start(switch_token);
        self.expect(TokenTag::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenTag::RParen)?;
        self.expect(TokenTag::LBrace)?;

        let mut cases = Vec::new();
        while !self.at(TokenTag::RBrace) && !self.at(TokenTag::Eof) {
            let before = self.tok_i;
            match self.switch_case() {
                Ok(case) => cases.push(case),
                Err(ParseAbort) => self.sync(),
            }
            self.eat(TokenTag::Comma);
            if self.tok_i == before {
                self.next();
            }
        }
        self.expect(TokenTag::RBrace)?;

        let (range_start, range_end) = self.add_node_list(&cases);
        let extra = self.add_extra(&[range_start, range_end]);
        Ok(self.add_node(Tag::Switch, switch_token, cond.get(), extra, start))
    }

    fn switch_case(&mut self) -> ParseResult<NodeId> {
        let inline_token = self.eat(TokenTag::KeywordInline);
        let mut values = Vec::new();
        let start_token = self.cur_token();

        if self.eat(TokenTag::KeywordElse).is_none() {
            loop {
                let item = self.expr()?;
                let item = if self.at(TokenTag::Ellipsis3) {
                    let ellipsis = self.next();
                    let end = self.expr()?;
                    let item_start = self.node_start(item);
                    self.add_node(Tag::SwitchRange, ellipsis, item.get(), end.get(), item_start)
                } else {
                    item
                };
                values.push(item);
                if self.eat(TokenTag::Comma).is_none() {
                    break;
                }
                if self.at(TokenTag::Arrow) {
                    break;
                }
            }
        }

        let arrow_token = self.expect(TokenTag::Arrow)?;
        self.pipe_payload();
        let target = self.branch_expr()?;

        let start = self
            .tokens
            .start(inline_token.unwrap_or(start_token));
        let inline = inline_token.is_some();
        let node = match values.len() {
            0 => self.add_node(
                if inline {
                    Tag::SwitchCaseInlineOne
                } else {
                    Tag::SwitchCaseOne
                },
                arrow_token,
                0,
                target.get(),
                start,
            ),
            1 => self.add_node(
                if inline {
                    Tag::SwitchCaseInlineOne
                } else {
                    Tag::SwitchCaseOne
                },
                arrow_token,
                values[0].get(),
                target.get(),
                start,
            ),
            _ => {
                let (range_start, range_end) = self.add_node_list(&values);
                let extra = self.add_extra(&[range_start, range_end]);
                self.add_node(
                    if inline {
                        Tag::SwitchCaseInline
                    } else {
                        Tag::SwitchCase
                    },
                    arrow_token,
                    extra,
                    target.get(),
                    start,
                )
            }
        };
        Ok(node)
    }

    /// A loop/branch body: a block, or an expression with `T{...}` init
    /// suffixes suppressed so a following `{` reads as a block.
    fn branch_expr(&mut self) -> ParseResult<NodeId> {
        if self.at(TokenTag::LBrace) {
            return self.block();
        }
        self.no_suffix_init += 1;
        let result = self.expr();
        self.no_suffix_init -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) -> ParseResult<NodeId> {
        self.binary_expr(0)
    }

    fn type_expr(&mut self) -> ParseResult<NodeId> {
        // Types are expressions; `!` binds them into error unions.
        self.binary_expr(0)
    }

    fn binary_expr(&mut self, min_prec: u8) -> ParseResult<NodeId> {
        let mut lhs = self.prefix_expr()?;
        loop {
            let (prec, tag) = match binop(self.cur()) {
                Some(entry) => entry,
                None => break,
            };
            if prec < min_prec {
                break;
            }
            let op_token = self.next();
            if tag == Tag::Catch {
                self.pipe_payload();
            }
            let rhs = self.binary_expr(prec + 1)?;
            let start = self.node_start(lhs);
            lhs = self.add_node(tag, op_token, lhs.get(), rhs.get(), start);
        }
        Ok(lhs)
    }

    fn prefix_expr(&mut self) -> ParseResult<NodeId> {
        match self.cur() {
            TokenTag::KeywordTry => self.prefix_node(Tag::Try),
            TokenTag::KeywordComptime => self.prefix_node(Tag::Comptime),
            TokenTag::Minus => self.prefix_node(Tag::Negation),
            TokenTag::Bang => self.prefix_node(Tag::BoolNot),
            TokenTag::Tilde => self.prefix_node(Tag::BitNot),
            TokenTag::Ampersand => self.prefix_node(Tag::AddressOf),
            TokenTag::QuestionMark => self.prefix_node(Tag::OptionalType),
            TokenTag::Asterisk => {
                let asterisk = self.next();
                let start = self.token_start(asterisk);
                self.ptr_type(asterisk, None, start)
            }
            TokenTag::LBracket => self.array_or_slice_type(),
            _ => self.suffix_expr(),
        }
    }

    fn prefix_node(&mut self, tag: Tag) -> ParseResult<NodeId> {
        let op_token = self.next();
        let start = self.token_start(op_token);
        let operand = self.prefix_expr()?;
        Ok(self.add_node(tag, op_token, operand.get(), 0, start))
    }

    /// `[]T`, `[*]T`, `[:s]T`, `[N]T`, `[N:s]T`.
    fn array_or_slice_type(&mut self) -> ParseResult<NodeId> {
        let lbracket = self.next();
        let start = self.token_start(lbracket);
        match self.cur() {
            TokenTag::RBracket => {
                self.next();
                self.ptr_type(lbracket, None, start)
            }
            TokenTag::Asterisk if self.peek(1) == TokenTag::RBracket => {
                self.next();
                self.next();
                self.ptr_type(lbracket, None, start)
            }
            TokenTag::Colon => {
                self.next();
                let sentinel = self.expr()?;
                self.expect(TokenTag::RBracket)?;
                self.ptr_type(lbracket, Some(sentinel), start)
            }
            _ => {
                let len = self.expr()?;
                if self.eat(TokenTag::Colon).is_some() {
                    let sentinel = self.expr()?;
                    self.expect(TokenTag::RBracket)?;
                    let elem = self.prefix_expr()?;
                    let extra = self.add_extra(&[sentinel.get(), elem.get()]);
                    Ok(self.add_node(
                        Tag::ArrayTypeSentinel,
                        lbracket,
                        len.get(),
                        extra,
                        start,
                    ))
                } else {
                    self.expect(TokenTag::RBracket)?;
                    let elem = self.prefix_expr()?;
                    Ok(self.add_node(Tag::ArrayType, lbracket, len.get(), elem.get(), start))
                }
            }
        }
    }

    /// The modifier run and child type shared by every pointer/slice
    /// shape. `align(a)`, `align(a:b:c)` bit ranges, `addrspace(...)` and
    /// `const` may appear between the sigil and the child type; which
    /// annotations are present picks the tag.
    fn ptr_type(
        &mut self,
        sigil: TokenId,
        sentinel: Option<NodeId>,
        start: u32,
    ) -> ParseResult<NodeId> {
        let mut align = None;
        let mut addrspace = None;
        let mut bit_range = None;
        loop {
            match self.cur() {
                TokenTag::KeywordAlign => {
                    self.next();
                    self.expect(TokenTag::LParen)?;
                    align = Some(self.expr()?);
                    if self.eat(TokenTag::Colon).is_some() {
                        let range_start = self.expr()?;
                        self.expect(TokenTag::Colon)?;
                        let range_end = self.expr()?;
                        bit_range = Some((range_start, range_end));
                    }
                    self.expect(TokenTag::RParen)?;
                }
                TokenTag::KeywordAddrspace => {
                    self.next();
                    self.expect(TokenTag::LParen)?;
                    addrspace = Some(self.expr()?);
                    self.expect(TokenTag::RParen)?;
                }
                TokenTag::KeywordConst => {
                    self.next();
                }
                _ => break,
            }
        }
        let child = self.prefix_expr()?;

        let node = if let Some((range_start, range_end)) = bit_range {
            let extra = self.add_extra(&[
                sentinel.map_or(0, NodeId::get),
                align.map_or(0, NodeId::get),
                range_start.get(),
                range_end.get(),
            ]);
            self.add_node(Tag::PtrTypeBitRange, sigil, extra, child.get(), start)
        } else if addrspace.is_some() || (sentinel.is_some() && align.is_some()) {
            let extra = self.add_extra(&[
                sentinel.map_or(0, NodeId::get),
                align.map_or(0, NodeId::get),
                addrspace.map_or(0, NodeId::get),
            ]);
            self.add_node(Tag::PtrType, sigil, extra, child.get(), start)
        } else if let Some(sentinel) = sentinel {
            self.add_node(
                Tag::PtrTypeSentinel,
                sigil,
                sentinel.get(),
                child.get(),
                start,
            )
        } else {
            self.add_node(
                Tag::PtrTypeAligned,
                sigil,
                align.map_or(0, NodeId::get),
                child.get(),
                start,
            )
        };
        Ok(node)
    }

    fn suffix_expr(&mut self) -> ParseResult<NodeId> {
        let mut node = self.primary_expr()?;
        loop {
            match self.cur() {
                TokenTag::Period => match self.peek(1) {
                    TokenTag::Identifier => {
                        let period = self.next();
                        let name = self.next();
                        let start = self.node_start(node);
                        node = self.add_node(
                            Tag::FieldAccess,
                            period,
                            node.get(),
                            name.get(),
                            start,
                        );
                    }
                    TokenTag::QuestionMark => {
                        let period = self.next();
                        let question = self.next();
                        let start = self.node_start(node);
                        node = self.add_node(
                            Tag::UnwrapOptional,
                            period,
                            node.get(),
                            question.get(),
                            start,
                        );
                    }
                    _ => break,
                },
                TokenTag::PeriodAsterisk => {
                    let token = self.next();
                    let start = self.node_start(node);
                    node = self.add_node(Tag::Deref, token, node.get(), 0, start);
                }
                TokenTag::LParen => {
                    node = self.call(node)?;
                }
                TokenTag::LBracket => {
                    node = self.index_or_slice(node)?;
                }
                TokenTag::LBrace if self.no_suffix_init == 0 => {
                    node = self.typed_init(node)?;
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn call(&mut self, callee: NodeId) -> ParseResult<NodeId> {
        let lparen = self.next();
        let start = self.node_start(callee);
        let mut args = Vec::new();
        while !self.at(TokenTag::RParen) && !self.at(TokenTag::Eof) {
            args.push(self.expr()?);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenTag::RParen)?;
        let node = match args.len() {
            0 => self.add_node(Tag::CallOne, lparen, callee.get(), 0, start),
            1 => self.add_node(Tag::CallOne, lparen, callee.get(), args[0].get(), start),
            _ => {
                let (range_start, range_end) = self.add_node_list(&args);
                let extra = self.add_extra(&[range_start, range_end]);
                self.add_node(Tag::Call, lparen, callee.get(), extra, start)
            }
        };
        Ok(node)
    }

    fn index_or_slice(&mut self, target: NodeId) -> ParseResult<NodeId> {
        let lbracket = self.next();
        let start = self.node_start(target);
        let index = self.expr()?;
        if self.eat(TokenTag::Ellipsis2).is_some() {
            if self.eat(TokenTag::RBracket).is_some() {
                return Ok(self.add_node(
                    Tag::SliceOpen,
                    lbracket,
                    target.get(),
                    index.get(),
                    start,
                ));
            }
            let end = self.expr()?;
            if self.eat(TokenTag::Colon).is_some() {
                let sentinel = self.expr()?;
                self.expect(TokenTag::RBracket)?;
                let extra = self.add_extra(&[index.get(), end.get(), sentinel.get()]);
                return Ok(self.add_node(
                    Tag::SliceSentinel,
                    lbracket,
                    target.get(),
                    extra,
                    start,
                ));
            }
            self.expect(TokenTag::RBracket)?;
            let extra = self.add_extra(&[index.get(), end.get()]);
            return Ok(self.add_node(Tag::Slice, lbracket, target.get(), extra, start));
        }
        self.expect(TokenTag::RBracket)?;
        Ok(self.add_node(
            Tag::ArrayAccess,
            lbracket,
            target.get(),
            index.get(),
            start,
        ))
    }

    /// `T{...}` with the type expression already parsed.
    fn typed_init(&mut self, type_expr: NodeId) -> ParseResult<NodeId> {
        let lbrace = self.next();
        let start = self.node_start(type_expr);
        let is_struct = self.at(TokenTag::RBrace)
            || (self.at(TokenTag::Period) && self.peek(1) == TokenTag::Identifier);
        if is_struct {
            let fields = self.struct_init_fields()?;
            let node = match fields.len() {
                0 => self.add_node(Tag::StructInitOne, lbrace, type_expr.get(), 0, start),
                1 => self.add_node(
                    Tag::StructInitOne,
                    lbrace,
                    type_expr.get(),
                    fields[0].get(),
                    start,
                ),
                _ => {
                    let (range_start, range_end) = self.add_node_list(&fields);
                    let extra = self.add_extra(&[range_start, range_end]);
                    self.add_node(Tag::StructInit, lbrace, type_expr.get(), extra, start)
                }
            };
            Ok(node)
        } else {
            let elements = self.array_init_elements()?;
            let node = match elements.len() {
                0 => self.add_node(Tag::ArrayInitOne, lbrace, type_expr.get(), 0, start),
                1 => self.add_node(
                    Tag::ArrayInitOne,
                    lbrace,
                    type_expr.get(),
                    elements[0].get(),
                    start,
                ),
                _ => {
                    let (range_start, range_end) = self.add_node_list(&elements);
                    let extra = self.add_extra(&[range_start, range_end]);
                    self.add_node(Tag::ArrayInit, lbrace, type_expr.get(), extra, start)
                }
            };
            Ok(node)
        }
    }

    /// `.{...}` anonymous initializer; the leading `.` is already known.
    fn anon_init(&mut self) -> ParseResult<NodeId> {
        let period = self.next();
        let lbrace = self.expect(TokenTag::LBrace)?;
        let start = self.token_start(period);
        let is_struct = self.at(TokenTag::RBrace)
            || (self.at(TokenTag::Period) && self.peek(1) == TokenTag::Identifier);
        if is_struct {
            let fields = self.struct_init_fields()?;
            let node = match fields.len() {
                0 => self.add_node(Tag::StructInitDotTwo, lbrace, 0, 0, start),
                1 => self.add_node(Tag::StructInitDotTwo, lbrace, fields[0].get(), 0, start),
                2 => self.add_node(
                    Tag::StructInitDotTwo,
                    lbrace,
                    fields[0].get(),
                    fields[1].get(),
                    start,
                ),
                _ => {
                    let (range_start, range_end) = self.add_node_list(&fields);
                    self.add_node(Tag::StructInitDot, lbrace, range_start, range_end, start)
                }
            };
            Ok(node)
        } else {
            let elements = self.array_init_elements()?;
            let node = match elements.len() {
                0 => self.add_node(Tag::ArrayInitDotTwo, lbrace, 0, 0, start),
                1 => self.add_node(Tag::ArrayInitDotTwo, lbrace, elements[0].get(), 0, start),
                2 => self.add_node(
                    Tag::ArrayInitDotTwo,
                    lbrace,
                    elements[0].get(),
                    elements[1].get(),
                    start,
                ),
                _ => {
                    let (range_start, range_end) = self.add_node_list(&elements);
                    self.add_node(Tag::ArrayInitDot, lbrace, range_start, range_end, start)
                }
            };
            Ok(node)
        }
    }

    /// `.name = value` list up to the closing brace. The nodes are the
    /// value expressions; field names live in the tokens before each.
    fn struct_init_fields(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut fields = Vec::new();
        while !self.at(TokenTag::RBrace) && !self.at(TokenTag::Eof) {
            self.expect(TokenTag::Period)?;
            self.expect(TokenTag::Identifier)?;
            self.expect(TokenTag::Equal)?;
            fields.push(self.expr()?);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenTag::RBrace)?;
        Ok(fields)
    }

    fn array_init_elements(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut elements = Vec::new();
        while !self.at(TokenTag::RBrace) && !self.at(TokenTag::Eof) {
            elements.push(self.expr()?);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenTag::RBrace)?;
        Ok(elements)
    }

    fn primary_expr(&mut self) -> ParseResult<NodeId> {
        match self.cur() {
            TokenTag::Identifier | TokenTag::KeywordAnytype => {
                let token = self.next();
                let start = self.token_start(token);
                Ok(self.add_node(Tag::Identifier, token, 0, 0, start))
            }
            TokenTag::NumberLiteral => self.atom(Tag::NumberLiteral),
            TokenTag::StringLiteral => self.atom(Tag::StringLiteral),
            TokenTag::CharLiteral => self.atom(Tag::CharLiteral),
            TokenTag::KeywordUnreachable => self.atom(Tag::UnreachableLiteral),
            TokenTag::Builtin => self.builtin_call(),
            TokenTag::LParen => {
                let lparen = self.next();
                let start = self.token_start(lparen);
                let inner = self.expr()?;
                let rparen = self.expect(TokenTag::RParen)?;
                Ok(self.add_node(
                    Tag::GroupedExpression,
                    lparen,
                    inner.get(),
                    rparen.get(),
                    start,
                ))
            }
            TokenTag::LBrace => self.block(),
            TokenTag::KeywordError => self.error_set_or_value(),
            TokenTag::Period => match self.peek(1) {
                TokenTag::LBrace => self.anon_init(),
                TokenTag::Identifier => {
                    let period = self.next();
                    let start = self.token_start(period);
                    self.next();
                    Ok(self.add_node(Tag::EnumLiteral, period, 0, 0, start))
                }
                found => {
                    self.error_here(format!(
                        "expected an enum literal or initializer after `.`, found {}",
                        found.describe()
                    ));
                    Err(ParseAbort)
                }
            },
            TokenTag::KeywordStruct
            | TokenTag::KeywordEnum
            | TokenTag::KeywordUnion
            | TokenTag::KeywordPacked => self.container_decl_expr(),
            TokenTag::KeywordExtern
                if matches!(
                    self.peek(1),
                    TokenTag::KeywordStruct | TokenTag::KeywordEnum | TokenTag::KeywordUnion
                ) =>
            {
                self.container_decl_expr()
            }
            TokenTag::KeywordIf => self.if_expr(),
            TokenTag::KeywordSwitch => self.switch_expr(),
            TokenTag::KeywordReturn => {
                let return_token = self.next();
                let start = self.token_start(return_token);
                let operand = if can_start_expr(self.cur()) {
                    Some(self.expr()?)
                } else {
                    None
                };
                Ok(self.add_node(
                    Tag::Return,
                    return_token,
                    operand.map_or(0, NodeId::get),
                    0,
                    start,
                ))
            }
            TokenTag::KeywordBreak => {
                let break_token = self.next();
                let start = self.token_start(break_token);
                let label = self.break_label()?;
                let operand = if can_start_expr(self.cur()) {
                    Some(self.expr()?)
                } else {
                    None
                };
                Ok(self.add_node(
                    Tag::Break,
                    break_token,
                    label.map_or(0, |token| token.get() + 1),
                    operand.map_or(0, NodeId::get),
                    start,
                ))
            }
            TokenTag::KeywordContinue => {
                let continue_token = self.next();
                let start = self.token_start(continue_token);
                let label = self.break_label()?;
                Ok(self.add_node(
                    Tag::Continue,
                    continue_token,
                    label.map_or(0, |token| token.get() + 1),
                    0,
                    start,
                ))
            }
            found => {
                self.error_here(format!("expected an expression, found {}", found.describe()));
                Err(ParseAbort)
            }
        }
    }

    fn atom(&mut self, tag: Tag) -> ParseResult<NodeId> {
        let token = self.next();
        let start = self.token_start(token);
        Ok(self.add_node(tag, token, 0, 0, start))
    }

    fn builtin_call(&mut self) -> ParseResult<NodeId> {
        let builtin_token = self.next();
        let start = self.token_start(builtin_token);
        self.expect(TokenTag::LParen)?;
        let mut args = Vec::new();
        while !self.at(TokenTag::RParen) && !self.at(TokenTag::Eof) {
            args.push(self.expr()?);
            if self.eat(TokenTag::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenTag::RParen)?;
        let node = match args.len() {
            0 => self.add_node(Tag::BuiltinCallTwo, builtin_token, 0, 0, start),
            1 => self.add_node(Tag::BuiltinCallTwo, builtin_token, args[0].get(), 0, start),
            2 => self.add_node(
                Tag::BuiltinCallTwo,
                builtin_token,
                args[0].get(),
                args[1].get(),
                start,
            ),
            _ => {
                let (range_start, range_end) = self.add_node_list(&args);
                self.add_node(Tag::BuiltinCall, builtin_token, range_start, range_end, start)
            }
        };
        Ok(node)
    }

    fn error_set_or_value(&mut self) -> ParseResult<NodeId> {
        let error_token = self.next();
        let start = self.token_start(error_token);
        if self.at(TokenTag::LBrace) {
            self.next();
            while self.eat(TokenTag::Identifier).is_some() {
                if self.eat(TokenTag::Comma).is_none() {
                    break;
                }
            }
            let rbrace = self.expect(TokenTag::RBrace)?;
            Ok(self.add_node(Tag::ErrorSetDecl, error_token, 0, rbrace.get(), start))
        } else {
            self.expect(TokenTag::Period)?;
            let name = self.expect(TokenTag::Identifier)?;
            Ok(self.add_node(Tag::ErrorValue, error_token, 0, name.get(), start))
        }
    }

    fn container_decl_expr(&mut self) -> ParseResult<NodeId> {
        // Layout modifier, recovered later by token scan.
        if matches!(self.cur(), TokenTag::KeywordPacked | TokenTag::KeywordExtern) {
            self.next();
        }
        let kind_token = match self.cur() {
            TokenTag::KeywordStruct | TokenTag::KeywordEnum | TokenTag::KeywordUnion => self.next(),
            found => {
                self.error_here(format!(
                    "expected a container keyword, found {}",
                    found.describe()
                ));
                return Err(ParseAbort);
            }
        };
        let start = self.token_start(kind_token);
        let is_union = self.tokens.tag(kind_token) == TokenTag::KeywordUnion;

        let mut tagged = false;
        let mut arg = None;
        if self.at(TokenTag::LParen) {
            self.next();
            if is_union && self.at(TokenTag::KeywordEnum) {
                self.next();
                tagged = true;
            } else {
                arg = Some(self.expr()?);
            }
            self.expect(TokenTag::RParen)?;
        }

        self.expect(TokenTag::LBrace)?;
        let members = self.container_members();
        self.expect(TokenTag::RBrace)?;

        let node = if let Some(arg) = arg {
            let (range_start, range_end) = self.add_node_list(&members);
            let extra = self.add_extra(&[range_start, range_end]);
            self.add_node(Tag::ContainerDeclArg, kind_token, arg.get(), extra, start)
        } else {
            let (two, many) = if tagged {
                (Tag::TaggedUnionTwo, Tag::TaggedUnion)
            } else {
                (Tag::ContainerDeclTwo, Tag::ContainerDecl)
            };
            match members.len() {
                0 => self.add_node(two, kind_token, 0, 0, start),
                1 => self.add_node(two, kind_token, members[0].get(), 0, start),
                2 => self.add_node(two, kind_token, members[0].get(), members[1].get(), start),
                _ => {
                    let (range_start, range_end) = self.add_node_list(&members);
                    self.add_node(many, kind_token, range_start, range_end, start)
                }
            }
        };
        Ok(node)
    }
}

/// Whether `tag` can begin an expression; decides if `return`/`break` in
/// expression position take an operand.
fn can_start_expr(tag: TokenTag) -> bool {
    use TokenTag::*;
    matches!(
        tag,
        Identifier
            | Builtin
            | NumberLiteral
            | StringLiteral
            | CharLiteral
            | KeywordAnytype
            | KeywordUnreachable
            | KeywordTry
            | KeywordComptime
            | KeywordIf
            | KeywordSwitch
            | KeywordError
            | KeywordStruct
            | KeywordEnum
            | KeywordUnion
            | KeywordPacked
            | KeywordReturn
            | KeywordBreak
            | KeywordContinue
            | LParen
            | LBrace
            | LBracket
            | Period
            | Minus
            | Bang
            | Tilde
            | Ampersand
            | QuestionMark
            | Asterisk
    )
}

fn binop(tag: TokenTag) -> Option<(u8, Tag)> {
    use TokenTag::*;
    Some(match tag {
        KeywordOr => (10, Tag::BoolOr),
        KeywordAnd => (20, Tag::BoolAnd),
        EqualEqual => (30, Tag::EqualEqual),
        BangEqual => (30, Tag::BangEqual),
        LessThan => (30, Tag::LessThan),
        GreaterThan => (30, Tag::GreaterThan),
        LessOrEqual => (30, Tag::LessOrEqual),
        GreaterOrEqual => (30, Tag::GreaterOrEqual),
        Ampersand => (40, Tag::BitAnd),
        Caret => (40, Tag::BitXor),
        Pipe => (40, Tag::BitOr),
        KeywordOrelse => (40, Tag::Orelse),
        KeywordCatch => (40, Tag::Catch),
        PipePipe => (40, Tag::MergeErrorSets),
        LessLess => (50, Tag::Shl),
        GreaterGreater => (50, Tag::Shr),
        Plus => (60, Tag::Add),
        Minus => (60, Tag::Sub),
        PlusPlus => (60, Tag::ArrayCat),
        Asterisk => (70, Tag::Mul),
        Slash => (70, Tag::Div),
        Percent => (70, Tag::Mod),
        AsteriskAsterisk => (70, Tag::ArrayMult),
        Bang => (80, Tag::ErrorUnion),
        _ => return None,
    })
}
