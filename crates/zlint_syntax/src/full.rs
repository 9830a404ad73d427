//! Canonical "full" views over families of AST tags.
//!
//! Several surface shapes collapse into one canonical struct (four fn-proto
//! tags into [`FullFnProto`], eight struct-init tags into [`FullStructInit`],
//! and so on). Full structs hold only node and token indices. Payload, name
//! and modifier tokens that the parser does not materialize as nodes are
//! recovered with bounded scans over the token list, anchored at a token
//! whose position is known exactly.

use crate::ast::{
    ArrayTypeSentinelData, Ast, ContainerFieldData, FnProtoData, FnProtoOneData,
    GlobalVarDeclData, IfData, LocalVarDeclData, PtrTypeBitRangeData, PtrTypeData, SliceData,
    SliceSentinelData, SubRange, Tag, WhileContData, WhileData,
};
use crate::ids::{NodeId, TokenId};
use crate::token::{TokenList, TokenTag};

/// A set of child nodes referenced by a full node: none, one or two inline
/// data words, or a range of the extra pool.
#[derive(Debug, Clone, Copy)]
pub enum NodeRange {
    Empty,
    One(NodeId),
    Two(NodeId, NodeId),
    Extra { start: u32, end: u32 },
}

impl NodeRange {
    /// Normalize inline data words, dropping null slots.
    pub fn of_two(a: NodeId, b: NodeId) -> NodeRange {
        match (a.non_null(), b.non_null()) {
            (Some(a), Some(b)) => NodeRange::Two(a, b),
            (Some(a), None) => NodeRange::One(a),
            (None, Some(b)) => NodeRange::One(b),
            (None, None) => NodeRange::Empty,
        }
    }

    pub fn of_one(a: NodeId) -> NodeRange {
        match a.non_null() {
            Some(a) => NodeRange::One(a),
            None => NodeRange::Empty,
        }
    }

    pub fn len(&self, _ast: &Ast) -> usize {
        match self {
            NodeRange::Empty => 0,
            NodeRange::One(_) => 1,
            NodeRange::Two(..) => 2,
            NodeRange::Extra { start, end } => (end - start) as usize,
        }
    }

    pub fn iter<'a>(&self, ast: &'a Ast) -> NodeRangeIter<'a> {
        NodeRangeIter {
            ast,
            range: *self,
            index: 0,
        }
    }

    pub fn first(&self, ast: &Ast) -> Option<NodeId> {
        self.iter(ast).next()
    }
}

pub struct NodeRangeIter<'a> {
    ast: &'a Ast,
    range: NodeRange,
    index: u32,
}

impl<'a> Iterator for NodeRangeIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = match self.range {
            NodeRange::Empty => None,
            NodeRange::One(a) => [a].get(self.index as usize).copied(),
            NodeRange::Two(a, b) => [a, b].get(self.index as usize).copied(),
            NodeRange::Extra { start, end } => {
                if start + self.index < end {
                    Some(NodeId::new(
                        self.ast.extra_data[(start + self.index) as usize],
                    ))
                } else {
                    None
                }
            }
        };
        if next.is_some() {
            self.index += 1;
        }
        next
    }
}

/// First token of a node, via its span. Node spans start at token starts by
/// construction, so the exact lookup cannot fail for parser-produced nodes.
pub fn first_token_of(ast: &Ast, tokens: &TokenList, node: NodeId) -> TokenId {
    let start = ast.span(node).start;
    tokens
        .at_offset(start)
        .unwrap_or_else(|| tokens.first_at_or_after(start))
}

/// `|payload|` immediately after `anchor`: returns the payload identifier.
fn payload_after(tokens: &TokenList, anchor: TokenId) -> Option<TokenId> {
    let i = anchor.get();
    if tokens.tag_at(i + 1) != TokenTag::Pipe {
        return None;
    }
    match tokens.tag_at(i + 2) {
        TokenTag::Asterisk if tokens.tag_at(i + 3) == TokenTag::Identifier => {
            Some(TokenId::new(i + 3))
        }
        TokenTag::Identifier => Some(TokenId::new(i + 2)),
        _ => None,
    }
}

/// `|payload|` ending immediately before the token at `first`: returns the
/// payload identifier. Used for `else |err|` branches.
fn payload_before(tokens: &TokenList, first: TokenId) -> Option<TokenId> {
    let i = first.get();
    if i >= 3
        && tokens.tag_at(i - 1) == TokenTag::Pipe
        && tokens.tag_at(i - 2) == TokenTag::Identifier
        && tokens.tag_at(i - 3) == TokenTag::Pipe
    {
        Some(TokenId::new(i - 2))
    } else {
        None
    }
}

/// The `)` closing the parenthesized expression that ends at `end_offset`.
fn rparen_after(tokens: &TokenList, end_offset: u32) -> TokenId {
    tokens.first_at_or_after(end_offset)
}

/// Declaration modifier tokens gathered by scanning backwards from the
/// keyword at `from`.
#[derive(Debug, Clone, Copy, Default)]
struct DeclModifiers {
    visib_token: Option<TokenId>,
    extern_export_token: Option<TokenId>,
    threadlocal_token: Option<TokenId>,
    comptime_token: Option<TokenId>,
}

fn scan_modifiers(tokens: &TokenList, from: TokenId) -> DeclModifiers {
    let mut modifiers = DeclModifiers::default();
    let mut i = from.get();
    while i > 0 {
        i -= 1;
        match tokens.tag_at(i) {
            TokenTag::KeywordPub => modifiers.visib_token = Some(TokenId::new(i)),
            TokenTag::KeywordExtern | TokenTag::KeywordExport => {
                modifiers.extern_export_token = Some(TokenId::new(i))
            }
            TokenTag::KeywordThreadlocal => modifiers.threadlocal_token = Some(TokenId::new(i)),
            TokenTag::KeywordComptime => modifiers.comptime_token = Some(TokenId::new(i)),
            // `extern "c"` carries a lib name string.
            TokenTag::StringLiteral | TokenTag::KeywordInline => {}
            _ => break,
        }
    }
    modifiers
}

#[derive(Debug, Clone, Copy)]
pub struct FullVarDecl {
    pub visib_token: Option<TokenId>,
    pub extern_export_token: Option<TokenId>,
    pub threadlocal_token: Option<TokenId>,
    pub comptime_token: Option<TokenId>,
    /// The `const` or `var` keyword.
    pub mut_token: TokenId,
    pub type_node: NodeId,
    pub align_node: NodeId,
    pub addrspace_node: NodeId,
    pub section_node: NodeId,
    pub init_node: NodeId,
}

impl FullVarDecl {
    pub fn name_token(&self) -> TokenId {
        TokenId::new(self.mut_token.get() + 1)
    }

    pub fn is_const(&self, tokens: &TokenList) -> bool {
        tokens.tag(self.mut_token) == TokenTag::KeywordConst
    }

    pub fn is_pub(&self) -> bool {
        self.visib_token.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FullFnProto {
    pub visib_token: Option<TokenId>,
    pub extern_export_token: Option<TokenId>,
    pub fn_token: TokenId,
    pub name_token: Option<TokenId>,
    pub params: NodeRange,
    pub align_expr: NodeId,
    pub callconv_expr: NodeId,
    pub return_type: NodeId,
}

impl FullFnProto {
    /// The `!` of an inferred error set return type, if present.
    pub fn bang_token(&self, ast: &Ast, tokens: &TokenList) -> Option<TokenId> {
        let first = first_token_of(ast, tokens, self.return_type.non_null()?);
        if first.get() > 0 && tokens.tag_at(first.get() - 1) == TokenTag::Bang {
            Some(TokenId::new(first.get() - 1))
        } else {
            None
        }
    }

    /// Whether the declared return type can carry errors: either an
    /// explicit error union or a `!`-prefixed inferred error set.
    pub fn returns_errors(&self, ast: &Ast, tokens: &TokenList) -> bool {
        if self.bang_token(ast, tokens).is_some() {
            return true;
        }
        match self.return_type.non_null() {
            Some(node) => ast.tag(node) == Tag::ErrorUnion,
            None => false,
        }
    }

    pub fn iter_params<'a>(&self, ast: &'a Ast, tokens: &'a TokenList) -> FnParamIter<'a> {
        FnParamIter {
            ast,
            tokens,
            inner: self.params.iter(ast),
        }
    }
}

/// One function parameter, synthesized from a type node plus the tokens
/// directly before it (the parser creates no per-parameter node).
#[derive(Debug, Clone, Copy)]
pub struct FnParam {
    pub comptime_noalias_token: Option<TokenId>,
    pub name_token: Option<TokenId>,
    pub type_expr: NodeId,
}

impl FnParam {
    /// `anytype` parameters surface as an identifier node over the keyword.
    pub fn is_anytype(&self, ast: &Ast, tokens: &TokenList) -> bool {
        ast.tag(self.type_expr) == Tag::Identifier
            && tokens.tag(ast.main_token(self.type_expr)) == TokenTag::KeywordAnytype
    }
}

pub struct FnParamIter<'a> {
    ast: &'a Ast,
    tokens: &'a TokenList,
    inner: NodeRangeIter<'a>,
}

impl<'a> Iterator for FnParamIter<'a> {
    type Item = FnParam;

    fn next(&mut self) -> Option<FnParam> {
        let type_expr = self.inner.next()?;
        let first = first_token_of(self.ast, self.tokens, type_expr).get();
        let mut name_token = None;
        let mut comptime_noalias_token = None;
        if first >= 2
            && self.tokens.tag_at(first - 1) == TokenTag::Colon
            && self.tokens.tag_at(first - 2) == TokenTag::Identifier
        {
            name_token = Some(TokenId::new(first - 2));
            if first >= 3 {
                match self.tokens.tag_at(first - 3) {
                    TokenTag::KeywordComptime | TokenTag::KeywordNoalias => {
                        comptime_noalias_token = Some(TokenId::new(first - 3));
                    }
                    _ => {}
                }
            }
        }
        Some(FnParam {
            comptime_noalias_token,
            name_token,
            type_expr,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FullIf {
    pub if_token: TokenId,
    pub cond_expr: NodeId,
    pub payload_token: Option<TokenId>,
    pub error_token: Option<TokenId>,
    pub then_expr: NodeId,
    pub else_expr: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullWhile {
    pub while_token: TokenId,
    pub cond_expr: NodeId,
    pub payload_token: Option<TokenId>,
    pub error_token: Option<TokenId>,
    pub cont_expr: NodeId,
    pub then_expr: NodeId,
    pub else_expr: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullFor {
    pub for_token: TokenId,
    pub inputs: NodeRange,
    pub payload_token: Option<TokenId>,
    pub then_expr: NodeId,
    pub else_expr: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullContainerDecl {
    pub layout_token: Option<TokenId>,
    /// The `struct`/`enum`/`union` keyword.
    pub main_token: TokenId,
    pub arg: NodeId,
    pub members: NodeRange,
}

impl FullContainerDecl {
    pub fn kind_tag(&self, tokens: &TokenList) -> TokenTag {
        tokens.tag(self.main_token)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FullContainerField {
    pub comptime_token: Option<TokenId>,
    pub name_token: TokenId,
    pub type_expr: NodeId,
    pub align_expr: NodeId,
    pub value_expr: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullSwitchCase {
    pub inline_token: Option<TokenId>,
    /// Empty for an `else` case.
    pub values: NodeRange,
    pub arrow_token: TokenId,
    pub payload_token: Option<TokenId>,
    pub target_expr: NodeId,
}

impl FullSwitchCase {
    pub fn is_else(&self, ast: &Ast) -> bool {
        self.values.first(ast).is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FullCall {
    pub fn_expr: NodeId,
    pub lparen: TokenId,
    pub params: NodeRange,
}

#[derive(Debug, Clone, Copy)]
pub struct FullStructInit {
    /// Null for anonymous `.{}` initializers.
    pub type_expr: NodeId,
    pub fields: NodeRange,
}

#[derive(Debug, Clone, Copy)]
pub struct FullArrayInit {
    pub type_expr: NodeId,
    pub elements: NodeRange,
}

#[derive(Debug, Clone, Copy)]
pub struct FullArrayType {
    pub lbracket: TokenId,
    pub elem_count: NodeId,
    pub sentinel: NodeId,
    pub elem_type: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullPtrType {
    /// `*` or `[` of the pointer/slice sigil.
    pub main_token: TokenId,
    pub const_token: Option<TokenId>,
    pub align_node: NodeId,
    pub addrspace_node: NodeId,
    pub sentinel: NodeId,
    pub bit_range: Option<(NodeId, NodeId)>,
    pub child_type: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullSlice {
    pub sliced: NodeId,
    pub lbracket: TokenId,
    pub start: NodeId,
    pub end: NodeId,
    pub sentinel: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FullAssignDestructure {
    pub variables: NodeRange,
    pub value: NodeId,
}

/// A canonicalized node, one variant per full kind.
#[derive(Debug, Clone, Copy)]
pub enum FullNode {
    VarDecl(FullVarDecl),
    AssignDestructure(FullAssignDestructure),
    If(FullIf),
    While(FullWhile),
    For(FullFor),
    FnProto(FullFnProto),
    ContainerField(FullContainerField),
    StructInit(FullStructInit),
    ArrayInit(FullArrayInit),
    ArrayType(FullArrayType),
    PtrType(FullPtrType),
    Slice(FullSlice),
    ContainerDecl(FullContainerDecl),
    SwitchCase(FullSwitchCase),
    Call(FullCall),
}

/// Canonicalize `node` if its tag belongs to a full family.
pub fn full_node(ast: &Ast, tokens: &TokenList, node: NodeId) -> Option<FullNode> {
    use Tag::*;
    let full = match ast.tag(node) {
        SimpleVarDecl | AlignedVarDecl | LocalVarDecl | GlobalVarDecl => {
            FullNode::VarDecl(full_var_decl(ast, tokens, node))
        }
        AssignDestructure => {
            let data = ast.data(node);
            let range: SubRange = ast.extra(data.lhs);
            FullNode::AssignDestructure(FullAssignDestructure {
                variables: NodeRange::Extra {
                    start: range.start,
                    end: range.end,
                },
                value: data.rhs_node(),
            })
        }
        IfSimple | If => FullNode::If(full_if(ast, tokens, node)),
        WhileSimple | WhileCont | While => FullNode::While(full_while(ast, tokens, node)),
        ForSimple | For => FullNode::For(full_for(ast, tokens, node)),
        FnProtoSimple | FnProtoMulti | FnProtoOne | FnProto => {
            FullNode::FnProto(full_fn_proto(ast, tokens, node)?)
        }
        ContainerFieldInit | ContainerFieldAlign | ContainerField => {
            FullNode::ContainerField(full_container_field(ast, tokens, node))
        }
        StructInitOne | StructInitOneComma | StructInitDotTwo | StructInitDotTwoComma
        | StructInitDot | StructInitDotComma | StructInit | StructInitComma => {
            FullNode::StructInit(full_struct_init(ast, node))
        }
        ArrayInitOne | ArrayInitOneComma | ArrayInitDotTwo | ArrayInitDotTwoComma
        | ArrayInitDot | ArrayInitDotComma | ArrayInit | ArrayInitComma => {
            FullNode::ArrayInit(full_array_init(ast, node))
        }
        ArrayType | ArrayTypeSentinel => FullNode::ArrayType(full_array_type(ast, node)),
        PtrTypeAligned | PtrTypeSentinel | PtrType | PtrTypeBitRange => {
            FullNode::PtrType(full_ptr_type(ast, tokens, node))
        }
        SliceOpen | Slice | SliceSentinel => FullNode::Slice(full_slice(ast, node)),
        ContainerDeclTwo | ContainerDeclTwoTrailing | ContainerDecl | ContainerDeclTrailing
        | ContainerDeclArg | ContainerDeclArgTrailing | TaggedUnionTwo
        | TaggedUnionTwoTrailing | TaggedUnion | TaggedUnionTrailing => {
            FullNode::ContainerDecl(full_container_decl(ast, tokens, node))
        }
        SwitchCaseOne | SwitchCaseInlineOne | SwitchCase | SwitchCaseInline => {
            FullNode::SwitchCase(full_switch_case(ast, tokens, node))
        }
        CallOne | CallOneComma | Call | CallComma => FullNode::Call(full_call(ast, node)),
        _ => return None,
    };
    Some(full)
}

pub fn full_var_decl(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullVarDecl {
    let data = ast.data(node);
    let mut_token = ast.main_token(node);
    let modifiers = scan_modifiers(tokens, mut_token);
    let (type_node, align_node, addrspace_node, section_node) = match ast.tag(node) {
        Tag::SimpleVarDecl => (data.lhs_node(), NodeId::NULL, NodeId::NULL, NodeId::NULL),
        Tag::AlignedVarDecl => (NodeId::NULL, data.lhs_node(), NodeId::NULL, NodeId::NULL),
        Tag::LocalVarDecl => {
            let extra: LocalVarDeclData = ast.extra(data.lhs);
            (
                NodeId::new(extra.type_node),
                NodeId::new(extra.align_node),
                NodeId::NULL,
                NodeId::NULL,
            )
        }
        Tag::GlobalVarDecl => {
            let extra: GlobalVarDeclData = ast.extra(data.lhs);
            (
                NodeId::new(extra.type_node),
                NodeId::new(extra.align_node),
                NodeId::new(extra.addrspace_node),
                NodeId::new(extra.section_node),
            )
        }
        tag => unreachable!("not a var decl tag: {:?}", tag),
    };
    FullVarDecl {
        visib_token: modifiers.visib_token,
        extern_export_token: modifiers.extern_export_token,
        threadlocal_token: modifiers.threadlocal_token,
        comptime_token: modifiers.comptime_token,
        mut_token,
        type_node,
        align_node,
        addrspace_node,
        section_node,
        init_node: data.rhs_node(),
    }
}

pub fn full_fn_proto(ast: &Ast, tokens: &TokenList, node: NodeId) -> Option<FullFnProto> {
    let node = match ast.tag(node) {
        Tag::FnDecl => ast.data(node).lhs_node(),
        _ => node,
    };
    let data = ast.data(node);
    let (params, align_expr, callconv_expr) = match ast.tag(node) {
        Tag::FnProtoSimple => (NodeRange::of_one(data.lhs_node()), NodeId::NULL, NodeId::NULL),
        Tag::FnProtoMulti => {
            let range: SubRange = ast.extra(data.lhs);
            (
                NodeRange::Extra {
                    start: range.start,
                    end: range.end,
                },
                NodeId::NULL,
                NodeId::NULL,
            )
        }
        Tag::FnProtoOne => {
            let extra: FnProtoOneData = ast.extra(data.lhs);
            (
                NodeRange::of_one(NodeId::new(extra.param)),
                NodeId::new(extra.align_expr),
                NodeId::new(extra.callconv_expr),
            )
        }
        Tag::FnProto => {
            let extra: FnProtoData = ast.extra(data.lhs);
            (
                NodeRange::Extra {
                    start: extra.params_start,
                    end: extra.params_end,
                },
                NodeId::new(extra.align_expr),
                NodeId::new(extra.callconv_expr),
            )
        }
        _ => return None,
    };
    let fn_token = ast.main_token(node);
    let modifiers = scan_modifiers(tokens, fn_token);
    let name_token = if tokens.tag_at(fn_token.get() + 1) == TokenTag::Identifier {
        Some(TokenId::new(fn_token.get() + 1))
    } else {
        None
    };
    Some(FullFnProto {
        visib_token: modifiers.visib_token,
        extern_export_token: modifiers.extern_export_token,
        fn_token,
        name_token,
        params,
        align_expr,
        callconv_expr,
        return_type: data.rhs_node(),
    })
}

pub fn full_if(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullIf {
    let data = ast.data(node);
    let cond_expr = data.lhs_node();
    let (then_expr, else_expr) = match ast.tag(node) {
        Tag::IfSimple => (data.rhs_node(), NodeId::NULL),
        Tag::If => {
            let extra: IfData = ast.extra(data.rhs);
            (NodeId::new(extra.then_expr), NodeId::new(extra.else_expr))
        }
        tag => unreachable!("not an if tag: {:?}", tag),
    };
    let rparen = rparen_after(tokens, ast.span(cond_expr).end);
    let error_token = else_expr
        .non_null()
        .and_then(|els| payload_before(tokens, first_token_of(ast, tokens, els)));
    FullIf {
        if_token: ast.main_token(node),
        cond_expr,
        payload_token: payload_after(tokens, rparen),
        error_token,
        then_expr,
        else_expr,
    }
}

pub fn full_while(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullWhile {
    let data = ast.data(node);
    let cond_expr = data.lhs_node();
    let (cont_expr, then_expr, else_expr) = match ast.tag(node) {
        Tag::WhileSimple => (NodeId::NULL, data.rhs_node(), NodeId::NULL),
        Tag::WhileCont => {
            let extra: WhileContData = ast.extra(data.rhs);
            (
                NodeId::new(extra.cont_expr),
                NodeId::new(extra.then_expr),
                NodeId::NULL,
            )
        }
        Tag::While => {
            let extra: WhileData = ast.extra(data.rhs);
            (
                NodeId::new(extra.cont_expr),
                NodeId::new(extra.then_expr),
                NodeId::new(extra.else_expr),
            )
        }
        tag => unreachable!("not a while tag: {:?}", tag),
    };
    let rparen = rparen_after(tokens, ast.span(cond_expr).end);
    let error_token = else_expr
        .non_null()
        .and_then(|els| payload_before(tokens, first_token_of(ast, tokens, els)));
    FullWhile {
        while_token: ast.main_token(node),
        cond_expr,
        payload_token: payload_after(tokens, rparen),
        error_token,
        cont_expr,
        then_expr,
        else_expr,
    }
}

pub fn full_for(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullFor {
    let data = ast.data(node);
    let (inputs, then_expr, else_expr) = match ast.tag(node) {
        Tag::ForSimple => (NodeRange::of_one(data.lhs_node()), data.rhs_node(), NodeId::NULL),
        Tag::For => {
            let extra: crate::ast::ForData = ast.extra(data.lhs);
            (
                NodeRange::Extra {
                    start: extra.inputs_start,
                    end: extra.inputs_end,
                },
                NodeId::new(extra.then_expr),
                NodeId::new(extra.else_expr),
            )
        }
        tag => unreachable!("not a for tag: {:?}", tag),
    };
    let payload_token = inputs
        .iter(ast)
        .last()
        .map(|last| rparen_after(tokens, ast.span(last).end))
        .and_then(|rparen| payload_after(tokens, rparen));
    FullFor {
        for_token: ast.main_token(node),
        inputs,
        payload_token,
        then_expr,
        else_expr,
    }
}

pub fn full_container_decl(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullContainerDecl {
    use Tag::*;
    let data = ast.data(node);
    let (arg, members) = match ast.tag(node) {
        ContainerDeclTwo | ContainerDeclTwoTrailing | TaggedUnionTwo | TaggedUnionTwoTrailing => {
            (NodeId::NULL, NodeRange::of_two(data.lhs_node(), data.rhs_node()))
        }
        ContainerDecl | ContainerDeclTrailing | TaggedUnion | TaggedUnionTrailing => (
            NodeId::NULL,
            NodeRange::Extra {
                start: data.lhs,
                end: data.rhs,
            },
        ),
        ContainerDeclArg | ContainerDeclArgTrailing => {
            let range: SubRange = ast.extra(data.rhs);
            (
                data.lhs_node(),
                NodeRange::Extra {
                    start: range.start,
                    end: range.end,
                },
            )
        }
        tag => unreachable!("not a container decl tag: {:?}", tag),
    };
    let main_token = ast.main_token(node);
    let layout_token = match main_token.get() {
        0 => None,
        i => match tokens.tag_at(i - 1) {
            TokenTag::KeywordPacked | TokenTag::KeywordExtern => Some(TokenId::new(i - 1)),
            _ => None,
        },
    };
    FullContainerDecl {
        layout_token,
        main_token,
        arg,
        members,
    }
}

pub fn full_container_field(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullContainerField {
    let data = ast.data(node);
    let (type_expr, align_expr, value_expr) = match ast.tag(node) {
        Tag::ContainerFieldInit => (data.lhs_node(), NodeId::NULL, data.rhs_node()),
        Tag::ContainerFieldAlign => (data.lhs_node(), data.rhs_node(), NodeId::NULL),
        Tag::ContainerField => {
            let extra: ContainerFieldData = ast.extra(data.rhs);
            (
                data.lhs_node(),
                NodeId::new(extra.align_expr),
                NodeId::new(extra.value_expr),
            )
        }
        tag => unreachable!("not a container field tag: {:?}", tag),
    };
    let name_token = ast.main_token(node);
    let comptime_token = match name_token.get() {
        0 => None,
        i if tokens.tag_at(i - 1) == TokenTag::KeywordComptime => Some(TokenId::new(i - 1)),
        _ => None,
    };
    FullContainerField {
        comptime_token,
        name_token,
        type_expr,
        align_expr,
        value_expr,
    }
}

pub fn full_switch_case(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullSwitchCase {
    let data = ast.data(node);
    let values = match ast.tag(node) {
        Tag::SwitchCaseOne | Tag::SwitchCaseInlineOne => NodeRange::of_one(data.lhs_node()),
        Tag::SwitchCase | Tag::SwitchCaseInline => {
            let range: SubRange = ast.extra(data.lhs);
            NodeRange::Extra {
                start: range.start,
                end: range.end,
            }
        }
        tag => unreachable!("not a switch case tag: {:?}", tag),
    };
    let arrow_token = ast.main_token(node);
    let anchor = values
        .first(ast)
        .map(|value| first_token_of(ast, tokens, value))
        .unwrap_or_else(|| TokenId::new(arrow_token.get().saturating_sub(1)));
    let inline_token = match anchor.get() {
        0 => None,
        i if tokens.tag_at(i - 1) == TokenTag::KeywordInline => Some(TokenId::new(i - 1)),
        _ => None,
    };
    FullSwitchCase {
        inline_token,
        values,
        arrow_token,
        payload_token: payload_after(tokens, arrow_token),
        target_expr: data.rhs_node(),
    }
}

pub fn full_call(ast: &Ast, node: NodeId) -> FullCall {
    let data = ast.data(node);
    let params = match ast.tag(node) {
        Tag::CallOne | Tag::CallOneComma => NodeRange::of_one(data.rhs_node()),
        Tag::Call | Tag::CallComma => {
            let range: SubRange = ast.extra(data.rhs);
            NodeRange::Extra {
                start: range.start,
                end: range.end,
            }
        }
        tag => unreachable!("not a call tag: {:?}", tag),
    };
    FullCall {
        fn_expr: data.lhs_node(),
        lparen: ast.main_token(node),
        params,
    }
}

pub fn full_struct_init(ast: &Ast, node: NodeId) -> FullStructInit {
    use Tag::*;
    let data = ast.data(node);
    let (type_expr, fields) = match ast.tag(node) {
        StructInitOne | StructInitOneComma => {
            (data.lhs_node(), NodeRange::of_one(data.rhs_node()))
        }
        StructInitDotTwo | StructInitDotTwoComma => {
            (NodeId::NULL, NodeRange::of_two(data.lhs_node(), data.rhs_node()))
        }
        StructInitDot | StructInitDotComma => (
            NodeId::NULL,
            NodeRange::Extra {
                start: data.lhs,
                end: data.rhs,
            },
        ),
        StructInit | StructInitComma => {
            let range: SubRange = ast.extra(data.rhs);
            (
                data.lhs_node(),
                NodeRange::Extra {
                    start: range.start,
                    end: range.end,
                },
            )
        }
        tag => unreachable!("not a struct init tag: {:?}", tag),
    };
    FullStructInit { type_expr, fields }
}

pub fn full_array_init(ast: &Ast, node: NodeId) -> FullArrayInit {
    use Tag::*;
    let data = ast.data(node);
    let (type_expr, elements) = match ast.tag(node) {
        ArrayInitOne | ArrayInitOneComma => (data.lhs_node(), NodeRange::of_one(data.rhs_node())),
        ArrayInitDotTwo | ArrayInitDotTwoComma => {
            (NodeId::NULL, NodeRange::of_two(data.lhs_node(), data.rhs_node()))
        }
        ArrayInitDot | ArrayInitDotComma => (
            NodeId::NULL,
            NodeRange::Extra {
                start: data.lhs,
                end: data.rhs,
            },
        ),
        ArrayInit | ArrayInitComma => {
            let range: SubRange = ast.extra(data.rhs);
            (
                data.lhs_node(),
                NodeRange::Extra {
                    start: range.start,
                    end: range.end,
                },
            )
        }
        tag => unreachable!("not an array init tag: {:?}", tag),
    };
    FullArrayInit { type_expr, elements }
}

pub fn full_array_type(ast: &Ast, node: NodeId) -> FullArrayType {
    let data = ast.data(node);
    let (elem_count, sentinel, elem_type) = match ast.tag(node) {
        Tag::ArrayType => (data.lhs_node(), NodeId::NULL, data.rhs_node()),
        Tag::ArrayTypeSentinel => {
            let extra: ArrayTypeSentinelData = ast.extra(data.rhs);
            (
                data.lhs_node(),
                NodeId::new(extra.sentinel),
                NodeId::new(extra.elem_type),
            )
        }
        tag => unreachable!("not an array type tag: {:?}", tag),
    };
    FullArrayType {
        lbracket: ast.main_token(node),
        elem_count,
        sentinel,
        elem_type,
    }
}

pub fn full_ptr_type(ast: &Ast, tokens: &TokenList, node: NodeId) -> FullPtrType {
    let data = ast.data(node);
    let (align_node, addrspace_node, sentinel, bit_range, child_type) = match ast.tag(node) {
        Tag::PtrTypeAligned => (
            data.lhs_node(),
            NodeId::NULL,
            NodeId::NULL,
            None,
            data.rhs_node(),
        ),
        Tag::PtrTypeSentinel => (
            NodeId::NULL,
            NodeId::NULL,
            data.lhs_node(),
            None,
            data.rhs_node(),
        ),
        Tag::PtrType => {
            let extra: PtrTypeData = ast.extra(data.lhs);
            (
                NodeId::new(extra.align_node),
                NodeId::new(extra.addrspace_node),
                NodeId::new(extra.sentinel),
                None,
                data.rhs_node(),
            )
        }
        Tag::PtrTypeBitRange => {
            let extra: PtrTypeBitRangeData = ast.extra(data.lhs);
            (
                NodeId::new(extra.align_node),
                NodeId::NULL,
                NodeId::new(extra.sentinel),
                Some((
                    NodeId::new(extra.bit_range_start),
                    NodeId::new(extra.bit_range_end),
                )),
                data.rhs_node(),
            )
        }
        tag => unreachable!("not a pointer type tag: {:?}", tag),
    };
    let main_token = ast.main_token(node);
    let child_first = first_token_of(ast, tokens, child_type).get();
    let mut const_token = None;
    let mut i = main_token.get() + 1;
    while i < child_first {
        if tokens.tag_at(i) == TokenTag::KeywordConst {
            const_token = Some(TokenId::new(i));
            break;
        }
        i += 1;
    }
    FullPtrType {
        main_token,
        const_token,
        align_node,
        addrspace_node,
        sentinel,
        bit_range,
        child_type,
    }
}

pub fn full_slice(ast: &Ast, node: NodeId) -> FullSlice {
    let data = ast.data(node);
    let (start, end, sentinel) = match ast.tag(node) {
        Tag::SliceOpen => (data.rhs_node(), NodeId::NULL, NodeId::NULL),
        Tag::Slice => {
            let extra: SliceData = ast.extra(data.rhs);
            (NodeId::new(extra.start), NodeId::new(extra.end), NodeId::NULL)
        }
        Tag::SliceSentinel => {
            let extra: SliceSentinelData = ast.extra(data.rhs);
            (
                NodeId::new(extra.start),
                NodeId::new(extra.end),
                NodeId::new(extra.sentinel),
            )
        }
        tag => unreachable!("not a slice tag: {:?}", tag),
    };
    FullSlice {
        sliced: data.lhs_node(),
        lbracket: ast.main_token(node),
        start,
        end,
        sentinel,
    }
}

/// `catch |payload|`: the payload identifier of a catch operator, if any.
pub fn catch_payload_token(ast: &Ast, tokens: &TokenList, node: NodeId) -> Option<TokenId> {
    debug_assert_eq!(ast.tag(node), Tag::Catch);
    payload_after(tokens, ast.main_token(node))
}

impl FullNode {
    /// Push the structural children, in source order, skipping null slots.
    /// Every field holding a node index appears here; token fields do not.
    pub fn children(&self, ast: &Ast, out: &mut Vec<NodeId>) {
        let mut push = |id: NodeId| {
            if !id.is_null() {
                out.push(id);
            }
        };
        match self {
            FullNode::VarDecl(full) => {
                push(full.type_node);
                push(full.align_node);
                push(full.addrspace_node);
                push(full.section_node);
                push(full.init_node);
            }
            FullNode::AssignDestructure(full) => {
                for variable in full.variables.iter(ast) {
                    push(variable);
                }
                push(full.value);
            }
            FullNode::If(full) => {
                push(full.cond_expr);
                push(full.then_expr);
                push(full.else_expr);
            }
            FullNode::While(full) => {
                push(full.cond_expr);
                push(full.cont_expr);
                push(full.then_expr);
                push(full.else_expr);
            }
            FullNode::For(full) => {
                for input in full.inputs.iter(ast) {
                    push(input);
                }
                push(full.then_expr);
                push(full.else_expr);
            }
            FullNode::FnProto(full) => {
                for param in full.params.iter(ast) {
                    push(param);
                }
                push(full.align_expr);
                push(full.callconv_expr);
                push(full.return_type);
            }
            FullNode::ContainerField(full) => {
                push(full.type_expr);
                push(full.align_expr);
                push(full.value_expr);
            }
            FullNode::StructInit(full) => {
                push(full.type_expr);
                for field in full.fields.iter(ast) {
                    push(field);
                }
            }
            FullNode::ArrayInit(full) => {
                push(full.type_expr);
                for element in full.elements.iter(ast) {
                    push(element);
                }
            }
            FullNode::ArrayType(full) => {
                push(full.elem_count);
                push(full.sentinel);
                push(full.elem_type);
            }
            FullNode::PtrType(full) => {
                push(full.sentinel);
                push(full.align_node);
                if let Some((start, end)) = full.bit_range {
                    push(start);
                    push(end);
                }
                push(full.addrspace_node);
                push(full.child_type);
            }
            FullNode::Slice(full) => {
                push(full.sliced);
                push(full.start);
                push(full.end);
                push(full.sentinel);
            }
            FullNode::ContainerDecl(full) => {
                push(full.arg);
                for member in full.members.iter(ast) {
                    push(member);
                }
            }
            FullNode::SwitchCase(full) => {
                for value in full.values.iter(ast) {
                    push(value);
                }
                push(full.target_expr);
            }
            FullNode::Call(full) => {
                push(full.fn_expr);
                for param in full.params.iter(ast) {
                    push(param);
                }
            }
        }
    }
}
