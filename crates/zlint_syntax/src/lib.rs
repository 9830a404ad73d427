//! Zig tokenizer, parser and AST contract for the zlint project.
//!
//! The engine never touches syntax through anything but this crate's
//! artifacts: a [`TokenList`] of `{tag, offset}` pairs, a dense index-based
//! [`Ast`] whose data words are documented per [`Tag`], a comment side list,
//! and the canonical full-node views in [`full`]. Parse errors come out as
//! plain [`zlint_errors::Diagnostic`]s with the code `parse`.
//!
//! ## Parsing a file
//!
//! ```
//! use zlint_syntax::parse;
//!
//! let parsed = parse("const x = 1;");
//! assert!(parsed.ok());
//! assert_eq!(parsed.ast.root_decls().len(), 1);
//! ```

#[macro_use]
pub mod ids;

pub mod ast;
pub mod full;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Ast, Node, NodeData, Tag};
pub use ids::{NodeId, OptNodeId, OptTokenId, TokenId};
pub use parser::{parse, Parse};
pub use token::{Comment, CommentKind, TokenList, TokenTag};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::full::{full_fn_proto, full_node, FullNode};
    use indoc::indoc;

    fn parse_ok(source: &str) -> Parse {
        let parsed = parse(source);
        assert!(
            parsed.ok(),
            "unexpected parse errors for {:?}: {:#?}",
            source,
            parsed.errors
        );
        parsed
    }

    #[test]
    fn empty_source_parses_to_an_empty_root() {
        let parsed = parse_ok("");
        assert_eq!(parsed.ast.root_decls().len(), 0);
        assert_eq!(parsed.ast.node_count(), 1);
    }

    #[test]
    fn top_level_var_decls() {
        let source = "const x = 1;\npub const y: u32 = 2;\nvar z: u8 = 0;\n";
        let parsed = parse_ok(source);
        let decls = parsed.ast.root_decls();
        assert_eq!(decls.len(), 3);
        assert_eq!(parsed.ast.tag(decls[0]), Tag::SimpleVarDecl);

        match full_node(&parsed.ast, &parsed.tokens, decls[1]) {
            Some(FullNode::VarDecl(full)) => {
                assert!(full.is_pub());
                assert!(full.is_const(&parsed.tokens));
                assert!(!full.type_node.is_null());
                assert_eq!(parsed.tokens.slice(source, full.name_token()), "y");
            }
            other => panic!("expected a var decl, got {:?}", other),
        }
    }

    #[test]
    fn fn_decl_with_error_union_return() {
        let source = "fn foo() !void { _ = try bar(); }";
        let parsed = parse_ok(source);
        let decls = parsed.ast.root_decls();
        assert_eq!(parsed.ast.tag(decls[0]), Tag::FnDecl);

        let proto = full_fn_proto(&parsed.ast, &parsed.tokens, decls[0]).unwrap();
        assert!(proto.returns_errors(&parsed.ast, &parsed.tokens));
        assert_eq!(
            parsed.tokens.slice(source, proto.name_token.unwrap()),
            "foo"
        );
    }

    #[test]
    fn fn_decl_without_error_union_return() {
        let source = "fn foo() void {}";
        let parsed = parse_ok(source);
        let proto = full_fn_proto(&parsed.ast, &parsed.tokens, parsed.ast.root_decls()[0]).unwrap();
        assert!(!proto.returns_errors(&parsed.ast, &parsed.tokens));
    }

    #[test]
    fn fn_params_recover_names() {
        let source = "fn add(a: u32, b: u32) u32 { return a + b; }";
        let parsed = parse_ok(source);
        let proto = full_fn_proto(&parsed.ast, &parsed.tokens, parsed.ast.root_decls()[0]).unwrap();
        let params: Vec<_> = proto.iter_params(&parsed.ast, &parsed.tokens).collect();
        assert_eq!(params.len(), 2);
        assert_eq!(
            parsed.tokens.slice(source, params[0].name_token.unwrap()),
            "a"
        );
        assert_eq!(
            parsed.tokens.slice(source, params[1].name_token.unwrap()),
            "b"
        );
    }

    #[test]
    fn catch_with_payload() {
        let source = "fn foo() void { bar() catch |e| return e; }";
        let parsed = parse_ok(source);
        let fn_decl = parsed.ast.root_decls()[0];
        let body = parsed.ast.data(fn_decl).rhs_node();
        let stmt = parsed.ast.data(body).lhs_node();
        assert_eq!(parsed.ast.tag(stmt), Tag::Catch);
        let payload = full::catch_payload_token(&parsed.ast, &parsed.tokens, stmt).unwrap();
        assert_eq!(parsed.tokens.slice(source, payload), "e");
        assert_eq!(parsed.ast.tag(parsed.ast.data(stmt).rhs_node()), Tag::Return);
    }

    #[test]
    fn containers_and_fields() {
        let source = indoc! {"
            const Point = struct {
                x: f32,
                y: f32 = 0,
                pub fn len(self: Point) f32 {
                    return self.x;
                }
            };
        "};
        let parsed = parse_ok(source);
        let decl = parsed.ast.root_decls()[0];
        let init = parsed.ast.data(decl).rhs_node();
        match full_node(&parsed.ast, &parsed.tokens, init) {
            Some(FullNode::ContainerDecl(container)) => {
                assert_eq!(container.kind_tag(&parsed.tokens), TokenTag::KeywordStruct);
                let members: Vec<_> = container.members.iter(&parsed.ast).collect();
                assert_eq!(members.len(), 3);
                assert_eq!(parsed.ast.tag(members[0]), Tag::ContainerFieldInit);
                assert_eq!(parsed.ast.tag(members[2]), Tag::FnDecl);
            }
            other => panic!("expected a container decl, got {:?}", other),
        }
    }

    #[test]
    fn switch_cases_canonicalize() {
        let source = "fn f(x: u8) u8 {\n    return switch (x) {\n        0, 1 => 10,\n        2...5 => |v| v,\n        else => 0,\n    };\n}\n";
        let parsed = parse_ok(source);
        let mut switch_node = None;
        for index in 0..parsed.ast.node_count() {
            let node = NodeId::new(index as u32);
            if parsed.ast.tag(node) == Tag::Switch {
                switch_node = Some(node);
            }
        }
        let switch_node = switch_node.expect("no switch node");
        let mut cases = Vec::new();
        parsed.ast.children_of(switch_node, &mut cases);
        // cond + three cases
        assert_eq!(cases.len(), 4);

        match full_node(&parsed.ast, &parsed.tokens, cases[1]) {
            Some(FullNode::SwitchCase(case)) => {
                assert_eq!(case.values.iter(&parsed.ast).count(), 2);
                assert!(case.payload_token.is_none());
            }
            other => panic!("expected a switch case, got {:?}", other),
        }
        match full_node(&parsed.ast, &parsed.tokens, cases[2]) {
            Some(FullNode::SwitchCase(case)) => {
                assert_eq!(case.payload_token.map(|t| parsed.tokens.slice(source, t)), Some("v"));
            }
            other => panic!("expected a switch case, got {:?}", other),
        }
        match full_node(&parsed.ast, &parsed.tokens, cases[3]) {
            Some(FullNode::SwitchCase(case)) => assert!(case.is_else(&parsed.ast)),
            other => panic!("expected a switch case, got {:?}", other),
        }
    }

    #[test]
    fn if_payloads() {
        let source = "fn f(opt: ?u8) void { if (opt) |v| use(v) else report(); }";
        let parsed = parse_ok(source);
        let mut found = false;
        for index in 0..parsed.ast.node_count() {
            let node = NodeId::new(index as u32);
            if parsed.ast.tag(node) == Tag::If {
                let full = full::full_if(&parsed.ast, &parsed.tokens, node);
                assert_eq!(full.payload_token.map(|t| parsed.tokens.slice(source, t)), Some("v"));
                assert!(!full.else_expr.is_null());
                found = true;
            }
        }
        assert!(found, "no if node produced");
    }

    #[test]
    fn pointer_type_annotations() {
        let source = indoc! {"
            const a: *align(4) u8 = p;
            const b: []align(8) const u8 = q;
            const c: [:0]align(4) u8 = r;
            const d: *align(8:0:16) u8 = s;
            const e: *addrspace(.flash) u8 = t;
        "};
        let parsed = parse_ok(source);
        let decls = parsed.ast.root_decls();
        let type_of = |index: usize| parsed.ast.data(decls[index]).lhs_node();

        assert_eq!(parsed.ast.tag(type_of(0)), Tag::PtrTypeAligned);
        let a = full::full_ptr_type(&parsed.ast, &parsed.tokens, type_of(0));
        assert!(!a.align_node.is_null());
        assert!(a.addrspace_node.is_null());

        assert_eq!(parsed.ast.tag(type_of(1)), Tag::PtrTypeAligned);
        let b = full::full_ptr_type(&parsed.ast, &parsed.tokens, type_of(1));
        assert!(!b.align_node.is_null());
        assert!(b.const_token.is_some());

        // Sentinel plus align combine into the full pointer form.
        assert_eq!(parsed.ast.tag(type_of(2)), Tag::PtrType);
        let c = full::full_ptr_type(&parsed.ast, &parsed.tokens, type_of(2));
        assert!(!c.sentinel.is_null());
        assert!(!c.align_node.is_null());

        assert_eq!(parsed.ast.tag(type_of(3)), Tag::PtrTypeBitRange);
        let d = full::full_ptr_type(&parsed.ast, &parsed.tokens, type_of(3));
        assert!(!d.align_node.is_null());
        assert!(d.bit_range.is_some());

        assert_eq!(parsed.ast.tag(type_of(4)), Tag::PtrType);
        let e = full::full_ptr_type(&parsed.ast, &parsed.tokens, type_of(4));
        assert!(!e.addrspace_node.is_null());
        assert!(e.align_node.is_null());
    }

    #[test]
    fn global_var_decl_annotations() {
        let source = indoc! {r#"
            var data: u32 linksection(".data") = 0;
            var reg: u8 addrspace(.mmio) = 0;
            var mixed: u32 align(4) linksection(".bss") = 0;
        "#};
        let parsed = parse_ok(source);
        let decls = parsed.ast.root_decls();
        for &decl in &decls {
            assert_eq!(parsed.ast.tag(decl), Tag::GlobalVarDecl);
        }

        let data = full::full_var_decl(&parsed.ast, &parsed.tokens, decls[0]);
        assert_eq!(parsed.tokens.slice(source, data.name_token()), "data");
        assert!(!data.type_node.is_null());
        assert!(!data.section_node.is_null());
        assert!(data.align_node.is_null());
        assert!(data.addrspace_node.is_null());

        let reg = full::full_var_decl(&parsed.ast, &parsed.tokens, decls[1]);
        assert!(!reg.addrspace_node.is_null());
        assert!(reg.section_node.is_null());

        let mixed = full::full_var_decl(&parsed.ast, &parsed.tokens, decls[2]);
        assert!(!mixed.align_node.is_null());
        assert!(!mixed.section_node.is_null());
        assert_eq!(parsed.ast.tag(mixed.init_node), Tag::NumberLiteral);
    }

    #[test]
    fn parse_errors_are_collected_with_spans() {
        let parsed = parse("const = 1;");
        assert!(!parsed.ok());
        assert_eq!(parsed.errors[0].code, "parse");
        assert!(!parsed.errors[0].primary_span().is_empty());
    }

    #[test]
    fn error_recovery_reports_multiple_members() {
        let parsed = parse("const = 1;\nconst ok = 2;\nconst 2 = 3;\n");
        assert!(parsed.errors.len() >= 2);
    }
}
