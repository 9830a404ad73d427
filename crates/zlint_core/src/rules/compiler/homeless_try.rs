use crate::rule_prelude::*;

declare_lint! {
    /**
    Disallows `try` inside functions that cannot return errors.

    `try` re-raises the error to the caller, so the enclosing function's
    return type must be an error union (or use an inferred error set with
    `!`). Test blocks always return errors and are never flagged.

    ### Invalid Code Examples
    ```zig
    fn foo() void {
        _ = try bar();
    }
    ```

    ### Valid Code Examples
    ```zig
    fn foo() !void {
        _ = try bar();
    }

    test {
        try bar();
    }
    ```
    */
    HomelessTry,
    Compiler,
    Error,
    NONE,
    "homeless-try",
    hooks: [NODE]
}

#[typetag::serde(name = "homeless-try")]
impl LintRule for HomelessTry {
    fn run_on_node(&self, node: NodeId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        let ast = ctx.ast();
        if ast.tag(node) != Tag::Try {
            return None;
        }

        let mut enclosing_fn = None;
        for ancestor in ctx.semantic().links().ancestors(node) {
            match ast.tag(ancestor) {
                // Test blocks implicitly return errors.
                Tag::TestDecl => return None,
                Tag::FnDecl => {
                    enclosing_fn = Some(ancestor);
                    break;
                }
                _ => {}
            }
        }

        let try_span = ctx.span_of_token(ast.main_token(node));
        match enclosing_fn {
            Some(fn_decl) => {
                let proto = full::full_fn_proto(ast, ctx.tokens(), fn_decl)?;
                if proto.returns_errors(ast, ctx.tokens()) {
                    return None;
                }
                let return_type = proto.return_type.non_null()?;
                let err = ctx
                    .diagnostic("`try` used in a function that cannot return errors")
                    .primary(try_span, "the error cannot propagate from here")
                    .help(format!(
                        "Change the return type to `!{}`.",
                        ctx.snippet_of_node(return_type)
                    ));
                ctx.report(err);
            }
            None => {
                let err = ctx
                    .diagnostic("`try` used outside of a function or test block")
                    .primary(try_span, "the error cannot propagate from here");
                ctx.report(err);
            }
        }
        Some(())
    }
}

rule_tests! {
    HomelessTry::default(),
    err: {
        "fn foo() void { _ = try bar(); }",
        "fn foo() u32 { return try bar(); }",
        "const std = @import(\"std\");\nfn outer() void { _ = try inner(); }",
    },
    ok: {
        "fn foo() !void { _ = try bar(); }",
        "fn foo() anyerror!void { _ = try bar(); }",
        "fn foo() Error!u32 { return try bar(); }",
        "test { try bar(); }",
        "test \"named\" { try bar(); }",
        "fn foo() void { _ = bar(); }",
    }
}
