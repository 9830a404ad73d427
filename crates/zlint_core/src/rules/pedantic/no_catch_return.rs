use crate::rule_prelude::*;

declare_lint! {
    /**
    Disallows `catch` handlers that only return the caught error.

    `foo() catch |e| return e` is a long-winded `try foo()`. The rewrite
    is offered as a safe fix when the handler is exactly the return;
    handlers that do other work first are still reported, without a fix.

    ### Invalid Code Examples
    ```zig
    fn foo() !void {
        bar() catch |e| return e;
    }
    ```

    ### Valid Code Examples
    ```zig
    fn foo() !void {
        try bar();
    }
    ```
    */
    NoCatchReturn,
    Pedantic,
    Warning,
    SAFE_FIX,
    "no-catch-return",
    hooks: [NODE]
}

#[typetag::serde(name = "no-catch-return")]
impl LintRule for NoCatchReturn {
    fn run_on_node(&self, node: NodeId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        let ast = ctx.ast();
        if ast.tag(node) != Tag::Catch {
            return None;
        }
        let payload = full::catch_payload_token(ast, ctx.tokens(), node)?;
        let payload_name = ctx.snippet_of_token(payload);

        let handler = ast.data(node).rhs_node();
        let (returns_payload, fixable) = match ast.tag(handler) {
            Tag::Return => (returns_the_payload(ctx, handler, payload_name), true),
            Tag::BlockTwo | Tag::BlockTwoSemicolon | Tag::Block | Tag::BlockSemicolon => {
                let mut statements = Vec::new();
                ast.children_of(handler, &mut statements);
                match statements.last() {
                    Some(&last)
                        if ast.tag(last) == Tag::Return
                            && returns_the_payload(ctx, last, payload_name) =>
                    {
                        (true, statements.len() == 1)
                    }
                    _ => (false, false),
                }
            }
            _ => (false, false),
        };
        if !returns_payload {
            return None;
        }

        let err = ctx
            .diagnostic("returning the caught error is equivalent to `try`")
            .primary(
                ctx.span_of_token(ast.main_token(node)),
                "this `catch` only re-raises the error",
            )
            .help("Replace the `catch` with `try`.");

        if fixable {
            let operand = ast.data(node).lhs_node();
            let replacement = format!("try {}", ctx.snippet_of_node(operand));
            let span = ctx.span_of_node(node);
            ctx.report_with_fix(err, move |fixer| fixer.replace(span, replacement));
        } else {
            ctx.report(err);
        }
        Some(())
    }
}

fn returns_the_payload(ctx: &RuleCtx<'_>, return_node: NodeId, payload_name: &str) -> bool {
    let ast = ctx.ast();
    match ast.data(return_node).lhs_node().non_null() {
        Some(operand) => {
            ast.tag(operand) == Tag::Identifier && ctx.snippet_of_node(operand) == payload_name
        }
        None => false,
    }
}

rule_tests! {
    NoCatchReturn::default(),
    err: {
        "fn foo() !void { bar() catch |e| return e; }",
        "fn foo() !void { bar() catch |e| { return e; }; }",
        "fn foo() !void { bar() catch |e| { log(); return e; }; }",
    },
    ok: {
        "fn foo() !void { try bar(); }",
        "fn foo() !void { bar() catch |e| return mapError(e); }",
        "fn foo() void { bar() catch |e| { log(e); }; }",
        "fn foo() u32 { return bar() catch 0; }",
    }
}
