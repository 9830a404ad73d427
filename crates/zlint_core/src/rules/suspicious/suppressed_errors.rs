use crate::rule_prelude::*;

/// Error-returning writer methods whose failures are conventionally
/// ignorable (best-effort output).
const WRITER_METHODS: &[&str] = &[
    "write",
    "writeAll",
    "writeByte",
    "writeByteNTimes",
    "print",
    "flush",
];

declare_lint! {
    /**
    Disallows silently discarding errors.

    `catch unreachable` turns a recoverable error into illegal behavior,
    and `catch {}` makes failures invisible. Both are allowed when a
    `SAFETY:` comment directly above explains why the error cannot occur,
    and empty handlers are allowed for best-effort writer calls such as
    `w.print(...) catch {}`.

    ### Invalid Code Examples
    ```zig
    fn foo() void {
        risky() catch unreachable;
    }
    ```

    ### Valid Code Examples
    ```zig
    fn foo() void {
        // SAFETY: the buffer was sized in init, writes cannot fail
        risky() catch unreachable;
    }

    fn log(w: Writer) void {
        w.writeAll("x") catch {};
    }
    ```
    */
    SuppressedErrors,
    Suspicious,
    Warning,
    NONE,
    "suppressed-errors",
    hooks: [NODE]
}

#[typetag::serde(name = "suppressed-errors")]
impl LintRule for SuppressedErrors {
    fn run_on_node(&self, node: NodeId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        let ast = ctx.ast();
        if ast.tag(node) != Tag::Catch {
            return None;
        }

        let handler = ast.data(node).rhs_node();
        let is_unreachable = ast.tag(handler) == Tag::UnreachableLiteral;
        let is_empty_block = is_empty_block(ctx, handler);
        if !is_unreachable && !is_empty_block {
            return None;
        }

        if let Some(comments) = ctx.comments_before_node(node) {
            if comments.contains("SAFETY:") {
                return None;
            }
        }
        if is_empty_block && is_writer_call(ctx, ast.data(node).lhs_node()) {
            return None;
        }

        let handler_span = ctx.span_of_node(handler);
        let err = if is_unreachable {
            ctx.diagnostic("this error is suppressed with `unreachable`")
                .primary(handler_span, "a failure here becomes illegal behavior")
        } else {
            ctx.diagnostic("this error is silently discarded")
                .primary(handler_span, "the failure disappears here")
        };
        ctx.report(err.help(
            "Handle the error, or explain why it cannot happen with a `SAFETY:` comment.",
        ));
        Some(())
    }
}

fn is_empty_block(ctx: &RuleCtx<'_>, node: NodeId) -> bool {
    let ast = ctx.ast();
    match ast.tag(node) {
        Tag::BlockTwo | Tag::BlockTwoSemicolon => {
            let data = ast.data(node);
            data.lhs == 0 && data.rhs == 0
        }
        _ => false,
    }
}

/// `x.writeAll(...)`-shaped operand: a call whose callee is a field
/// access naming a whitelisted writer method.
fn is_writer_call(ctx: &RuleCtx<'_>, operand: NodeId) -> bool {
    let ast = ctx.ast();
    let callee = match ast.tag(operand) {
        Tag::CallOne | Tag::CallOneComma | Tag::Call | Tag::CallComma => ast.data(operand).lhs_node(),
        _ => return false,
    };
    if ast.tag(callee) != Tag::FieldAccess {
        return false;
    }
    let method = ctx.snippet_of_token(ast.data(callee).rhs_token());
    WRITER_METHODS.contains(&method)
}

rule_tests! {
    SuppressedErrors::default(),
    err: {
        "fn foo() void { risky() catch unreachable; }",
        "fn foo() void { risky() catch {}; }",
        "fn foo() void { obj.compute() catch {}; }",
    },
    ok: {
        "fn foo(w: Writer) void { w.writeAll(\"x\") catch {}; }",
        "fn foo(w: Writer) void { w.print(\"{}\", value) catch {}; }",
        "fn foo() void {\n    // SAFETY: risky is infallible after init\n    risky() catch unreachable;\n}",
        "fn foo() void { risky() catch |e| log(e); }",
        "fn foo() u32 { return risky() catch 0; }",
    }
}
