use crate::rule_prelude::*;

declare_lint! {
    /**
    Enforces Zig naming conventions.

    Containers and error values are TitleCase, functions are camelCase,
    and variables, parameters, payloads and fields are snake_case.
    TitleCase function names are allowed because type-returning functions
    conventionally use them.

    ### Invalid Code Examples
    ```zig
    const point = struct { x: f32 };

    fn do_thing(BadParam: u32) void {}
    ```

    ### Valid Code Examples
    ```zig
    const Point = struct { x: f32 };

    fn doThing(good_param: u32) void {}
    ```
    */
    CaseConvention,
    Style,
    Warning,
    NONE,
    "case-convention",
    hooks: [SYMBOL]
}

#[typetag::serde(name = "case-convention")]
impl LintRule for CaseConvention {
    fn run_on_symbol(&self, symbol: SymbolId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        let semantic = ctx.semantic();
        let sym = semantic.symbol(symbol);
        if sym.is_anonymous() {
            return None;
        }
        let name = semantic.symbol_name(symbol);
        // `_`-prefixed names opt out; `@"..."` names are quoted for a
        // reason.
        if name.starts_with('_') || name.starts_with('@') {
            return None;
        }

        let flags = sym.flags;
        let complaint = if flags.intersects(SymbolFlags::CONTAINER) {
            if is_title_case(name) {
                None
            } else {
                Some(("container", "TitleCase"))
            }
        } else if flags.contains(SymbolFlags::FN) {
            if is_camel_case(name) || is_title_case(name) {
                None
            } else {
                Some(("function", "camelCase"))
            }
        } else if flags.contains(SymbolFlags::FN_PARAM) {
            // `comptime T: type` parameters are types and use TitleCase.
            if is_snake_case(name)
                || (flags.contains(SymbolFlags::COMPTIME) && is_title_case(name))
            {
                None
            } else {
                Some(("parameter", "snake_case"))
            }
        } else if flags.intersects(SymbolFlags::PAYLOAD | SymbolFlags::MEMBER) {
            if is_snake_case(name) {
                None
            } else {
                Some(("binding", "snake_case"))
            }
        } else if flags.contains(SymbolFlags::VARIABLE) {
            if is_snake_case(name) {
                None
            } else {
                Some(("variable", "snake_case"))
            }
        } else {
            None
        };

        let (kind, convention) = complaint?;
        let err = ctx
            .diagnostic(format!(
                "{} `{}` should be {}",
                kind, name, convention
            ))
            .primary(sym.name_span, "");
        ctx.report(err);
        Some(())
    }
}

fn is_snake_case(name: &str) -> bool {
    !name.chars().any(|c| c.is_ascii_uppercase())
}

fn is_camel_case(name: &str) -> bool {
    !name.contains('_') && name.chars().next().map_or(true, |c| !c.is_ascii_uppercase())
}

fn is_title_case(name: &str) -> bool {
    !name.contains('_') && name.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

rule_tests! {
    CaseConvention::default(),
    err: {
        "const point = struct { x: f32 };",
        "fn do_thing() void {}",
        "fn foo(BadParam: u32) void { _ = BadParam; }",
        "pub const BadName: u32 = 1;",
    },
    ok: {
        "const Point = struct { x: f32 };",
        "fn doThing() void {}",
        "fn ArrayOf(comptime T: type) type { return T; }",
        "fn foo(good_param: u32) void { _ = good_param; }",
        "const max_len = 128;",
        "const Errors = error { OutOfSpace, BadInput };",
    }
}
