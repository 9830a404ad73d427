use crate::rule_prelude::*;

declare_lint! {
    /**
    Disallows unused private top-level declarations.

    A file-scope `const` that is never referenced and not `pub` is dead
    weight. The offered fix deletes the whole declaration, which is
    dangerous: the initializer may have side effects (an `@import`, a
    comptime block) the build still depends on.

    ### Invalid Code Examples
    ```zig
    const unused = 1;
    ```

    ### Valid Code Examples
    ```zig
    pub const exported = 1;

    const used = 1;
    pub const twice = used * 2;
    ```
    */
    UnusedDecls,
    Style,
    Warning,
    DANGEROUS_FIX,
    "unused-decls",
    hooks: [SYMBOL]
}

#[typetag::serde(name = "unused-decls")]
impl LintRule for UnusedDecls {
    fn run_on_symbol(&self, symbol: SymbolId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        let semantic = ctx.semantic();
        let sym = semantic.symbol(symbol);

        if !semantic
            .scopes()
            .scope(sym.scope)
            .flags
            .contains(ScopeFlags::TOP)
        {
            return None;
        }
        if !sym.flags.contains(SymbolFlags::VARIABLE) || !sym.flags.contains(SymbolFlags::CONST) {
            return None;
        }
        if sym.is_public() || sym.flags.intersects(SymbolFlags::EXTERN | SymbolFlags::EXPORT) {
            return None;
        }
        if !sym.references.is_empty() {
            return None;
        }

        let name = semantic.symbol_name(symbol);
        let err = ctx
            .diagnostic(format!("`{}` is declared but never used", name))
            .primary(sym.name_span, "declared here")
            .help("Remove the declaration, or export it with `pub`.");

        // Delete through the trailing `;` and line break.
        let decl_span = semantic.node_span(sym.decl);
        let bytes = ctx.text().as_bytes();
        let mut end = decl_span.end as usize;
        while end < bytes.len() {
            let byte = bytes[end];
            end += 1;
            if byte == b'\n' {
                break;
            }
        }
        let delete = Span::from(decl_span.start as usize..end);
        ctx.report_with_fix(err, move |fixer| fixer.delete(delete));
        Some(())
    }
}

rule_tests! {
    UnusedDecls::default(),
    err: {
        "const unused = 1;",
        "const x = 1;\nconst y = 2;\npub const z = x + 1;\n",
        "const Unused = struct { a: u32 };",
    },
    ok: {
        "pub const exported = 1;",
        "const used = 1;\npub const twice = used * 2;",
        "extern const external: u32;",
        "var mutable: u32 = 0;",
        "const used_in_fn = 1;\npub fn get() u32 { return used_in_fn; }",
    }
}
