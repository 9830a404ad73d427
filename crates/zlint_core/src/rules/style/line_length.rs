use crate::rule_prelude::*;

declare_lint! {
    /**
    Disallows lines longer than a configured byte limit.

    Off by default. Enable it with a severity and, optionally, a limit:

    ```json
    { "rules": { "line-length": ["warning", { "maxLength": 100 }] } }
    ```
    */
    LineLength,
    Style,
    Off,
    NONE,
    "line-length",
    hooks: [LINE],
    pub max_length: usize = 120
}

#[typetag::serde(name = "line-length")]
impl LintRule for LineLength {
    fn run_on_line(&self, line: &Line<'_>, ctx: &mut RuleCtx<'_>) -> Option<()> {
        if line.text.len() <= self.max_length {
            return None;
        }
        let overflow = Span::new(
            line.span.start + self.max_length as u32,
            line.span.end,
        );
        let err = ctx
            .diagnostic(format!(
                "line {} is {} bytes long, which exceeds the limit of {}",
                line.number,
                line.text.len(),
                self.max_length
            ))
            .primary(overflow, "this part overflows the limit");
        ctx.report(err);
        Some(())
    }
}

rule_tests! {
    LineLength::default(),
    err: {
        "const message = \"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\";",
    },
    ok: {
        "const message = \"short\";",
        "const x = 1;\nconst y = 2;",
    }
}
