use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use zlint_core::{lint_source, Linter, RuleStore, SemanticBuilder, Source};
use zlint_syntax::{lexer, parse};

/// A synthetic file with the shapes the linter spends its time on.
fn sample_source(repeats: usize) -> String {
    let unit = r#"
const Config = struct {
    limit: u32 = 128,
    name: []const u8,

    pub fn check(self: Config, value: u32) !void {
        if (value > self.limit) {
            return error.OverLimit;
        }
    }
};

pub fn run(cfg: Config, values: []const u32) !u32 {
    var total: u32 = 0;
    for (values) |value| {
        cfg.check(value) catch |e| return e;
        total += value;
    }
    return total;
}
"#;
    unit.repeat(repeats)
}

fn tokenize(source: &str) {
    lexer::tokenize(source);
}

fn parse_only(source: &str) {
    parse(source);
}

fn build(source: &Source) {
    let _ = SemanticBuilder::build(source);
}

fn lint(linter: &Linter, source: &Source) {
    let _ = lint_source(source, linter);
}

fn pipeline(c: &mut Criterion) {
    let text = sample_source(64);
    let source = Source::anonymous(text.clone());
    let linter = Linter::new(RuleStore::new().builtins());

    let mut group = c.benchmark_group("pipeline");
    group
        .sample_size(20)
        .throughput(Throughput::Bytes(text.len() as u64))
        .bench_function("tokenize", |b| b.iter(|| tokenize(black_box(&text))))
        .bench_function("parse", |b| b.iter(|| parse_only(black_box(&text))))
        .bench_function("semantic", |b| b.iter(|| build(black_box(&source))))
        .bench_function("lint", |b| b.iter(|| lint(&linter, black_box(&source))));

    group.finish();
}

criterion_group!(benches, pipeline);
criterion_main!(benches);
