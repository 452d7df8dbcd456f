use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizline_core::parser::{parse_bank_str, validate_bank};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    for n in [5usize, 50, 200] {
        let toml = generate_bank_toml(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| parse_bank_str(black_box(&toml), black_box("bench.toml".as_ref())))
        });
    }

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let toml = generate_bank_toml(200);
    let bank = match parse_bank_str(&toml, "bench.toml".as_ref()) {
        Ok(bank) => bank,
        Err(e) => panic!("bench bank failed to parse: {e:#}"),
    };

    c.bench_function("validate_200_questions", |b| {
        b.iter(|| validate_bank(black_box(&bank)))
    });
}

fn generate_bank_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        r#"[test]
id = "bench"
title = "Benchmark"
time_limit_minutes = 30
passing_score = 70
question_count = {n}
"#
    ));
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
id = "q{i}"
prompt = """
Which option is number {i}?
"""
options = ["first", "second", "third", "fourth"]
correct = {correct}
explanation = "Option {correct} is right for question {i}."
category = "topic-{topic}"
"#,
            correct = i % 4,
            topic = i % 6,
        ));
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_validation);
criterion_main!(benches);
