use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizline_core::bank::parse_bank_csv_str;
use quizline_core::model::{OptionLabel, Question, QuizSize};
use quizline_core::sampler::create_set;

fn make_bank(n: u32) -> Vec<Question> {
    (1..=n)
        .map(|id| {
            let options: BTreeMap<OptionLabel, String> = [OptionLabel::A, OptionLabel::B]
                .into_iter()
                .map(|l| (l, format!("option {l}")))
                .collect();
            Question::new(id, format!("question {id}"), options, OptionLabel::A).unwrap()
        })
        .collect()
}

fn make_csv(n: u32) -> String {
    let mut csv = String::from("number,question,A,B,C,D,E,correct,reference,clause\n");
    for i in 1..=n {
        csv.push_str(&format!(
            "{i},Question {i}?,first,second,third,fourth,,B,Document {i},Art. {i}\n"
        ));
    }
    csv
}

fn bench_create_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_set");

    for bank_size in [100, 1_000, 10_000] {
        let bank = make_bank(bank_size);
        let mut rng = StdRng::seed_from_u64(42);
        group.bench_function(format!("bank={bank_size},size=50"), |b| {
            b.iter(|| create_set(black_box(&bank), QuizSize::Fifty, &mut rng))
        });
    }

    group.finish();
}

fn bench_parse_csv(c: &mut Criterion) {
    let csv = make_csv(1_000);
    c.bench_function("parse_bank_csv/rows=1000", |b| {
        b.iter(|| parse_bank_csv_str(black_box(&csv), "bench"))
    });
}

criterion_group!(benches, bench_create_set, bench_parse_csv);
criterion_main!(benches);
