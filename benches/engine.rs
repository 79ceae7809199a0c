use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geoquiz_rs::{Country, Dataset, Game, exponent_denominator, weighted_sample};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn synthetic_dataset(countries: usize, cities_each: usize) -> Dataset {
    let mut list = Vec::with_capacity(countries);
    let mut shards = HashMap::new();
    for i in 0..countries {
        let code = format!("c{i:03}");
        list.push(Country {
            code: code.clone(),
            domain: format!(".{code}"),
            names: vec![format!("Country {i}")],
        });
        let cities = (0..cities_each)
            .map(|j| (format!("City {i}-{j}"), 1_000 + (i * 31 + j * 7) as u64 * 997))
            .collect();
        shards.insert(code, cities);
    }
    Dataset::from_parts(list, shards).expect("synthetic dataset is playable")
}

fn bench_weighted_sample(c: &mut Criterion) {
    let weights: Vec<(usize, u64)> = (0..200).map(|i| (i, 1_000 + i as u64 * 917)).collect();
    let denominator = exponent_denominator(2).expect("valid level");
    let mut rng = SmallRng::seed_from_u64(7);
    c.bench_function("weighted_sample::200_entries", |b| {
        b.iter(|| {
            let value = weighted_sample(&mut rng, &weights, denominator).expect("positive total");
            black_box(*value);
        });
    });
}

fn bench_question_draw(c: &mut Criterion) {
    for &size in &[50usize, 200] {
        let dataset = synthetic_dataset(size, 40);
        let mut game = Game::seeded(dataset, 2, 7).expect("playable game");
        c.bench_with_input(BenchmarkId::new("question_draw", size), &size, |b, _| {
            b.iter(|| {
                let question = game.skip().expect("draw succeeds");
                black_box(question.answers.len());
            });
        });
    }
}

criterion_group!(benches, bench_weighted_sample, bench_question_draw);
criterion_main!(benches);
