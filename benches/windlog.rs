use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use windlog::{
    aggregate_rose, summarize, MagnitudeField, RoseConfig, UtilityWindow, WindRecord,
};

fn synthetic_records(n: usize) -> Vec<WindRecord> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| WindRecord {
            timestamp: base + chrono::Duration::minutes(10 * i as i64),
            speed: if i % 17 == 0 {
                None
            } else {
                Some((i % 35) as f64)
            },
            gust: Some((i % 50) as f64 * 1.3),
            direction_degrees: if i % 23 == 0 {
                None
            } else {
                Some((i * 7 % 360) as f64)
            },
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let records = synthetic_records(50_000);
    let window = UtilityWindow::default();
    let config = RoseConfig::default();

    c.bench_function("summarize_50k", |b| {
        b.iter(|| summarize(black_box(&records), &window))
    });
    c.bench_function("rose_speed_50k", |b| {
        b.iter(|| aggregate_rose(black_box(&records), MagnitudeField::Speed, &config))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
